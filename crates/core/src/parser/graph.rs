use super::Parser;
use crate::error::{CgError, ParseErrorKind};
use crate::lexer::{Keyword, Notation, Token};
use crate::NEGATION_RELATION;
use cgx_model::{ConceptId, GraphId, Referent, RelationId, RelationKind, RelationTypeId};
use tracing::debug;

impl<'a> Parser<'a> {
    // -- Graph --------------------------------------------------

    /// Parse graph items into `graph` until no item matches.
    pub(super) fn graph_items(&mut self, graph: GraphId) -> Result<(), CgError> {
        if self.notation == Notation::Linear {
            return self.linear_statements(graph);
        }
        loop {
            if self.attempt("concept", |p| p.concept(Some(graph)))?.is_some() {
                continue;
            }
            if self
                .attempt("special context", |p| p.special_context(graph))?
                .is_some()
            {
                continue;
            }
            if let Some(neg) = self.attempt("negation", |p| p.negated_concept(graph))? {
                self.model.add_relation(graph, neg);
                continue;
            }
            if let Some(rel) = self.attempt("relation", |p| p.relation(Some(graph)))? {
                self.model.add_relation(graph, rel);
                continue;
            }
            if let Some(actor) = self.attempt("actor", |p| p.actor(Some(graph)))? {
                self.model.add_relation(graph, actor);
                continue;
            }
            if self.graph_comment(graph) {
                continue;
            }
            return Ok(());
        }
    }

    pub(super) fn graph_comment(&mut self, graph: GraphId) -> bool {
        if let Token::FormalComment(text) = self.peek().clone() {
            self.advance();
            self.model.add_graph_comment(graph, text);
            true
        } else {
            false
        }
    }

    pub(super) fn starts_graph_item(&self) -> bool {
        matches!(
            self.peek(),
            Token::LBracket | Token::LParen | Token::LAngle | Token::Tilde | Token::FormalComment(_)
        )
    }

    /// Parse a nested graph owned by `owner` in its own label context.
    /// Returns `None` when no graph item follows.
    pub(super) fn descriptor(
        &mut self,
        owner: Option<ConceptId>,
    ) -> Result<Option<GraphId>, CgError> {
        if !self.starts_graph_item() {
            return Ok(None);
        }
        let graph = self.model.new_graph(owner);
        self.labels.push_context();
        let parsed = self.graph_items(graph);
        self.labels.pop_context();
        parsed?;
        Ok(Some(graph))
    }

    // -- Special contexts and negation ----------------------------

    /// `[If Graph]` and friends. The label is kept but carries no semantics.
    pub(super) fn special_context(&mut self, graph: GraphId) -> Result<Option<ConceptId>, CgError> {
        if self.peek() != &Token::LBracket {
            return Ok(None);
        }
        let keyword = match self.peek_at(1) {
            Token::Keyword(k) if k.is_context_label() => *k,
            _ => return Ok(None),
        };
        if keyword == Keyword::Else {
            return Err(self.error_at(
                self.pos + 1,
                ParseErrorKind::ReservedContext,
                "special context 'else' is reserved but not supported",
            ));
        }
        self.descend()?;
        self.advance();
        self.advance();
        self.eat(&Token::Colon);

        let concept = self.model.new_concept(None);
        self.model.add_concept(graph, concept);
        self.model.concept_mut(concept).special = Some(keyword.as_str().to_owned());
        if let Some(body) = self.descriptor(Some(concept))? {
            self.model.set_referent(concept, Referent::with_descriptor(body));
        }
        self.expect(&Token::RBracket, "']' closing special context")?;
        self.ascend();
        Ok(Some(concept))
    }

    /// `~[Graph]`: a hidden concept described by the graph, wrapped in a `Neg` relation.
    pub(super) fn negated_concept(&mut self, graph: GraphId) -> Result<Option<RelationId>, CgError> {
        if self.peek() != &Token::Tilde {
            return Ok(None);
        }
        if self.peek_at(1) != &Token::LBracket {
            return Err(self.error_at(
                self.pos + 1,
                ParseErrorKind::Syntax,
                "expected '[' after '~'",
            ));
        }
        self.descend()?;
        self.advance();
        self.advance();

        let concept = self.model.new_concept(None);
        self.model.concept_mut(concept).hidden = true;
        self.model.add_concept(graph, concept);
        let body = match self.descriptor(Some(concept))? {
            Some(g) => g,
            None => self.model.new_graph(Some(concept)),
        };
        self.model.set_referent(concept, Referent::with_descriptor(body));
        self.expect(&Token::RBracket, "']' closing negation")?;

        let neg = self.negation_type()?;
        let relation = self
            .model
            .new_relation(Some(neg), vec![concept], RelationKind::Relation);
        self.ascend();
        Ok(Some(relation))
    }

    /// The `Neg` relation type, created whatever the on-demand setting.
    fn negation_type(&mut self) -> Result<RelationTypeId, CgError> {
        let lattice = &mut self.model.hierarchy.relations;
        if let Some(t) = lattice.get(NEGATION_RELATION) {
            return Ok(t);
        }
        let t = lattice.create_on_demand(NEGATION_RELATION)?;
        lattice.set_valence(t, 1);
        debug!(label = NEGATION_RELATION, "created negation relation type");
        Ok(t)
    }
}
