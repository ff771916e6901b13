use super::Parser;
use crate::error::{CgError, ParseErrorKind};
use crate::lexer::{Keyword, Token};
use cgx_model::{ConceptId, GraphId, RelationId, RelationKind, RelationTypeId};

impl<'a> Parser<'a> {
    // -- Relation -----------------------------------------------

    /// `( RelType Arc* ;comment? )`
    pub(super) fn relation(&mut self, graph: Option<GraphId>) -> Result<Option<RelationId>, CgError> {
        if self.peek() != &Token::LParen || !self.starts_relation_type(1) {
            return Ok(None);
        }
        self.descend()?;
        let start = self.pos;
        self.advance();
        let ty = self.relation_type()?;

        let mut args = Vec::new();
        while let Some(arg) = self.arc(graph)? {
            args.push(arg);
        }
        let comment = match self.peek().clone() {
            Token::RelationComment(text) => {
                self.advance();
                Some(text)
            }
            _ => None,
        };
        self.expect(&Token::RParen, "')' closing relation")?;
        self.check_valence(start, ty, args.len())?;

        let relation = self.model.new_relation(Some(ty), args, RelationKind::Relation);
        self.model.relation_mut(relation).comment = comment;
        self.ascend();
        Ok(Some(relation))
    }

    /// `< RelType Arc* | Arc* ;comment? >`
    pub(super) fn actor(&mut self, graph: Option<GraphId>) -> Result<Option<RelationId>, CgError> {
        if self.peek() != &Token::LAngle {
            return Ok(None);
        }
        self.descend()?;
        let start = self.pos;
        self.advance();
        if !self.starts_relation_type(0) {
            return Err(self.syntax(format!("expected actor type, got '{}'", self.peek())));
        }
        let ty = self.relation_type()?;

        let mut args = Vec::new();
        while let Some(arg) = self.arc(graph)? {
            args.push(arg);
        }
        let outputs_from = args.len();
        self.expect(&Token::Bar, "'|' between actor inputs and outputs")?;
        while let Some(arg) = self.arc(graph)? {
            args.push(arg);
        }
        let comment = match self.peek().clone() {
            Token::ActorComment(text) => {
                self.advance();
                Some(text)
            }
            _ => None,
        };
        self.expect(&Token::RAngle, "'>' closing actor")?;
        self.check_valence(start, ty, args.len())?;

        let actor = self
            .model
            .new_relation(Some(ty), args, RelationKind::Actor { outputs_from });
        self.model.relation_mut(actor).comment = comment;
        self.ascend();
        Ok(Some(actor))
    }

    /// A relation type starts with a label or `(lambda`.
    pub(super) fn starts_relation_type(&self, offset: usize) -> bool {
        match self.peek_at(offset) {
            Token::Ident(_) => true,
            Token::LParen => self.peek_at(offset + 1) == &Token::Keyword(Keyword::Lambda),
            _ => false,
        }
    }

    /// `?x` or an inline concept.
    pub(super) fn arc(&mut self, graph: Option<GraphId>) -> Result<Option<ConceptId>, CgError> {
        match self.peek().clone() {
            Token::BoundLabel(label) => {
                let at = self.pos;
                self.advance();
                self.resolve_arc_label(at, &label, graph).map(Some)
            }
            Token::LBracket => self.concept(graph),
            _ => Ok(None),
        }
    }

    pub(super) fn check_valence(&self, at: usize, ty: RelationTypeId, count: usize) -> Result<(), CgError> {
        let lattice = &self.model.hierarchy.relations;
        match lattice.valence(ty) {
            Some(valence) if valence != count => Err(self.error_at(
                at,
                ParseErrorKind::ValenceMismatch,
                format!(
                    "relation '{}' takes {} argument(s), found {}",
                    lattice.label(ty).unwrap_or("lambda"),
                    valence,
                    count
                ),
            )),
            _ => Ok(()),
        }
    }
}
