use super::Parser;
use crate::error::{CgError, ParseErrorKind};
use crate::lexer::{Keyword, Token};
use cgx_model::{HierarchyError, Parameter, RelationTypeId, TypeDefinition, TypeId};
use tracing::debug;

impl<'a> Parser<'a> {
    // -- Type labels --------------------------------------------

    /// Optional concept type right after `[`: a label or a one-parameter lambda.
    pub(super) fn concept_type(&mut self) -> Result<Option<TypeId>, CgError> {
        match self.peek().clone() {
            Token::Ident(label) => {
                let at = self.pos;
                self.advance();
                self.concept_type_by_label(at, &label).map(Some)
            }
            Token::LParen if self.peek_at(1) == &Token::Keyword(Keyword::Lambda) => {
                let at = self.pos;
                let definition = self.lambda_expression()?;
                if definition.parameters.len() != 1 {
                    return Err(self.error_at(
                        at,
                        ParseErrorKind::Syntax,
                        format!(
                            "concept type lambda takes exactly one parameter, found {}",
                            definition.parameters.len()
                        ),
                    ));
                }
                Ok(Some(self.model.hierarchy.concepts.create_defined(definition)))
            }
            _ => Ok(None),
        }
    }

    /// A relation type label or lambda; the caller has checked one follows.
    pub(super) fn relation_type(&mut self) -> Result<RelationTypeId, CgError> {
        match self.peek().clone() {
            Token::Ident(label) => {
                let at = self.pos;
                self.advance();
                self.relation_type_by_label(at, &label)
            }
            _ => {
                let definition = self.lambda_expression()?;
                let valence = definition.parameters.len();
                let lattice = &mut self.model.hierarchy.relations;
                let ty = lattice.create_defined(definition);
                lattice.set_valence(ty, valence);
                Ok(ty)
            }
        }
    }

    fn concept_type_by_label(&mut self, at: usize, label: &str) -> Result<TypeId, CgError> {
        if let Some(t) = self.model.hierarchy.concepts.get(label) {
            return Ok(t);
        }
        if !self.options.create_types_on_demand {
            return Err(self.unknown_type(at, "concept", label));
        }
        let t = self.model.hierarchy.concepts.create_on_demand(label)?;
        debug!(label, "created concept type on demand");
        Ok(t)
    }

    pub(super) fn relation_type_by_label(
        &mut self,
        at: usize,
        label: &str,
    ) -> Result<RelationTypeId, CgError> {
        if let Some(t) = self.model.hierarchy.relations.get(label) {
            return Ok(t);
        }
        if !self.options.create_types_on_demand {
            return Err(self.unknown_type(at, "relation", label));
        }
        let t = self.model.hierarchy.relations.create_on_demand(label)?;
        debug!(label, "created relation type on demand");
        Ok(t)
    }

    fn unknown_type(&self, at: usize, what: &str, label: &str) -> CgError {
        self.error_caused_by(
            at,
            ParseErrorKind::UnknownType,
            format!("unknown {} type '{}'", what, label),
            CgError::Hierarchy(HierarchyError::UnknownLabel {
                label: label.to_owned(),
            }),
        )
    }

    // -- Lambda -------------------------------------------------

    /// `(lambda (T *x, U *y) Graph?)`
    ///
    /// Each formal parameter must name a concept the body defines directly,
    /// with exactly the declared type.
    pub(super) fn lambda_expression(&mut self) -> Result<TypeDefinition, CgError> {
        self.descend()?;
        self.expect(&Token::LParen, "'(' opening lambda")?;
        self.expect(&Token::Keyword(Keyword::Lambda), "'lambda'")?;
        self.expect(&Token::LParen, "'(' opening lambda parameters")?;

        let mut signature = Vec::new();
        loop {
            let Token::Ident(type_label) = self.peek().clone() else {
                return Err(self.syntax(format!("expected parameter type, got '{}'", self.peek())));
            };
            let at = self.pos;
            self.advance();
            let ty = self.concept_type_by_label(at, &type_label)?;
            let Token::DefLabel(label) = self.peek().clone() else {
                return Err(self.syntax(format!(
                    "expected parameter label '*name', got '{}'",
                    self.peek()
                )));
            };
            signature.push((self.pos, ty, label));
            self.advance();
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RParen, "')' closing lambda parameters")?;

        self.labels.push_context();
        let bound = self.lambda_body(signature);
        self.labels.pop_context();
        let definition = bound?;

        self.expect(&Token::RParen, "')' closing lambda")?;
        self.ascend();
        Ok(definition)
    }

    fn lambda_body(&mut self, signature: Vec<(usize, TypeId, String)>) -> Result<TypeDefinition, CgError> {
        let body = if self.starts_graph_item() {
            let graph = self.model.new_graph(None);
            self.graph_items(graph)?;
            Some(graph)
        } else {
            None
        };

        let mut parameters = Vec::with_capacity(signature.len());
        for (at, ty, label) in signature {
            let concept = match body {
                Some(graph) => {
                    let concept = self.defining_concept(&label).ok_or_else(|| {
                        self.error_at(
                            at,
                            ParseErrorKind::LambdaParameter,
                            format!("lambda parameter '*{}' is not defined in the body", label),
                        )
                    })?;
                    if !self.model.encloses(graph, concept) {
                        return Err(self.error_at(
                            at,
                            ParseErrorKind::LambdaParameter,
                            format!("lambda parameter '*{}' is not enclosed by the body", label),
                        ));
                    }
                    if self.model.concept(concept).ty != Some(ty) {
                        return Err(self.error_at(
                            at,
                            ParseErrorKind::TypeMismatch,
                            format!(
                                "lambda parameter '*{}' is declared '{}' but bound to a concept of another type",
                                label,
                                self.model.hierarchy.concepts.label(ty).unwrap_or("lambda")
                            ),
                        ));
                    }
                    Some(concept)
                }
                None => None,
            };
            parameters.push(Parameter { ty, label, concept });
        }
        Ok(TypeDefinition { parameters, body })
    }
}
