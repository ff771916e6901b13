use super::Parser;
use crate::error::{CgError, ParseErrorKind};
use crate::lexer::Token;
use cgx_model::{ConceptId, Designator, GraphId, Literal, Number, Quantifier, Referent};

impl<'a> Parser<'a> {
    // -- Concept ------------------------------------------------

    /// `[Type? :? (*x | ?x+)? Referent? ;comment? ]`
    ///
    /// The concept joins `graph` as soon as its type is known so that labels
    /// inside its own referent can refer back to it.
    pub(super) fn concept(&mut self, graph: Option<GraphId>) -> Result<Option<ConceptId>, CgError> {
        if self.peek() != &Token::LBracket {
            return Ok(None);
        }
        match self.peek_at(1) {
            Token::Keyword(k) if k.is_linear_marker() => {
                return Err(self.error_at(
                    self.pos + 1,
                    ParseErrorKind::ReservedContext,
                    format!("'{}' marker is reserved but not supported", k.as_str()),
                ));
            }
            Token::Keyword(k) if k.is_context_label() => return Ok(None),
            _ => {}
        }
        self.descend()?;
        self.advance();

        let ty = self.concept_type()?;
        let concept = self.model.new_concept(ty);
        if let Some(g) = graph {
            self.model.add_concept(g, concept);
        }
        self.eat(&Token::Colon);
        self.concept_labels(concept)?;
        if let Some(referent) = self.referent(concept)? {
            self.model.set_referent(concept, referent);
        }
        if let Token::ConceptComment(text) = self.peek().clone() {
            self.advance();
            self.model.concept_mut(concept).comment = Some(text);
        }
        self.expect(&Token::RBracket, "']' closing concept")?;
        self.ascend();
        Ok(Some(concept))
    }

    fn concept_labels(&mut self, concept: ConceptId) -> Result<(), CgError> {
        if let Token::DefLabel(label) = self.peek().clone() {
            if self.labels.is_mapped(&label) {
                return Err(self.error(
                    ParseErrorKind::DuplicateLabel,
                    format!("label '{}' is already defined in this scope", label),
                ));
            }
            self.advance();
            self.labels.map_label_to_concept(&label, concept);
            return Ok(());
        }
        while let Token::BoundLabel(label) = self.peek().clone() {
            let at = self.pos;
            self.advance();
            self.bind_concept_label(at, &label, concept)?;
        }
        Ok(())
    }

    // -- Referent -----------------------------------------------

    /// Quantifier, designator and descriptor; `None` when all three are absent.
    fn referent(&mut self, concept: ConceptId) -> Result<Option<Referent>, CgError> {
        let quantifier = self.quantifier()?;
        let designator = self.designator()?;
        let descriptor = self.descriptor(Some(concept))?;
        let referent = Referent {
            quantifier,
            designator,
            descriptor,
        };
        Ok((!referent.is_empty()).then_some(referent))
    }

    fn quantifier(&mut self) -> Result<Option<Quantifier>, CgError> {
        if !self.eat(&Token::At) {
            return Ok(None);
        }
        let q = match self.peek().clone() {
            Token::Ident(w) if w.eq_ignore_ascii_case("every") => Quantifier::Every,
            Token::Ident(w) if w.eq_ignore_ascii_case("some") => Quantifier::Some,
            Token::Ident(w) => Quantifier::Named(w),
            Token::Int(n) if n >= 0 => Quantifier::Count(n as u64),
            other => return Err(self.syntax(format!("expected quantifier after '@', got '{}'", other))),
        };
        self.advance();
        Ok(Some(q))
    }

    fn designator(&mut self) -> Result<Option<Designator>, CgError> {
        let d = match self.peek().clone() {
            Token::Int(n) => Designator::Literal(Literal::Number {
                value: Number::Int(n),
            }),
            Token::Float(text) => {
                let value: f64 = text
                    .parse()
                    .map_err(|_| self.syntax(format!("invalid number '{}'", text)))?;
                Designator::Literal(Literal::Number {
                    value: Number::Float(value),
                })
            }
            Token::Str(s) => Designator::Literal(Literal::String { value: s }),
            Token::Name(s) | Token::Ident(s) => Designator::Name(s),
            Token::Percent => {
                self.advance();
                let Token::Ident(encoding) = self.peek().clone() else {
                    return Err(self.syntax(format!(
                        "expected encoding name after '%', got '{}'",
                        self.peek()
                    )));
                };
                self.advance();
                let Token::Str(payload) = self.peek().clone() else {
                    return Err(self.syntax(format!(
                        "expected quoted payload for '%{}', got '{}'",
                        encoding,
                        self.peek()
                    )));
                };
                self.advance();
                return Ok(Some(Designator::Literal(Literal::Encoded { encoding, payload })));
            }
            Token::Marker(None) => Designator::Marker(self.model.new_marker()),
            Token::Marker(Some(id)) => Designator::Marker(self.markers.marker_for(&id, self.model)),
            Token::BoundLabel(label) => {
                let concept = self.defining_concept(&label).ok_or_else(|| {
                    self.error(
                        ParseErrorKind::UnboundLabel,
                        format!("designator '?{}' refers to no defined concept", label),
                    )
                })?;
                Designator::Defined(concept)
            }
            _ => return Ok(None),
        };
        self.advance();
        Ok(Some(d))
    }
}
