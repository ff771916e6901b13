//! Arrow-based linear form.
//!
//! ```text
//! [Go]-
//!     (Agnt) -> [Person: 'John']
//!     (Dest) -> [City: 'Boston'].
//! ```
//!
//! A graph is a sequence of statements, each ended by `.` or `?`. Only
//! unnumbered arrows are accepted; an arrow into a relation marks its input,
//! an arrow out of it its output.

use super::Parser;
use crate::error::{CgError, ParseErrorKind};
use crate::lexer::Token;
use cgx_model::{ConceptId, GraphId, RelationKind, RelationTypeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Right,
    Left,
}

impl<'a> Parser<'a> {
    pub(super) fn linear_statements(&mut self, graph: GraphId) -> Result<(), CgError> {
        loop {
            if self.graph_comment(graph) {
                continue;
            }
            match self.peek() {
                Token::LBracket | Token::BoundLabel(_) => self.linear_chain(graph)?,
                Token::Tilde => {
                    if let Some(neg) = self.negated_concept(graph)? {
                        self.model.add_relation(graph, neg);
                    }
                }
                Token::LParen if self.peek_relation_node() => self.linear_relation_statement(graph)?,
                Token::LAngle => {
                    if let Some(actor) = self.actor(Some(graph))? {
                        self.model.add_relation(graph, actor);
                    }
                }
                _ => return Ok(()),
            }
            self.statement_end()?;
        }
    }

    /// `.` or `?`; optional right before a closing `]` or `)`.
    fn statement_end(&mut self) -> Result<(), CgError> {
        match self.peek() {
            Token::Dot | Token::Question => {
                self.advance();
                Ok(())
            }
            Token::RBracket | Token::RParen => Ok(()),
            other => Err(self.syntax(format!("expected '.' ending statement, got '{}'", other))),
        }
    }

    // -- Chains -------------------------------------------------

    fn linear_chain(&mut self, graph: GraphId) -> Result<(), CgError> {
        let head = self.linear_target(graph)?;
        self.linear_tail(graph, head)
    }

    fn linear_target(&mut self, graph: GraphId) -> Result<ConceptId, CgError> {
        match self.arc(Some(graph))? {
            Some(c) => Ok(c),
            None => Err(self.syntax(format!("expected concept or bound label, got '{}'", self.peek()))),
        }
    }

    /// Links hanging off `head`: `-> (R) -> [B] ...`, `<- (R) <- [B] ...` or a fan-out.
    fn linear_tail(&mut self, graph: GraphId, mut head: ConceptId) -> Result<(), CgError> {
        loop {
            self.reject_numbered_arc()?;
            match self.peek() {
                Token::RightArrow | Token::LeftArrow => {
                    let into = self.arrow()?;
                    let at = self.pos;
                    let (ty, comment) = self.relation_node()?;
                    self.reject_numbered_arc()?;
                    if !matches!(self.peek(), Token::RightArrow | Token::LeftArrow) {
                        return self.build_linear_relation(graph, at, ty, comment, vec![head]);
                    }
                    let out_at = self.pos;
                    let out = self.arrow()?;
                    if into != out {
                        return Err(self.error_at(
                            out_at,
                            ParseErrorKind::UnsupportedArc,
                            "arrows on both sides of a relation must point the same way",
                        ));
                    }
                    let target = self.linear_target(graph)?;
                    let args = match into {
                        Direction::Right => vec![head, target],
                        Direction::Left => vec![target, head],
                    };
                    self.build_linear_relation(graph, at, ty, comment, args)?;
                    head = target;
                }
                Token::Hyphen => {
                    self.advance();
                    return self.fan_out(graph, head);
                }
                _ => return Ok(()),
            }
        }
    }

    /// Branches after `head-`, each `(R) -> [B] ...`, `(R) <- [B] ...` or `(R)`.
    /// A trailing `,` closes a fan-out nested inside another.
    fn fan_out(&mut self, graph: GraphId, head: ConceptId) -> Result<(), CgError> {
        let mut branches = 0;
        loop {
            self.reject_numbered_arc()?;
            if !(self.peek() == &Token::LParen && self.peek_relation_node()) {
                break;
            }
            let at = self.pos;
            let (ty, comment) = self.relation_node()?;
            self.reject_numbered_arc()?;
            if matches!(self.peek(), Token::RightArrow | Token::LeftArrow) {
                let dir = self.arrow()?;
                let target = self.linear_target(graph)?;
                let args = match dir {
                    Direction::Right => vec![head, target],
                    Direction::Left => vec![target, head],
                };
                self.build_linear_relation(graph, at, ty, comment, args)?;
                self.linear_tail(graph, target)?;
            } else {
                self.build_linear_relation(graph, at, ty, comment, vec![head])?;
            }
            branches += 1;
        }
        if branches == 0 {
            return Err(self.syntax(format!("expected relation after '-', got '{}'", self.peek())));
        }
        self.eat(&Token::Comma);
        Ok(())
    }

    /// `(R) -> [B]` or a bare `(R)` as a statement of its own.
    fn linear_relation_statement(&mut self, graph: GraphId) -> Result<(), CgError> {
        let at = self.pos;
        let (ty, comment) = self.relation_node()?;
        self.reject_numbered_arc()?;
        if !matches!(self.peek(), Token::RightArrow | Token::LeftArrow) {
            return self.build_linear_relation(graph, at, ty, comment, Vec::new());
        }
        self.arrow()?;
        let target = self.linear_target(graph)?;
        self.build_linear_relation(graph, at, ty, comment, vec![target])?;
        self.linear_tail(graph, target)
    }

    // -- Pieces -------------------------------------------------

    fn arrow(&mut self) -> Result<Direction, CgError> {
        let dir = match self.peek() {
            Token::RightArrow => Direction::Right,
            Token::LeftArrow => Direction::Left,
            other => return Err(self.syntax(format!("expected arrow, got '{}'", other))),
        };
        self.advance();
        Ok(dir)
    }

    fn peek_relation_node(&self) -> bool {
        self.peek() == &Token::LParen && self.starts_relation_type(1)
    }

    /// `( RelType ;comment? )` with its arguments supplied by the arrows around it.
    fn relation_node(&mut self) -> Result<(RelationTypeId, Option<String>), CgError> {
        if !self.peek_relation_node() {
            return Err(self.syntax(format!("expected relation, got '{}'", self.peek())));
        }
        self.advance();
        let ty = self.relation_type()?;
        let comment = match self.peek().clone() {
            Token::RelationComment(text) => {
                self.advance();
                Some(text)
            }
            _ => None,
        };
        self.expect(&Token::RParen, "')' closing relation")?;
        Ok((ty, comment))
    }

    /// `-N->`, `<-N-` and fan-outs of them assign arguments by number.
    fn reject_numbered_arc(&self) -> Result<(), CgError> {
        let numbered = match (self.peek(), self.peek_at(1), self.peek_at(2)) {
            (Token::Hyphen | Token::LeftArrow, Token::Int(_), _) => true,
            (Token::Hyphen, Token::Hyphen | Token::LeftArrow, Token::Int(_)) => true,
            _ => false,
        };
        if numbered {
            return Err(self.error(
                ParseErrorKind::UnsupportedArc,
                "numbered arcs are not supported",
            ));
        }
        Ok(())
    }

    fn build_linear_relation(
        &mut self,
        graph: GraphId,
        at: usize,
        ty: RelationTypeId,
        comment: Option<String>,
        args: Vec<ConceptId>,
    ) -> Result<(), CgError> {
        self.check_valence(at, ty, args.len())?;
        let relation = self.model.new_relation(Some(ty), args, RelationKind::Relation);
        self.model.relation_mut(relation).comment = comment;
        self.model.add_relation(graph, relation);
        Ok(())
    }
}
