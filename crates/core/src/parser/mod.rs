//! Backtracking recursive-descent parser for both notations.
//!
//! Every production returns `Ok(None)` when the input does not start with
//! it and nothing was consumed, `Ok(Some(_))` on a match, and `Err` once it
//! has committed and then failed. [`Parser::attempt`] restores the cursor
//! on a declined trial. Model mutations happen as productions match; a
//! failed parse leaves whatever it had built in the model.

use crate::error::{CgError, ParseErrorKind};
use crate::labels::DefiningLabelTable;
use crate::lexer::{Notation, Spanned, Token};
use crate::markers::MarkerTable;
use crate::options::ParseOptions;
use cgx_model::{ConceptId, GraphId, Model, RelationId};
use tracing::trace;

mod concept;
mod coref;
mod graph;
mod linear;
mod relation;
mod types;

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

pub(crate) struct Parser<'a> {
    tokens: Vec<Spanned>,
    pos: usize,
    notation: Notation,
    model: &'a mut Model,
    labels: &'a mut DefiningLabelTable,
    markers: &'a mut MarkerTable,
    options: &'a ParseOptions,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(
        tokens: Vec<Spanned>,
        notation: Notation,
        model: &'a mut Model,
        labels: &'a mut DefiningLabelTable,
        markers: &'a mut MarkerTable,
        options: &'a ParseOptions,
    ) -> Self {
        Parser {
            tokens,
            pos: 0,
            notation,
            model,
            labels,
            markers,
            options,
            depth: 0,
        }
    }

    // -- Entry points -------------------------------------------

    /// Parse the whole input as the items of `graph`.
    pub(crate) fn parse_graph_into(&mut self, graph: GraphId) -> Result<(), CgError> {
        self.graph_items(graph)?;
        self.expect_end()
    }

    pub(crate) fn parse_single_concept(
        &mut self,
        graph: Option<GraphId>,
    ) -> Result<ConceptId, CgError> {
        let concept = self
            .concept(graph)?
            .ok_or_else(|| self.syntax(format!("expected concept, got '{}'", self.peek())))?;
        self.expect_end()?;
        Ok(concept)
    }

    pub(crate) fn parse_single_relation(
        &mut self,
        graph: Option<GraphId>,
    ) -> Result<RelationId, CgError> {
        let relation = self
            .relation(graph)?
            .ok_or_else(|| self.syntax(format!("expected relation, got '{}'", self.peek())))?;
        self.expect_end()?;
        Ok(relation)
    }

    pub(crate) fn parse_single_actor(
        &mut self,
        graph: Option<GraphId>,
    ) -> Result<RelationId, CgError> {
        let actor = self
            .actor(graph)?
            .ok_or_else(|| self.syntax(format!("expected actor, got '{}'", self.peek())))?;
        self.expect_end()?;
        Ok(actor)
    }

    fn expect_end(&mut self) -> Result<(), CgError> {
        // A trailing linear terminator is harmless for single productions.
        if self.notation == Notation::Linear && matches!(self.peek(), Token::Dot | Token::Question) {
            self.advance();
        }
        if self.peek() == &Token::Eof {
            Ok(())
        } else {
            Err(self.syntax(format!("unexpected '{}'", self.peek())))
        }
    }

    // -- Cursor -------------------------------------------------

    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    fn peek_at(&self, offset: usize) -> &Token {
        &self.tokens[(self.pos + offset).min(self.tokens.len() - 1)].token
    }

    fn advance(&mut self) -> &Spanned {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, what: &str) -> Result<(), CgError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.syntax(format!("expected {}, got '{}'", what, self.peek())))
        }
    }

    /// Run one alternative; a declined alternative leaves the cursor where it was.
    fn attempt<T>(
        &mut self,
        rule: &'static str,
        f: impl FnOnce(&mut Self) -> Result<Option<T>, CgError>,
    ) -> Result<Option<T>, CgError> {
        let saved = self.pos;
        let out = f(self)?;
        if out.is_none() && self.pos != saved {
            trace!(rule, from = saved, to = self.pos, "retracted trial");
            self.pos = saved;
        }
        Ok(out)
    }

    fn descend(&mut self) -> Result<(), CgError> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(self.error(
                ParseErrorKind::NestingTooDeep,
                format!("nesting deeper than {}", self.options.max_depth),
            ));
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // -- Errors -------------------------------------------------

    fn error_at(&self, index: usize, kind: ParseErrorKind, message: impl Into<String>) -> CgError {
        self.build_error(index, kind, message.into(), None)
    }

    fn error_caused_by(
        &self,
        index: usize,
        kind: ParseErrorKind,
        message: impl Into<String>,
        cause: CgError,
    ) -> CgError {
        self.build_error(index, kind, message.into(), Some(Box::new(cause)))
    }

    fn build_error(
        &self,
        index: usize,
        kind: ParseErrorKind,
        message: String,
        cause: Option<Box<CgError>>,
    ) -> CgError {
        let s = &self.tokens[index.min(self.tokens.len() - 1)];
        CgError::Parse {
            kind,
            message,
            span: s.span,
            token: s.token.to_string(),
            cause,
        }
    }

    fn error(&self, kind: ParseErrorKind, message: impl Into<String>) -> CgError {
        self.error_at(self.pos, kind, message)
    }

    fn syntax(&self, message: impl Into<String>) -> CgError {
        self.error(ParseErrorKind::Syntax, message)
    }
}
