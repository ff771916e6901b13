#![allow(clippy::result_large_err)]
//! cgx-core: conceptual-graph notation translator.
//!
//! Parses the bracket interchange form (CGIF) and the arrow linear form into
//! a [`cgx_model::Model`], and writes model graphs back out in either form.
//!
//! # Public API
//!
//! - [`Session`] -- parse and generate entry points sharing label and marker state
//! - [`DefiningLabelTable`] -- stack-scoped label bindings
//! - [`MarkerTable`] -- foreign marker ids to model markers
//! - [`ParseOptions`] -- on-demand type creation and nesting limit
//! - [`Notation`] -- which textual form to read or write
//! - [`CgError`] -- every error a translation call reports
//! - [`lex()`] -- the tokenizer, for tools that only need tokens

pub mod error;
pub mod labels;
pub mod lexer;
pub mod markers;
pub mod options;
pub mod session;

mod generate;
mod parser;

pub use error::{CgError, GenerateErrorKind, ParseErrorKind, Span};
pub use labels::DefiningLabelTable;
pub use lexer::{lex, Notation, Token};
pub use markers::MarkerTable;
pub use options::ParseOptions;
pub use session::Session;

/// Relation type label of negated contexts, `~[...]`.
pub const NEGATION_RELATION: &str = "Neg";
