use cgx_model::{HierarchyError, ModelError};
use serde::Serialize;
use std::fmt;

/// Source position of a token: begin and end line/column, 1-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Span {
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    /// Input does not match the grammar.
    Syntax,
    /// `*x` while `x` is already bound in the active scope.
    DuplicateLabel,
    /// `?x` with no binding for `x`.
    UnboundLabel,
    /// `[else ...]`, or a linear `[Scope ...]` / `[typeMacro ...]` -- reserved but unsupported.
    ReservedContext,
    /// Lambda formal parameter missing from, or not enclosed by, its body.
    LambdaParameter,
    /// Lambda parameter type differs from the bound body concept's type.
    TypeMismatch,
    /// Argument count differs from the relation type's declared valence.
    ValenceMismatch,
    /// Numbered or mixed-direction arcs in the linear form.
    UnsupportedArc,
    /// Unknown type label with on-demand creation turned off.
    UnknownType,
    /// Nesting exceeded the configured maximum depth.
    NestingTooDeep,
    /// A coreferent concept could not join its coreference set.
    Coreference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerateErrorKind {
    /// A relation or actor without a relation type.
    MissingType,
    /// A bound reference to a concept that has no label or coreference set.
    NoCoreferenceSet,
    /// A bound reference to a coreference set that was never labelled.
    UnlabelledCoreferenceSet,
    /// A concept with a `?x` designator that is itself only a bound member
    /// of a coreference set, so it has no `*label` to write first.
    DesignatorConflict,
}

/// Every error a translation call can report.
#[derive(Debug, thiserror::Error)]
pub enum CgError {
    #[error("lexical error at {line}:{column}: {message} near {context:?}")]
    Lex {
        line: u32,
        column: u32,
        /// `None` at end of input.
        found: Option<char>,
        message: String,
        /// The rest of the offending line.
        context: String,
    },

    #[error("parse error at {span}: {message}")]
    Parse {
        kind: ParseErrorKind,
        message: String,
        span: Span,
        /// Text of the offending token.
        token: String,
        #[source]
        cause: Option<Box<CgError>>,
    },

    #[error("type hierarchy error: {0}")]
    Hierarchy(#[from] HierarchyError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("generation error: {message}")]
    Generate {
        kind: GenerateErrorKind,
        message: String,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl CgError {
    pub fn generate(kind: GenerateErrorKind, message: impl Into<String>) -> Self {
        CgError::Generate {
            kind,
            message: message.into(),
        }
    }

    pub fn parse_kind(&self) -> Option<ParseErrorKind> {
        match self {
            CgError::Parse { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn generate_kind(&self) -> Option<GenerateErrorKind> {
        match self {
            CgError::Generate { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Render as JSON for machine-readable error output.
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            CgError::Lex {
                line,
                column,
                found,
                message,
                context,
            } => serde_json::json!({
                "kind": "lex",
                "line": line,
                "column": column,
                "found": found.map(String::from),
                "message": message,
                "context": context,
            }),
            CgError::Parse {
                kind,
                message,
                span,
                token,
                cause,
            } => serde_json::json!({
                "kind": "parse",
                "parse_kind": kind,
                "message": message,
                "span": span,
                "token": token,
                "cause": cause.as_ref().map(|c| c.to_json_value()),
            }),
            CgError::Hierarchy(e) => serde_json::json!({
                "kind": "hierarchy",
                "message": e.to_string(),
            }),
            CgError::Model(e) => serde_json::json!({
                "kind": "model",
                "message": e.to_string(),
            }),
            CgError::Generate { kind, message } => serde_json::json!({
                "kind": "generate",
                "generate_kind": kind,
                "message": message,
            }),
            CgError::Io(e) => serde_json::json!({
                "kind": "io",
                "message": e.to_string(),
            }),
        }
    }
}
