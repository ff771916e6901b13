//! Referents: the quantifier, designator and descriptor of a concept.

use crate::ids::{ConceptId, GraphId, MarkerId};
use serde::Serialize;

/// A numeric literal, kept as integer when written without a fraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Literal {
    Number { value: Number },
    String { value: String },
    /// `%encoding "payload"` -- the payload is opaque to the model.
    Encoded { encoding: String, payload: String },
}

/// Names or describes the individual a concept refers to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Designator {
    Literal(Literal),
    Marker(MarkerId),
    Name(String),
    /// Refers to the individual denoted by another concept.
    Defined(ConceptId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Quantifier {
    Every,
    Some,
    Count(u64),
    Named(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Referent {
    pub quantifier: Option<Quantifier>,
    pub designator: Option<Designator>,
    /// Nested graph describing the referent; owned by the concept.
    pub descriptor: Option<GraphId>,
}

impl Referent {
    pub fn is_empty(&self) -> bool {
        self.quantifier.is_none() && self.designator.is_none() && self.descriptor.is_none()
    }

    pub fn with_designator(designator: Designator) -> Self {
        Referent {
            designator: Some(designator),
            ..Referent::default()
        }
    }

    pub fn with_descriptor(graph: GraphId) -> Self {
        Referent {
            descriptor: Some(graph),
            ..Referent::default()
        }
    }
}
