//! cgx-model: arena-backed conceptual-graph model.
//!
//! Graphs, concepts, relations, coreference sets and markers all live in a
//! single [`Model`] and are addressed by copyable index handles. Back-links
//! (a concept's enclosing graph, a descriptor graph's owner concept) are
//! plain handle lookups, so the model has no ownership cycles.
//!
//! # Public API
//!
//! - [`Model`] -- the arena and every structural operation on it
//! - [`Hierarchy`] / [`Lattice`] -- concept and relation type lattices
//! - [`Referent`], [`Quantifier`], [`Designator`], [`Literal`], [`Number`]
//! - [`ModelError`], [`HierarchyError`]

pub mod error;
pub mod hierarchy;
pub mod ids;
pub mod model;
pub mod referent;

pub use error::{HierarchyError, ModelError};
pub use hierarchy::{Hierarchy, Lattice, Parameter, TypeDefinition, TypeNode};
pub use ids::{
    ConceptId, CorefSetId, GraphId, Handle, MarkerId, RelationId, RelationTypeId, TypeId,
};
pub use model::{ConceptData, CorefSetData, GraphData, Model, RelationData, RelationKind};
pub use referent::{Designator, Literal, Number, Quantifier, Referent};
