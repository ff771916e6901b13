use crate::ids::{ConceptId, CorefSetId};

/// Errors raised by the type lattices.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    /// A type with this label is already registered.
    #[error("type '{label}' is already defined")]
    DuplicateLabel { label: String },

    /// No type with this label exists and on-demand creation is off.
    #[error("unknown type '{label}'")]
    UnknownLabel { label: String },

    /// Linking `child` under `parent` would make the lattice cyclic.
    #[error("making '{child}' a subtype of '{parent}' would create a cycle")]
    Cycle { parent: String, child: String },
}

/// Structural errors raised by [`crate::Model`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A coreference set member must live in the defining member's graph or
    /// in a graph nested inside it.
    #[error("concept {member} is outside the scope of coreference set {set} (defined by {defining})")]
    CoreferenceScope {
        set: CorefSetId,
        defining: ConceptId,
        member: ConceptId,
    },
}
