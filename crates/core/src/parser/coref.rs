//! Bound-label resolution across nested contexts.
//!
//! One logical individual mentioned in several contexts is represented by
//! one concept per context, all joined in a single coreference set whose
//! defining member is the concept that carried the `*label`.

use super::Parser;
use crate::error::{CgError, ParseErrorKind};
use cgx_model::{ConceptId, CorefSetId, GraphId, ModelError};
use tracing::debug;

impl<'a> Parser<'a> {
    /// The defining concept behind `label`, whether bound directly or through a set.
    pub(super) fn defining_concept(&self, label: &str) -> Option<ConceptId> {
        match self.labels.coreference_set_by_label(label) {
            Some(set) => Some(self.model.coref_set(set).defining),
            None => self.labels.concept_by_label(label),
        }
    }

    /// The set behind `label`, promoting a plain defining concept to a set on first use.
    fn coreference_set_for(&mut self, at: usize, label: &str) -> Result<CorefSetId, CgError> {
        if let Some(set) = self.labels.coreference_set_by_label(label) {
            return Ok(set);
        }
        let defining = self.labels.concept_by_label(label).ok_or_else(|| self.unbound(at, label))?;
        let set = self.model.new_coref_set(defining);
        self.labels.map_label_to_coreference_set(label, set);
        debug!(label, %set, %defining, "created coreference set");
        Ok(set)
    }

    /// `[T: ?x]`: the concept being built joins `x`'s coreference set.
    pub(super) fn bind_concept_label(
        &mut self,
        at: usize,
        label: &str,
        concept: ConceptId,
    ) -> Result<(), CgError> {
        let set = self.coreference_set_for(at, label)?;
        self.model
            .add_to_coref_set(set, concept)
            .map_err(|e| self.coreference_error(at, label, e))
    }

    /// `?x` where a concept is expected.
    ///
    /// Reuses the defining concept when `graph` encloses it, then any set member
    /// already in `graph`; otherwise adds a fresh concept of the defining
    /// concept's type to `graph` and to the set.
    pub(super) fn resolve_arc_label(
        &mut self,
        at: usize,
        label: &str,
        graph: Option<GraphId>,
    ) -> Result<ConceptId, CgError> {
        let existing_set = self.labels.coreference_set_by_label(label);
        let defining = self.defining_concept(label).ok_or_else(|| self.unbound(at, label))?;
        let Some(graph) = graph else {
            return Ok(defining);
        };
        if self.model.encloses(graph, defining) {
            return Ok(defining);
        }
        if let Some(member) = existing_set.and_then(|s| self.model.coref_member_in(s, graph)) {
            return Ok(member);
        }

        let ty = self.model.concept(defining).ty;
        let fresh = self.model.new_concept(ty);
        self.model.add_concept(graph, fresh);
        let set = self.coreference_set_for(at, label)?;
        self.model
            .add_to_coref_set(set, fresh)
            .map_err(|e| self.coreference_error(at, label, e))?;
        debug!(label, %graph, concept = %fresh, "added coreferent concept to nested context");
        Ok(fresh)
    }

    fn unbound(&self, at: usize, label: &str) -> CgError {
        self.error_at(
            at,
            ParseErrorKind::UnboundLabel,
            format!("label '?{}' is not bound to any concept", label),
        )
    }

    fn coreference_error(&self, at: usize, label: &str, cause: ModelError) -> CgError {
        self.error_caused_by(
            at,
            ParseErrorKind::Coreference,
            format!("concept cannot join the coreference set of '{}'", label),
            CgError::Model(cause),
        )
    }
}
