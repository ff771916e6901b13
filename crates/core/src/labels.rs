//! Stack-scoped defining-label table.
//!
//! A label is bound to exactly one of a defining concept or a coreference
//! set. Every binding made after a [`DefiningLabelTable::push_context`] is
//! undone, in both directions, by the matching
//! [`DefiningLabelTable::pop_context`].

use cgx_model::{ConceptId, CorefSetId};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
enum ScopeEntry {
    Boundary,
    Label(String),
}

#[derive(Debug, Clone, Default)]
pub struct DefiningLabelTable {
    concepts: HashMap<String, ConceptId>,
    concept_labels: HashMap<ConceptId, String>,
    sets: HashMap<String, CorefSetId>,
    set_labels: HashMap<CorefSetId, String>,
    scope: Vec<ScopeEntry>,
    next_label: u64,
}

impl DefiningLabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_context(&mut self) {
        self.scope.push(ScopeEntry::Boundary);
    }

    /// Unbind every label pushed since the most recent boundary, and the boundary itself.
    /// A pop with no open boundary clears every scoped label.
    pub fn pop_context(&mut self) {
        while let Some(entry) = self.scope.pop() {
            match entry {
                ScopeEntry::Boundary => return,
                ScopeEntry::Label(label) => self.unbind(&label),
            }
        }
    }

    /// Number of open contexts.
    pub fn depth(&self) -> usize {
        self.scope
            .iter()
            .filter(|e| **e == ScopeEntry::Boundary)
            .count()
    }

    fn unbind(&mut self, label: &str) {
        if let Some(c) = self.concepts.remove(label) {
            self.concept_labels.remove(&c);
        }
        if let Some(s) = self.sets.remove(label) {
            self.set_labels.remove(&s);
        }
    }

    fn is_scoped(&self, label: &str) -> bool {
        self.concepts.contains_key(label) || self.sets.contains_key(label)
    }

    /// Bind `label` to its defining concept, dropping any set binding it had.
    pub fn map_label_to_concept(&mut self, label: &str, concept: ConceptId) {
        if !self.is_scoped(label) {
            self.scope.push(ScopeEntry::Label(label.to_owned()));
        }
        if let Some(s) = self.sets.remove(label) {
            self.set_labels.remove(&s);
        }
        if let Some(old) = self.concepts.insert(label.to_owned(), concept) {
            self.concept_labels.remove(&old);
        }
        self.concept_labels.insert(concept, label.to_owned());
    }

    /// Rebind `label` to a coreference set, dropping any concept binding it had.
    pub fn map_label_to_coreference_set(&mut self, label: &str, set: CorefSetId) {
        if !self.is_scoped(label) {
            self.scope.push(ScopeEntry::Label(label.to_owned()));
        }
        if let Some(c) = self.concepts.remove(label) {
            self.concept_labels.remove(&c);
        }
        if let Some(old) = self.sets.insert(label.to_owned(), set) {
            self.set_labels.remove(&old);
        }
        self.set_labels.insert(set, label.to_owned());
    }

    pub fn concept_by_label(&self, label: &str) -> Option<ConceptId> {
        self.concepts.get(label).copied()
    }

    pub fn coreference_set_by_label(&self, label: &str) -> Option<CorefSetId> {
        self.sets.get(label).copied()
    }

    pub fn label_by_concept(&self, concept: ConceptId) -> Option<&str> {
        self.concept_labels.get(&concept).map(String::as_str)
    }

    pub fn label_by_coreference_set(&self, set: CorefSetId) -> Option<&str> {
        self.set_labels.get(&set).map(String::as_str)
    }

    /// True when `label` is bound to a concept or a coreference set.
    pub fn is_mapped(&self, label: &str) -> bool {
        self.is_scoped(label)
    }

    /// A fresh `xN` label distinct from every label currently bound.
    pub fn next_available_label(&mut self) -> String {
        loop {
            self.next_label += 1;
            let candidate = format!("x{}", self.next_label);
            if !self.is_mapped(&candidate) {
                debug!(label = %candidate, "minted defining label");
                return candidate;
            }
        }
    }

    /// Clear every binding and restart label generation.
    pub fn reset_unit(&mut self) {
        *self = Self::default();
    }

    /// Independent deep copy.
    pub fn copy_unit(&self) -> Self {
        self.clone()
    }
}
