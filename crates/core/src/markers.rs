//! Foreign marker identifiers (`#12`) to native model markers, both ways.
//! Unlike labels, marker mappings are not scoped.

use cgx_model::{MarkerId, Model};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct MarkerTable {
    by_foreign: HashMap<String, MarkerId>,
    by_marker: HashMap<MarkerId, String>,
    next_id: u64,
}

impl MarkerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The marker mapped to `foreign`, creating and mapping one on first sight.
    pub fn marker_for(&mut self, foreign: &str, model: &mut Model) -> MarkerId {
        if let Some(m) = self.by_foreign.get(foreign) {
            return *m;
        }
        let marker = model.new_marker();
        self.map(foreign, marker);
        marker
    }

    pub fn map(&mut self, foreign: &str, marker: MarkerId) {
        if let Some(old) = self.by_foreign.insert(foreign.to_owned(), marker) {
            self.by_marker.remove(&old);
        }
        if let Some(old) = self.by_marker.insert(marker, foreign.to_owned()) {
            self.by_foreign.remove(&old);
        }
        // Minted ids must stay clear of numeric ids seen in input.
        if let Ok(n) = foreign.parse::<u64>() {
            self.next_id = self.next_id.max(n);
        }
    }

    pub fn marker_by_foreign_id(&self, foreign: &str) -> Option<MarkerId> {
        self.by_foreign.get(foreign).copied()
    }

    pub fn foreign_id_by_marker(&self, marker: MarkerId) -> Option<&str> {
        self.by_marker.get(&marker).map(String::as_str)
    }

    /// The foreign id for `marker`, minting a numeric one when unmapped.
    pub fn foreign_id_for(&mut self, marker: MarkerId) -> String {
        if let Some(id) = self.by_marker.get(&marker) {
            return id.clone();
        }
        let id = loop {
            self.next_id += 1;
            let candidate = self.next_id.to_string();
            if !self.by_foreign.contains_key(&candidate) {
                break candidate;
            }
        };
        self.map(&id, marker);
        id
    }

    pub fn reset_unit(&mut self) {
        *self = Self::default();
    }

    pub fn copy_unit(&self) -> Self {
        self.clone()
    }
}
