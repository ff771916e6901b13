//! Concept-type and relation-type lattices.
//!
//! Each lattice has a fixed top and bottom element. Types created on demand
//! sit directly between them; declared types may name explicit parents.
//! Lambda-defined types are anonymous nodes carrying their definition.

use crate::error::HierarchyError;
use crate::ids::{ConceptId, GraphId, Handle, RelationTypeId, TypeId};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

pub const UNIVERSAL: &str = "Universal";
pub const ABSURD: &str = "Absurd";
pub const LINK: &str = "Link";
pub const ABSURD_LINK: &str = "AbsurdLink";

/// One formal parameter of a lambda definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub ty: TypeId,
    pub label: String,
    /// The body concept the parameter label resolved to.
    pub concept: Option<ConceptId>,
}

/// A lambda expression defining a type: `(lambda (T *x) body)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDefinition {
    pub parameters: Vec<Parameter>,
    pub body: Option<GraphId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeNode<K> {
    /// `None` for anonymous (lambda-defined) types.
    pub label: Option<String>,
    pub parents: Vec<K>,
    pub children: Vec<K>,
    /// Declared argument count; relation types only.
    pub valence: Option<usize>,
    pub definition: Option<TypeDefinition>,
}

/// A type lattice addressed by handles of kind `K`.
#[derive(Debug, Clone)]
pub struct Lattice<K> {
    nodes: Vec<TypeNode<K>>,
    by_label: HashMap<String, K>,
}

impl<K: Handle> Lattice<K> {
    pub fn new(top: &str, bottom: &str) -> Self {
        let mut lattice = Lattice {
            nodes: Vec::new(),
            by_label: HashMap::new(),
        };
        let t = lattice.push(Some(top.to_owned()));
        let b = lattice.push(Some(bottom.to_owned()));
        lattice.link(t, b);
        lattice
    }

    pub fn top(&self) -> K {
        K::from(0)
    }

    pub fn bottom(&self) -> K {
        K::from(1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<K> {
        self.by_label.get(label).copied()
    }

    pub fn node(&self, id: K) -> &TypeNode<K> {
        &self.nodes[id.index()]
    }

    pub fn label(&self, id: K) -> Option<&str> {
        self.nodes[id.index()].label.as_deref()
    }

    pub fn valence(&self, id: K) -> Option<usize> {
        self.nodes[id.index()].valence
    }

    pub fn set_valence(&mut self, id: K, valence: usize) {
        self.nodes[id.index()].valence = Some(valence);
    }

    /// Register a labelled type under `parents` and above `children`.
    ///
    /// An empty `parents` list means the top element; an empty `children`
    /// list means the bottom element.
    pub fn create(
        &mut self,
        label: &str,
        parents: &[K],
        children: &[K],
    ) -> Result<K, HierarchyError> {
        if self.by_label.contains_key(label) {
            return Err(HierarchyError::DuplicateLabel {
                label: label.to_owned(),
            });
        }
        let parents = if parents.is_empty() {
            vec![self.top()]
        } else {
            parents.to_vec()
        };
        let children = if children.is_empty() {
            vec![self.bottom()]
        } else {
            children.to_vec()
        };
        // A child that is already above a parent would close a loop through the new node.
        for &p in &parents {
            for &c in &children {
                if self.is_subtype(p, c) {
                    return Err(HierarchyError::Cycle {
                        parent: self.display(p),
                        child: self.display(c),
                    });
                }
            }
        }
        let id = self.push(Some(label.to_owned()));
        for p in parents {
            self.link(p, id);
        }
        for c in children {
            self.link(id, c);
        }
        Ok(id)
    }

    /// Register `label` with only top and bottom as neighbours.
    pub fn create_on_demand(&mut self, label: &str) -> Result<K, HierarchyError> {
        let (top, bottom) = (self.top(), self.bottom());
        self.create(label, &[top], &[bottom])
    }

    /// Register an anonymous lambda-defined type.
    pub fn create_defined(&mut self, definition: TypeDefinition) -> K {
        let id = self.push(None);
        let (top, bottom) = (self.top(), self.bottom());
        self.link(top, id);
        self.link(id, bottom);
        self.nodes[id.index()].definition = Some(definition);
        id
    }

    /// Make `child` a direct subtype of `parent`.
    pub fn add_supertype(&mut self, child: K, parent: K) -> Result<(), HierarchyError> {
        if child == parent || self.is_subtype(parent, child) {
            return Err(HierarchyError::Cycle {
                parent: self.display(parent),
                child: self.display(child),
            });
        }
        if !self.nodes[child.index()].parents.contains(&parent) {
            self.link(parent, child);
        }
        Ok(())
    }

    /// True when `sub` equals `sup` or reaches it through parent links.
    pub fn is_subtype(&self, sub: K, sup: K) -> bool {
        if sub == sup {
            return true;
        }
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([sub]);
        while let Some(k) = queue.pop_front() {
            for &p in &self.nodes[k.index()].parents {
                if p == sup {
                    return true;
                }
                if seen.insert(p.index()) {
                    queue.push_back(p);
                }
            }
        }
        false
    }

    fn display(&self, id: K) -> String {
        match self.label(id) {
            Some(l) => l.to_owned(),
            None => format!("{:?}", id),
        }
    }

    fn push(&mut self, label: Option<String>) -> K {
        let id = K::from(self.nodes.len());
        if let Some(l) = &label {
            self.by_label.insert(l.clone(), id);
        }
        self.nodes.push(TypeNode {
            label,
            parents: Vec::new(),
            children: Vec::new(),
            valence: None,
            definition: None,
        });
        id
    }

    fn link(&mut self, parent: K, child: K) {
        self.nodes[parent.index()].children.push(child);
        self.nodes[child.index()].parents.push(parent);
    }
}

/// The concept-type and relation-type lattices used by one model.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    pub concepts: Lattice<TypeId>,
    pub relations: Lattice<RelationTypeId>,
}

impl Default for Hierarchy {
    fn default() -> Self {
        Hierarchy {
            concepts: Lattice::new(UNIVERSAL, ABSURD),
            relations: Lattice::new(LINK, ABSURD_LINK),
        }
    }
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a relation type with a fixed argument count.
    pub fn declare_relation(
        &mut self,
        label: &str,
        valence: usize,
        parents: &[RelationTypeId],
    ) -> Result<RelationTypeId, HierarchyError> {
        let id = self.relations.create(label, parents, &[])?;
        self.relations.set_valence(id, valence);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_lattice_has_top_above_bottom() {
        let h = Hierarchy::new();
        let top = h.concepts.top();
        let bottom = h.concepts.bottom();
        assert_eq!(h.concepts.label(top), Some(UNIVERSAL));
        assert!(h.concepts.is_subtype(bottom, top));
        assert!(!h.concepts.is_subtype(top, bottom));
    }

    #[test]
    fn on_demand_type_sits_between_top_and_bottom() {
        let mut h = Hierarchy::new();
        let cat = h.concepts.create_on_demand("Cat").unwrap();
        assert_eq!(h.concepts.get("Cat"), Some(cat));
        assert_eq!(h.concepts.node(cat).parents, vec![h.concepts.top()]);
        assert_eq!(h.concepts.node(cat).children, vec![h.concepts.bottom()]);
        assert!(h.concepts.is_subtype(h.concepts.bottom(), cat));
    }

    #[test]
    fn duplicate_label_rejected() {
        let mut h = Hierarchy::new();
        h.concepts.create_on_demand("Cat").unwrap();
        let err = h.concepts.create_on_demand("Cat").unwrap_err();
        assert_eq!(
            err,
            HierarchyError::DuplicateLabel {
                label: "Cat".to_owned()
            }
        );
    }

    #[test]
    fn declared_parents_are_transitive() {
        let mut h = Hierarchy::new();
        let animal = h.concepts.create("Animal", &[], &[]).unwrap();
        let cat = h.concepts.create("Cat", &[animal], &[]).unwrap();
        let tabby = h.concepts.create("Tabby", &[cat], &[]).unwrap();
        assert!(h.concepts.is_subtype(tabby, animal));
        assert!(!h.concepts.is_subtype(animal, tabby));
    }

    #[test]
    fn supertype_cycle_rejected() {
        let mut h = Hierarchy::new();
        let animal = h.concepts.create("Animal", &[], &[]).unwrap();
        let cat = h.concepts.create("Cat", &[animal], &[]).unwrap();
        assert!(matches!(
            h.concepts.add_supertype(animal, cat),
            Err(HierarchyError::Cycle { .. })
        ));
    }

    #[test]
    fn declared_relation_keeps_valence() {
        let mut h = Hierarchy::new();
        let owns = h.declare_relation("Owns", 2, &[]).unwrap();
        assert_eq!(h.relations.valence(owns), Some(2));
        assert_eq!(h.relations.label(owns), Some("Owns"));
    }
}
