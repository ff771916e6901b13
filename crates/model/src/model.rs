use crate::error::ModelError;
use crate::hierarchy::Hierarchy;
use crate::ids::{
    ConceptId, CorefSetId, GraphId, Handle, MarkerId, RelationId, RelationTypeId, TypeId,
};
use crate::referent::Referent;
use serde::Serialize;

// ──────────────────────────────────────────────
// Node data
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphData {
    pub concepts: Vec<ConceptId>,
    pub relations: Vec<RelationId>,
    /// Formal comments attached to the graph, in source order.
    pub comments: Vec<String>,
    /// The concept whose referent this graph describes, if any.
    pub owner: Option<ConceptId>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConceptData {
    pub ty: Option<TypeId>,
    pub referent: Option<Referent>,
    pub comment: Option<String>,
    /// Special-context label (`if`, `then`, ...). Carried, not interpreted.
    pub special: Option<String>,
    /// Wrapper concept of a negation; only reachable through its `Neg` relation.
    pub hidden: bool,
    pub graph: Option<GraphId>,
    pub coref_sets: Vec<CorefSetId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RelationKind {
    Relation,
    /// Arguments before `outputs_from` are inputs, the rest outputs.
    Actor { outputs_from: usize },
}

#[derive(Debug, Clone, Serialize)]
pub struct RelationData {
    pub ty: Option<RelationTypeId>,
    pub args: Vec<ConceptId>,
    pub comment: Option<String>,
    pub kind: RelationKind,
    pub graph: Option<GraphId>,
}

impl RelationData {
    pub fn is_actor(&self) -> bool {
        matches!(self.kind, RelationKind::Actor { .. })
    }

    pub fn inputs(&self) -> &[ConceptId] {
        match self.kind {
            RelationKind::Relation => &self.args,
            RelationKind::Actor { outputs_from } => &self.args[..outputs_from],
        }
    }

    pub fn outputs(&self) -> &[ConceptId] {
        match self.kind {
            RelationKind::Relation => &[],
            RelationKind::Actor { outputs_from } => &self.args[outputs_from..],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CorefSetData {
    pub defining: ConceptId,
    pub members: Vec<ConceptId>,
    /// Off when the defining concept sits outside any graph.
    pub scope_checked: bool,
}

// ──────────────────────────────────────────────
// Model
// ──────────────────────────────────────────────

/// Arena owning every graph, concept, relation, coreference set and marker.
#[derive(Debug, Clone, Default)]
pub struct Model {
    graphs: Vec<GraphData>,
    concepts: Vec<ConceptData>,
    relations: Vec<RelationData>,
    coref_sets: Vec<CorefSetData>,
    markers: usize,
    pub hierarchy: Hierarchy,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hierarchy(hierarchy: Hierarchy) -> Self {
        Model {
            hierarchy,
            ..Model::default()
        }
    }

    // -- Graphs -------------------------------------------------

    pub fn new_graph(&mut self, owner: Option<ConceptId>) -> GraphId {
        self.graphs.push(GraphData {
            owner,
            ..GraphData::default()
        });
        GraphId(self.graphs.len() - 1)
    }

    pub fn graph(&self, id: GraphId) -> &GraphData {
        &self.graphs[id.index()]
    }

    pub fn add_graph_comment(&mut self, graph: GraphId, comment: impl Into<String>) {
        self.graphs[graph.index()].comments.push(comment.into());
    }

    /// True when `graph` is `ancestor` or is (transitively) the descriptor
    /// of a concept enclosed by `ancestor`.
    pub fn is_nested_in(&self, graph: GraphId, ancestor: GraphId) -> bool {
        let mut current = Some(graph);
        while let Some(g) = current {
            if g == ancestor {
                return true;
            }
            current = self.graphs[g.index()]
                .owner
                .and_then(|c| self.concepts[c.index()].graph);
        }
        false
    }

    // -- Concepts -----------------------------------------------

    pub fn new_concept(&mut self, ty: Option<TypeId>) -> ConceptId {
        self.concepts.push(ConceptData {
            ty,
            ..ConceptData::default()
        });
        ConceptId(self.concepts.len() - 1)
    }

    pub fn concept(&self, id: ConceptId) -> &ConceptData {
        &self.concepts[id.index()]
    }

    pub fn concept_mut(&mut self, id: ConceptId) -> &mut ConceptData {
        &mut self.concepts[id.index()]
    }

    pub fn add_concept(&mut self, graph: GraphId, concept: ConceptId) {
        self.concepts[concept.index()].graph = Some(graph);
        let g = &mut self.graphs[graph.index()];
        if !g.concepts.contains(&concept) {
            g.concepts.push(concept);
        }
    }

    /// True when `concept` is a direct member of `graph`.
    pub fn encloses(&self, graph: GraphId, concept: ConceptId) -> bool {
        self.concepts[concept.index()].graph == Some(graph)
    }

    pub fn set_referent(&mut self, concept: ConceptId, referent: Referent) {
        if let Some(d) = referent.descriptor {
            self.graphs[d.index()].owner = Some(concept);
        }
        self.concepts[concept.index()].referent = Some(referent);
    }

    // -- Relations ----------------------------------------------

    pub fn new_relation(
        &mut self,
        ty: Option<RelationTypeId>,
        args: Vec<ConceptId>,
        kind: RelationKind,
    ) -> RelationId {
        self.relations.push(RelationData {
            ty,
            args,
            comment: None,
            kind,
            graph: None,
        });
        RelationId(self.relations.len() - 1)
    }

    pub fn relation(&self, id: RelationId) -> &RelationData {
        &self.relations[id.index()]
    }

    pub fn relation_mut(&mut self, id: RelationId) -> &mut RelationData {
        &mut self.relations[id.index()]
    }

    pub fn add_relation(&mut self, graph: GraphId, relation: RelationId) {
        self.relations[relation.index()].graph = Some(graph);
        let g = &mut self.graphs[graph.index()];
        if !g.relations.contains(&relation) {
            g.relations.push(relation);
        }
    }

    // -- Coreference --------------------------------------------

    /// Start a coreference set whose designated defining member is `defining`.
    pub fn new_coref_set(&mut self, defining: ConceptId) -> CorefSetId {
        let id = CorefSetId(self.coref_sets.len());
        self.coref_sets.push(CorefSetData {
            defining,
            members: vec![defining],
            scope_checked: self.concepts[defining.index()].graph.is_some(),
        });
        self.concepts[defining.index()].coref_sets.push(id);
        id
    }

    pub fn coref_set(&self, id: CorefSetId) -> &CorefSetData {
        &self.coref_sets[id.index()]
    }

    pub fn add_to_coref_set(
        &mut self,
        set: CorefSetId,
        concept: ConceptId,
    ) -> Result<(), ModelError> {
        let data = &self.coref_sets[set.index()];
        if data.members.contains(&concept) {
            return Ok(());
        }
        if data.scope_checked {
            let defining_graph = self.concepts[data.defining.index()].graph;
            let in_scope = match (self.concepts[concept.index()].graph, defining_graph) {
                (Some(g), Some(d)) => self.is_nested_in(g, d),
                _ => false,
            };
            if !in_scope {
                return Err(ModelError::CoreferenceScope {
                    set,
                    defining: data.defining,
                    member: concept,
                });
            }
        }
        self.coref_sets[set.index()].members.push(concept);
        self.concepts[concept.index()].coref_sets.push(set);
        Ok(())
    }

    /// First member of `set` directly enclosed by `graph`.
    pub fn coref_member_in(&self, set: CorefSetId, graph: GraphId) -> Option<ConceptId> {
        self.coref_sets[set.index()]
            .members
            .iter()
            .copied()
            .find(|&m| self.encloses(graph, m))
    }

    // -- Markers ------------------------------------------------

    pub fn new_marker(&mut self) -> MarkerId {
        self.markers += 1;
        MarkerId(self.markers - 1)
    }

    pub fn marker_count(&self) -> usize {
        self.markers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_graph_is_nested_in_enclosing_graph() {
        let mut m = Model::new();
        let outer = m.new_graph(None);
        let prop = m.new_concept(None);
        m.add_concept(outer, prop);
        let inner = m.new_graph(Some(prop));
        m.set_referent(prop, Referent::with_descriptor(inner));
        assert!(m.is_nested_in(inner, outer));
        assert!(!m.is_nested_in(outer, inner));
        assert_eq!(m.graph(inner).owner, Some(prop));
    }

    #[test]
    fn coref_member_outside_scope_rejected() {
        let mut m = Model::new();
        let g1 = m.new_graph(None);
        let g2 = m.new_graph(None);
        let a = m.new_concept(None);
        m.add_concept(g1, a);
        let b = m.new_concept(None);
        m.add_concept(g2, b);
        let set = m.new_coref_set(a);
        assert!(matches!(
            m.add_to_coref_set(set, b),
            Err(ModelError::CoreferenceScope { .. })
        ));
    }

    #[test]
    fn coref_set_without_graph_skips_scope_check() {
        let mut m = Model::new();
        let g = m.new_graph(None);
        let free = m.new_concept(None);
        let set = m.new_coref_set(free);
        let other = m.new_concept(None);
        m.add_concept(g, other);
        m.add_to_coref_set(set, other).unwrap();
        assert_eq!(m.coref_set(set).members, vec![free, other]);
        assert_eq!(m.concept(other).coref_sets, vec![set]);
    }

    #[test]
    fn actor_splits_inputs_and_outputs() {
        let mut m = Model::new();
        let a = m.new_concept(None);
        let b = m.new_concept(None);
        let c = m.new_concept(None);
        let r = m.new_relation(None, vec![a, b, c], RelationKind::Actor { outputs_from: 2 });
        assert_eq!(m.relation(r).inputs(), &[a, b]);
        assert_eq!(m.relation(r).outputs(), &[c]);
    }
}
