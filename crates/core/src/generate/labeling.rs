//! Which concepts of a graph need a label, and in what order they are written.

use cgx_model::{ConceptId, CorefSetId, Designator, GraphId, Model, RelationId};
use std::collections::{HashMap, HashSet};

/// Per-graph emission plan.
#[derive(Debug, Default)]
pub(super) struct GraphPlan {
    /// Visible concepts in emission order.
    pub order: Vec<ConceptId>,
    /// Relations (not actors) keyed by their first argument.
    pub primary: HashMap<ConceptId, Vec<RelationId>>,
    pub needs_label: HashSet<ConceptId>,
}

impl GraphPlan {
    /// An empty plan, for relations written outside any graph.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn new(model: &Model, graph: GraphId) -> Self {
        let data = model.graph(graph);
        let mut references: HashMap<ConceptId, usize> = HashMap::new();
        let mut needs_label = HashSet::new();
        let mut primary: HashMap<ConceptId, Vec<RelationId>> = HashMap::new();

        for &r in &data.relations {
            if is_negation(model, r) {
                continue;
            }
            let relation = model.relation(r);
            let mut seen = HashSet::new();
            for &arg in &relation.args {
                *references.entry(arg).or_default() += 1;
                // Actor arguments are only ever written as `?x`.
                if !seen.insert(arg) || relation.is_actor() {
                    needs_label.insert(arg);
                }
            }
            if !relation.is_actor() {
                if let Some(&first) = relation.args.first() {
                    primary.entry(first).or_default().push(r);
                }
            }
        }
        needs_label.extend(
            references
                .into_iter()
                .filter(|&(_, n)| n >= 2)
                .map(|(c, _)| c),
        );
        let mut designated = HashSet::new();
        for &c in &data.concepts {
            collect_designated(model, c, &mut designated);
        }
        needs_label.extend(designated.iter().copied());

        let visible: Vec<ConceptId> = data
            .concepts
            .iter()
            .copied()
            .filter(|&c| !model.concept(c).hidden)
            .collect();
        let mut order = Vec::with_capacity(visible.len());
        let mut placed = HashSet::new();
        // Designator targets precede their `[T: *y ?x]` users, which always
        // come later in graph order or inside a later concept's descriptor.
        let defining_first = visible.iter().copied().filter(|&c| {
            designated.contains(&c)
                || shared_set(model, c).is_some_and(|s| model.coref_set(s).defining == c)
        });
        let primaries = visible.iter().copied().filter(|c| primary.contains_key(c));
        for c in defining_first
            .chain(primaries)
            .chain(visible.iter().copied())
        {
            if placed.insert(c) {
                order.push(c);
            }
        }

        GraphPlan {
            order,
            primary,
            needs_label,
        }
    }
}

/// A `Neg` wrapper: one argument, and that argument is a hidden concept.
pub(super) fn is_negation(model: &Model, relation: RelationId) -> bool {
    match model.relation(relation).args.as_slice() {
        [only] => model.concept(*only).hidden,
        _ => false,
    }
}

/// Targets of `Defined` designators on `concept` and on every concept
/// nested in its descriptor.
fn collect_designated(model: &Model, concept: ConceptId, out: &mut HashSet<ConceptId>) {
    let Some(referent) = &model.concept(concept).referent else {
        return;
    };
    if let Some(Designator::Defined(target)) = &referent.designator {
        out.insert(*target);
    }
    if let Some(g) = referent.descriptor {
        for &inner in &model.graph(g).concepts {
            collect_designated(model, inner, out);
        }
    }
}

/// The concept's designator names another concept, so it must be written
/// with its own `*label` ahead of the `?x` designator.
pub(super) fn carries_defined_designator(model: &Model, concept: ConceptId) -> bool {
    matches!(
        model
            .concept(concept)
            .referent
            .as_ref()
            .and_then(|r| r.designator.as_ref()),
        Some(Designator::Defined(_))
    )
}

/// The first coreference set of `concept` that has more than one member.
pub(super) fn shared_set(model: &Model, concept: ConceptId) -> Option<CorefSetId> {
    model
        .concept(concept)
        .coref_sets
        .iter()
        .copied()
        .find(|&s| model.coref_set(s).members.len() > 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgx_model::{Referent, RelationKind};

    #[test]
    fn concept_in_two_relations_needs_label() {
        let mut m = Model::new();
        let g = m.new_graph(None);
        let a = m.new_concept(None);
        let b = m.new_concept(None);
        let c = m.new_concept(None);
        for x in [a, b, c] {
            m.add_concept(g, x);
        }
        let r1 = m.new_relation(None, vec![a, b], RelationKind::Relation);
        let r2 = m.new_relation(None, vec![c, b], RelationKind::Relation);
        m.add_relation(g, r1);
        m.add_relation(g, r2);

        let plan = GraphPlan::new(&m, g);
        assert!(plan.needs_label.contains(&b));
        assert!(!plan.needs_label.contains(&a));
        assert_eq!(plan.primary[&a], vec![r1]);
        assert_eq!(plan.order, vec![a, c, b]);
    }

    #[test]
    fn repeated_argument_needs_label() {
        let mut m = Model::new();
        let g = m.new_graph(None);
        let a = m.new_concept(None);
        m.add_concept(g, a);
        let r = m.new_relation(None, vec![a, a], RelationKind::Relation);
        m.add_relation(g, r);
        assert!(GraphPlan::new(&m, g).needs_label.contains(&a));
    }

    #[test]
    fn designator_target_needs_label_and_is_written_first() {
        let mut m = Model::new();
        let g = m.new_graph(None);
        let a = m.new_concept(None);
        let b = m.new_concept(None);
        let c = m.new_concept(None);
        for x in [a, b, c] {
            m.add_concept(g, x);
        }
        m.set_referent(
            b,
            Referent {
                designator: Some(Designator::Defined(c)),
                ..Referent::default()
            },
        );
        let r = m.new_relation(None, vec![b, a], RelationKind::Relation);
        m.add_relation(g, r);

        let plan = GraphPlan::new(&m, g);
        assert!(plan.needs_label.contains(&c));
        assert_eq!(plan.order, vec![c, b, a]);
        assert!(carries_defined_designator(&m, b));
        assert!(!carries_defined_designator(&m, c));
    }

    #[test]
    fn designator_target_in_outer_graph_needs_label() {
        let mut m = Model::new();
        let g = m.new_graph(None);
        let a = m.new_concept(None);
        let prop = m.new_concept(None);
        m.add_concept(g, a);
        m.add_concept(g, prop);
        let inner = m.new_graph(Some(prop));
        let b = m.new_concept(None);
        m.add_concept(inner, b);
        m.set_referent(
            b,
            Referent {
                designator: Some(Designator::Defined(a)),
                ..Referent::default()
            },
        );
        m.set_referent(prop, Referent::with_descriptor(inner));

        let plan = GraphPlan::new(&m, g);
        assert!(plan.needs_label.contains(&a));
        assert_eq!(plan.order, vec![a, prop]);
    }

    #[test]
    fn actor_arguments_always_labelled_and_never_primary() {
        let mut m = Model::new();
        let g = m.new_graph(None);
        let a = m.new_concept(None);
        let b = m.new_concept(None);
        m.add_concept(g, a);
        m.add_concept(g, b);
        let r = m.new_relation(None, vec![a, b], RelationKind::Actor { outputs_from: 1 });
        m.add_relation(g, r);
        let plan = GraphPlan::new(&m, g);
        assert!(plan.needs_label.contains(&a));
        assert!(plan.needs_label.contains(&b));
        assert!(plan.primary.is_empty());
    }
}
