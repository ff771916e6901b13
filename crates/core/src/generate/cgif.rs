use super::labeling::{is_negation, GraphPlan};
use super::Generator;
use crate::error::CgError;
use cgx_model::{ConceptId, GraphId, RelationId};

impl<'a> Generator<'a> {
    /// One item per top-level concept, relation, negation or actor.
    pub(super) fn cgif_graph(&mut self, graph: GraphId) -> Result<Vec<String>, CgError> {
        let model = self.model;
        let plan = GraphPlan::new(model, graph);
        let mut items = self.comment_items(graph);

        for &c in &plan.order {
            if self.emitted.contains_key(&c) {
                continue;
            }
            let label = self.open_label(c, self.needs_label(&plan, c));
            let primaries = self.unwritten(plan.primary.get(&c));
            if label.is_none() && primaries.len() == 1 {
                self.cgif_relation(&plan, primaries[0], Some(c), &mut items)?;
                continue;
            }
            items.push(self.emit_concept(c, label)?);
            for r in primaries {
                self.cgif_relation(&plan, r, None, &mut items)?;
            }
        }

        for &r in &model.graph(graph).relations {
            if self.written.contains(&r) {
                continue;
            }
            if is_negation(model, r) {
                items.push(self.negation_text(r)?);
            } else if model.relation(r).is_actor() {
                items.push(self.actor_text(r)?);
            } else {
                self.cgif_relation(&plan, r, None, &mut items)?;
            }
        }
        Ok(items)
    }

    /// `(R arg...)`, then the relations started by arguments written inline here.
    ///
    /// With `inline_head`, the first argument is written in place as `[A]`.
    pub(super) fn cgif_relation(
        &mut self,
        plan: &GraphPlan,
        relation: RelationId,
        inline_head: Option<ConceptId>,
        items: &mut Vec<String>,
    ) -> Result<(), CgError> {
        if !self.written.insert(relation) {
            return Ok(());
        }
        let model = self.model;
        let data = model.relation(relation);
        let mut out = format!("({}", self.relation_type_text(relation)?);
        let mut fresh = Vec::new();

        for (i, &arg) in data.args.iter().enumerate() {
            out.push(' ');
            if i == 0 && inline_head == Some(arg) {
                out.push_str(&self.emit_concept(arg, None)?);
            } else if self.emitted.contains_key(&arg) {
                out.push_str(&self.reference(arg)?);
            } else {
                out.push_str(&self.first_emission(plan, arg)?);
                fresh.push(arg);
            }
        }
        if let Some(comment) = &data.comment {
            out.push_str(" ;");
            out.push_str(comment);
        }
        out.push(')');
        items.push(out);

        for arg in fresh {
            for r in self.unwritten(plan.primary.get(&arg)) {
                self.cgif_relation(plan, r, None, items)?;
            }
        }
        Ok(())
    }
}
