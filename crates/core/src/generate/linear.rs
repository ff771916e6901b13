use super::labeling::{is_negation, GraphPlan};
use super::Generator;
use crate::error::CgError;
use cgx_model::{ConceptId, GraphId, RelationId};

const INDENT: &str = "    ";

impl<'a> Generator<'a> {
    /// One `.`-terminated statement per chain, negation, actor or stray relation.
    pub(super) fn linear_graph(&mut self, graph: GraphId) -> Result<Vec<String>, CgError> {
        let model = self.model;
        let plan = GraphPlan::new(model, graph);
        let mut items = self.comment_items(graph);

        for &c in &plan.order {
            if self.emitted.contains_key(&c) {
                continue;
            }
            let mut out = self.first_emission(&plan, c)?;
            self.linear_links(&plan, c, 0, false, &mut out)?;
            out.push('.');
            items.push(out);
        }

        for &r in &model.graph(graph).relations {
            if self.written.contains(&r) {
                continue;
            }
            let mut out = if is_negation(model, r) {
                self.negation_text(r)?
            } else if model.relation(r).is_actor() {
                self.actor_text(r)?
            } else {
                match model.relation(r).args.first() {
                    None => {
                        self.written.insert(r);
                        format!("({})", self.linear_relation_node(r)?)
                    }
                    Some(&head) => {
                        let mut out = if self.emitted.contains_key(&head) {
                            self.reference(head)?
                        } else {
                            self.first_emission(&plan, head)?
                        };
                        self.linear_link(&plan, r, 0, false, &mut out)?;
                        out
                    }
                }
            };
            out.push('.');
            items.push(out);
        }
        Ok(items)
    }

    /// Relations started by `head`: one continues the chain, several fan out.
    fn linear_links(
        &mut self,
        plan: &GraphPlan,
        head: ConceptId,
        depth: usize,
        in_fan_out: bool,
        out: &mut String,
    ) -> Result<(), CgError> {
        let primaries = self.unwritten(plan.primary.get(&head));
        match primaries.as_slice() {
            [] => Ok(()),
            [only] => self.linear_link(plan, *only, depth, in_fan_out, out),
            many => {
                out.push('-');
                for &r in many {
                    out.push('\n');
                    out.push_str(&INDENT.repeat(depth + 1));
                    self.linear_branch(plan, r, depth + 1, out)?;
                }
                if in_fan_out {
                    out.push(',');
                }
                Ok(())
            }
        }
    }

    /// ` -> (R) -> [B] ...` after the relation's first argument.
    fn linear_link(
        &mut self,
        plan: &GraphPlan,
        relation: RelationId,
        depth: usize,
        in_fan_out: bool,
        out: &mut String,
    ) -> Result<(), CgError> {
        self.written.insert(relation);
        out.push_str(" -> (");
        out.push_str(&self.linear_relation_node(relation)?);
        out.push(')');
        self.linear_arguments(plan, relation, depth, in_fan_out, out)
    }

    /// `(R) -> [B] ...` as one line of a fan-out.
    fn linear_branch(
        &mut self,
        plan: &GraphPlan,
        relation: RelationId,
        depth: usize,
        out: &mut String,
    ) -> Result<(), CgError> {
        self.written.insert(relation);
        out.push('(');
        out.push_str(&self.linear_relation_node(relation)?);
        out.push(')');
        self.linear_arguments(plan, relation, depth, true, out)
    }

    /// Arguments after the first: one follows an arrow, more use numbered arcs.
    fn linear_arguments(
        &mut self,
        plan: &GraphPlan,
        relation: RelationId,
        depth: usize,
        in_fan_out: bool,
        out: &mut String,
    ) -> Result<(), CgError> {
        let model = self.model;
        match model.relation(relation).args.as_slice() {
            [] | [_] => Ok(()),
            [_, target] => {
                out.push_str(" -> ");
                self.linear_target(plan, *target, depth, in_fan_out, out)
            }
            [_, rest @ ..] => {
                out.push('-');
                for (i, &target) in rest.iter().enumerate() {
                    out.push('\n');
                    out.push_str(&INDENT.repeat(depth + 1));
                    out.push_str(&format!("-{}-> ", i + 1));
                    self.linear_target(plan, target, depth + 1, true, out)?;
                }
                if in_fan_out {
                    out.push(',');
                }
                Ok(())
            }
        }
    }

    /// A concept written here for the first time continues the chain; one
    /// written before is referenced by label.
    fn linear_target(
        &mut self,
        plan: &GraphPlan,
        target: ConceptId,
        depth: usize,
        in_fan_out: bool,
        out: &mut String,
    ) -> Result<(), CgError> {
        if self.emitted.contains_key(&target) {
            out.push_str(&self.reference(target)?);
            return Ok(());
        }
        out.push_str(&self.first_emission(plan, target)?);
        self.linear_links(plan, target, depth, in_fan_out, out)
    }

    fn linear_relation_node(&mut self, relation: RelationId) -> Result<String, CgError> {
        let mut text = self.relation_type_text(relation)?;
        if let Some(comment) = &self.model.relation(relation).comment {
            text.push_str(" ;");
            text.push_str(comment);
        }
        Ok(text)
    }
}
