//! Model to text, in either notation.
//!
//! The generator walks a graph's concepts (those that start relations
//! first), writing each once. A concept gets a label only when later text
//! must refer back to it or when its own designator is a `?x` reference:
//!
//! - members of a shared coreference set
//! - concepts referenced by two or more relation arcs
//! - actor arguments
//! - targets and carriers of `Defined` designators
//!
//! Everything else is written inline.

use crate::error::{CgError, GenerateErrorKind};
use crate::labels::DefiningLabelTable;
use crate::lexer::Notation;
use crate::markers::MarkerTable;
use cgx_model::{
    ConceptId, Designator, GraphId, Literal, Model, Number, Quantifier, Referent, RelationId,
    RelationTypeId, TypeDefinition, TypeId,
};
use std::collections::{HashMap, HashSet};
use std::mem;

mod cgif;
mod labeling;
mod linear;

use labeling::{carries_defined_designator, shared_set, GraphPlan};

/// How a concept's label is written where the concept itself appears.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LabelText {
    Defining(String),
    Bound(String),
}

impl LabelText {
    fn name(&self) -> &str {
        match self {
            LabelText::Defining(l) | LabelText::Bound(l) => l,
        }
    }

    fn render(&self) -> String {
        match self {
            LabelText::Defining(l) => format!("*{}", l),
            LabelText::Bound(l) => format!("?{}", l),
        }
    }
}

// ──────────────────────────────────────────────
// Generator
// ──────────────────────────────────────────────

pub(crate) struct Generator<'a> {
    model: &'a Model,
    labels: &'a mut DefiningLabelTable,
    markers: &'a mut MarkerTable,
    notation: Notation,
    /// Concepts already written, with the label later references use.
    emitted: HashMap<ConceptId, Option<String>>,
    written: HashSet<RelationId>,
}

impl<'a> Generator<'a> {
    pub(crate) fn new(
        model: &'a Model,
        labels: &'a mut DefiningLabelTable,
        markers: &'a mut MarkerTable,
        notation: Notation,
    ) -> Self {
        Generator {
            model,
            labels,
            markers,
            notation,
            emitted: HashMap::new(),
            written: HashSet::new(),
        }
    }

    // -- Entry points -------------------------------------------

    pub(crate) fn graph(&mut self, graph: GraphId) -> Result<String, CgError> {
        Ok(self.graph_items(graph)?.join("\n"))
    }

    pub(crate) fn concept(&mut self, concept: ConceptId) -> Result<String, CgError> {
        self.first_emission(&GraphPlan::detached(), concept)
    }

    /// A relation in bracket form, `(R [A] ?x)`, whatever the notation.
    pub(crate) fn relation(&mut self, relation: RelationId) -> Result<String, CgError> {
        let mut items = Vec::new();
        self.cgif_relation(&GraphPlan::detached(), relation, None, &mut items)?;
        Ok(items.join("\n"))
    }

    pub(crate) fn actor(&mut self, actor: RelationId) -> Result<String, CgError> {
        self.actor_text(actor)
    }

    // -- Graphs -------------------------------------------------

    fn graph_items(&mut self, graph: GraphId) -> Result<Vec<String>, CgError> {
        match self.notation {
            Notation::Cgif => self.cgif_graph(graph),
            Notation::Linear => self.linear_graph(graph),
        }
    }

    /// A descriptor or negated graph, in its own label context, on one line.
    fn nested_graph(&mut self, graph: GraphId) -> Result<String, CgError> {
        self.labels.push_context();
        let items = self.graph_items(graph);
        self.labels.pop_context();
        Ok(items?.join(" "))
    }

    fn comment_items(&self, graph: GraphId) -> Vec<String> {
        self.model
            .graph(graph)
            .comments
            .iter()
            .map(|c| format!("/** {} */", c))
            .collect()
    }

    fn unwritten(&self, relations: Option<&Vec<RelationId>>) -> Vec<RelationId> {
        relations
            .map(|rs| {
                rs.iter()
                    .copied()
                    .filter(|r| !self.written.contains(r))
                    .collect()
            })
            .unwrap_or_default()
    }

    // -- Concepts -----------------------------------------------

    /// Decide the label of `concept` where it is first written.
    fn open_label(&mut self, concept: ConceptId, needs_label: bool) -> Option<LabelText> {
        if let Some(set) = shared_set(self.model, concept) {
            let label = match self.labels.label_by_coreference_set(set) {
                Some(l) => l.to_owned(),
                None => {
                    let l = self.labels.next_available_label();
                    self.labels.map_label_to_coreference_set(&l, set);
                    l
                }
            };
            return Some(if self.model.coref_set(set).defining == concept {
                LabelText::Defining(label)
            } else {
                LabelText::Bound(label)
            });
        }
        if let Some(l) = self.labels.label_by_concept(concept) {
            return Some(LabelText::Defining(l.to_owned()));
        }
        if needs_label {
            let l = self.labels.next_available_label();
            self.labels.map_label_to_concept(&l, concept);
            return Some(LabelText::Defining(l));
        }
        None
    }

    fn first_emission(&mut self, plan: &GraphPlan, concept: ConceptId) -> Result<String, CgError> {
        let label = self.open_label(concept, self.needs_label(plan, concept));
        self.emit_concept(concept, label)
    }

    /// Whether `concept` needs a label, counting its own designator.
    pub(super) fn needs_label(&self, plan: &GraphPlan, concept: ConceptId) -> bool {
        plan.needs_label.contains(&concept) || carries_defined_designator(self.model, concept)
    }

    /// Record `concept` as written, then render it.
    fn emit_concept(
        &mut self,
        concept: ConceptId,
        label: Option<LabelText>,
    ) -> Result<String, CgError> {
        self.emitted
            .insert(concept, label.as_ref().map(|l| l.name().to_owned()));
        let model = self.model;
        let data = model.concept(concept);

        if let Some(special) = &data.special {
            let body = match data.referent.as_ref().and_then(|r| r.descriptor) {
                Some(g) => format!(" {}", self.nested_graph(g)?),
                None => String::new(),
            };
            return Ok(format!("[{}{}]", special, body));
        }

        // `[T: ?y ?x]` would read back as two coreference links.
        if carries_defined_designator(model, concept)
            && !matches!(label, Some(LabelText::Defining(_)))
        {
            return Err(CgError::generate(
                GenerateErrorKind::DesignatorConflict,
                format!(
                    "concept {} has a defined designator but is not written with a defining label",
                    concept
                ),
            ));
        }

        let mut out = String::from("[");
        if let Some(ty) = data.ty {
            out.push_str(&self.concept_type_text(ty)?);
        }
        let mut parts = Vec::new();
        if let Some(l) = &label {
            parts.push(l.render());
        }
        if let Some(referent) = &data.referent {
            self.referent_parts(referent, &mut parts)?;
        }
        if !parts.is_empty() {
            if data.ty.is_some() {
                out.push_str(": ");
            }
            out.push_str(&parts.join(" "));
        }
        if let Some(comment) = &data.comment {
            out.push_str(" ;");
            out.push_str(comment);
        }
        out.push(']');
        Ok(out)
    }

    /// `?x` for a concept written elsewhere.
    fn reference(&self, concept: ConceptId) -> Result<String, CgError> {
        match self.emitted.get(&concept) {
            Some(Some(label)) => return Ok(format!("?{}", label)),
            Some(None) => {
                return Err(CgError::generate(
                    GenerateErrorKind::NoCoreferenceSet,
                    format!("concept {} was written without a label", concept),
                ))
            }
            None => {}
        }
        if let Some(&set) = self.model.concept(concept).coref_sets.first() {
            return match self.labels.label_by_coreference_set(set) {
                Some(l) => Ok(format!("?{}", l)),
                None => Err(CgError::generate(
                    GenerateErrorKind::UnlabelledCoreferenceSet,
                    format!("coreference set {} of concept {} has no label", set, concept),
                )),
            };
        }
        match self.labels.label_by_concept(concept) {
            Some(l) => Ok(format!("?{}", l)),
            None => Err(CgError::generate(
                GenerateErrorKind::NoCoreferenceSet,
                format!("reference to concept {} with no coreference set", concept),
            )),
        }
    }

    fn referent_parts(&mut self, referent: &Referent, parts: &mut Vec<String>) -> Result<(), CgError> {
        if let Some(q) = &referent.quantifier {
            parts.push(match q {
                Quantifier::Every => "@every".to_owned(),
                Quantifier::Some => "@some".to_owned(),
                Quantifier::Count(n) => format!("@{}", n),
                Quantifier::Named(w) => format!("@{}", w),
            });
        }
        if let Some(d) = &referent.designator {
            let text = match d {
                Designator::Literal(Literal::Number { value }) => number_text(*value),
                Designator::Literal(Literal::String { value }) => quote(value, '"'),
                Designator::Literal(Literal::Encoded { encoding, payload }) => {
                    format!("%{} {}", encoding, quote(payload, '"'))
                }
                Designator::Name(name) => quote(name, '\''),
                Designator::Marker(m) => format!("#{}", self.markers.foreign_id_for(*m)),
                Designator::Defined(c) => self.reference(*c)?,
            };
            parts.push(text);
        }
        if let Some(g) = referent.descriptor {
            parts.push(self.nested_graph(g)?);
        }
        Ok(())
    }

    // -- Types --------------------------------------------------

    fn concept_type_text(&mut self, ty: TypeId) -> Result<String, CgError> {
        let model = self.model;
        let lattice = &model.hierarchy.concepts;
        match (lattice.label(ty), &lattice.node(ty).definition) {
            (Some(label), _) => Ok(label.to_owned()),
            (None, Some(def)) => self.lambda_text(def),
            (None, None) => Ok(lattice.label(lattice.top()).unwrap_or_default().to_owned()),
        }
    }

    fn relation_type_text(&mut self, relation: RelationId) -> Result<String, CgError> {
        let ty: RelationTypeId = self.model.relation(relation).ty.ok_or_else(|| {
            CgError::generate(
                GenerateErrorKind::MissingType,
                format!("relation {} has no type", relation),
            )
        })?;
        let model = self.model;
        let lattice = &model.hierarchy.relations;
        match (lattice.label(ty), &lattice.node(ty).definition) {
            (Some(label), _) => Ok(label.to_owned()),
            (None, Some(def)) => self.lambda_text(def),
            (None, None) => Err(CgError::generate(
                GenerateErrorKind::MissingType,
                format!("relation {} has an anonymous type with no definition", relation),
            )),
        }
    }

    /// `(lambda (T *x, U *y) body)`, with the body written from a clean slate.
    fn lambda_text(&mut self, def: &TypeDefinition) -> Result<String, CgError> {
        let concepts = &self.model.hierarchy.concepts;
        let signature: Vec<String> = def
            .parameters
            .iter()
            .map(|p| format!("{} *{}", concepts.label(p.ty).unwrap_or_default(), p.label))
            .collect();

        let emitted = mem::take(&mut self.emitted);
        let written = mem::take(&mut self.written);
        self.labels.push_context();
        for p in &def.parameters {
            if let Some(c) = p.concept {
                self.labels.map_label_to_concept(&p.label, c);
            }
        }
        let body = match def.body {
            Some(g) => self.graph_items(g).map(|items| format!(" {}", items.join(" "))),
            None => Ok(String::new()),
        };
        self.labels.pop_context();
        self.emitted = emitted;
        self.written = written;

        Ok(format!("(lambda ({}){})", signature.join(", "), body?))
    }

    // -- Actors and negation ------------------------------------

    fn actor_text(&mut self, actor: RelationId) -> Result<String, CgError> {
        self.written.insert(actor);
        let model = self.model;
        let data = model.relation(actor);
        let mut out = format!("<{}", self.relation_type_text(actor)?);
        for &input in data.inputs() {
            out.push(' ');
            out.push_str(&self.reference(input)?);
        }
        out.push_str(" |");
        for &output in data.outputs() {
            out.push(' ');
            out.push_str(&self.reference(output)?);
        }
        if let Some(comment) = &data.comment {
            out.push_str(" ;");
            out.push_str(comment);
        }
        out.push('>');
        Ok(out)
    }

    fn negation_text(&mut self, relation: RelationId) -> Result<String, CgError> {
        self.written.insert(relation);
        let wrapper = self.model.relation(relation).args[0];
        self.emitted.insert(wrapper, None);
        let body = match self
            .model
            .concept(wrapper)
            .referent
            .as_ref()
            .and_then(|r| r.descriptor)
        {
            Some(g) => self.nested_graph(g)?,
            None => String::new(),
        };
        Ok(format!("~[{}]", body))
    }
}

// ──────────────────────────────────────────────
// Literals
// ──────────────────────────────────────────────

fn number_text(n: Number) -> String {
    match n {
        Number::Int(i) => i.to_string(),
        // Keep a fraction so the value reads back as floating.
        Number::Float(f) if f.is_finite() && f.fract() == 0.0 => format!("{:.1}", f),
        Number::Float(f) => f.to_string(),
    }
}

fn quote(s: &str, delim: char) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push(delim);
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\\' => out.push_str("\\\\"),
            c if c == delim => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(delim);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_floats_keep_a_fraction() {
        assert_eq!(number_text(Number::Float(3.0)), "3.0");
        assert_eq!(number_text(Number::Float(2.5)), "2.5");
        assert_eq!(number_text(Number::Int(-7)), "-7");
    }

    #[test]
    fn quoting_escapes_delimiter_and_controls() {
        assert_eq!(quote("it's\n", '\''), r"'it\'s\n'");
        assert_eq!(quote(r#"say "hi""#, '"'), r#""say \"hi\"""#);
        assert_eq!(quote(r"a\b", '"'), r#""a\\b""#);
    }
}
