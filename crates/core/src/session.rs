//! A translation session: the label and marker tables shared by a sequence
//! of parse and generate calls, plus the parse options.

use crate::error::CgError;
use crate::generate::Generator;
use crate::labels::DefiningLabelTable;
use crate::lexer::{lex, Notation};
use crate::markers::MarkerTable;
use crate::options::ParseOptions;
use crate::parser::Parser;
use cgx_model::{ConceptId, GraphId, Model, RelationId};
use std::io::{Read, Write};
use std::mem;

#[derive(Debug, Clone, Default)]
pub struct Session {
    labels: DefiningLabelTable,
    markers: MarkerTable,
    options: ParseOptions,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Session {
            options,
            ..Session::default()
        }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut ParseOptions {
        &mut self.options
    }

    pub fn labels(&self) -> &DefiningLabelTable {
        &self.labels
    }

    pub fn labels_mut(&mut self) -> &mut DefiningLabelTable {
        &mut self.labels
    }

    pub fn markers(&self) -> &MarkerTable {
        &self.markers
    }

    pub fn markers_mut(&mut self) -> &mut MarkerTable {
        &mut self.markers
    }

    /// Swap in another label table, returning the one in use.
    pub fn replace_labels(&mut self, labels: DefiningLabelTable) -> DefiningLabelTable {
        mem::replace(&mut self.labels, labels)
    }

    pub fn replace_markers(&mut self, markers: MarkerTable) -> MarkerTable {
        mem::replace(&mut self.markers, markers)
    }

    pub fn reset_units(&mut self) {
        self.labels.reset_unit();
        self.markers.reset_unit();
    }

    // -- Parsing ------------------------------------------------

    fn parser<'s>(
        &'s mut self,
        model: &'s mut Model,
        src: &str,
        notation: Notation,
    ) -> Result<Parser<'s>, CgError> {
        let tokens = lex(src, notation)?;
        Ok(Parser::new(
            tokens,
            notation,
            model,
            &mut self.labels,
            &mut self.markers,
            &self.options,
        ))
    }

    /// Parse `src` into a new graph. Labels it defines are dropped afterwards.
    pub fn parse_graph(
        &mut self,
        model: &mut Model,
        src: &str,
        notation: Notation,
    ) -> Result<GraphId, CgError> {
        self.labels.push_context();
        let parsed = self.parse_outermost_graph(model, src, notation);
        self.labels.pop_context();
        parsed
    }

    /// Parse `src` into a new graph, keeping its labels bound in the session
    /// so that later calls can refer to them.
    pub fn parse_outermost_graph(
        &mut self,
        model: &mut Model,
        src: &str,
        notation: Notation,
    ) -> Result<GraphId, CgError> {
        let graph = model.new_graph(None);
        self.parser(model, src, notation)?.parse_graph_into(graph)?;
        Ok(graph)
    }

    /// Parse a whole reader as one graph. The reader is not closed.
    pub fn parse_graph_from_reader<R: Read>(
        &mut self,
        model: &mut Model,
        reader: &mut R,
        notation: Notation,
    ) -> Result<GraphId, CgError> {
        let mut src = String::new();
        reader.read_to_string(&mut src)?;
        self.parse_graph(model, &src, notation)
    }

    /// Parse one concept, added to `graph` when given.
    pub fn parse_concept(
        &mut self,
        model: &mut Model,
        graph: Option<GraphId>,
        src: &str,
        notation: Notation,
    ) -> Result<ConceptId, CgError> {
        self.parser(model, src, notation)?.parse_single_concept(graph)
    }

    /// Parse one `(R arc...)` relation, added to `graph` when given.
    pub fn parse_relation(
        &mut self,
        model: &mut Model,
        graph: Option<GraphId>,
        src: &str,
        notation: Notation,
    ) -> Result<RelationId, CgError> {
        let relation = self.parser(model, src, notation)?.parse_single_relation(graph)?;
        if let Some(g) = graph {
            model.add_relation(g, relation);
        }
        Ok(relation)
    }

    /// Parse one `<A in... | out...>` actor, added to `graph` when given.
    pub fn parse_actor(
        &mut self,
        model: &mut Model,
        graph: Option<GraphId>,
        src: &str,
        notation: Notation,
    ) -> Result<RelationId, CgError> {
        let actor = self.parser(model, src, notation)?.parse_single_actor(graph)?;
        if let Some(g) = graph {
            model.add_relation(g, actor);
        }
        Ok(actor)
    }

    // -- Generation ---------------------------------------------

    fn generator<'s>(&'s mut self, model: &'s Model, notation: Notation) -> Generator<'s> {
        Generator::new(model, &mut self.labels, &mut self.markers, notation)
    }

    /// Write `graph` as text. Labels minted for it are dropped afterwards.
    pub fn generate_graph(
        &mut self,
        model: &Model,
        graph: GraphId,
        notation: Notation,
    ) -> Result<String, CgError> {
        self.labels.push_context();
        let text = self.generate_outermost_graph(model, graph, notation);
        self.labels.pop_context();
        text
    }

    /// Write `graph` as text, keeping the labels minted for it in the session.
    pub fn generate_outermost_graph(
        &mut self,
        model: &Model,
        graph: GraphId,
        notation: Notation,
    ) -> Result<String, CgError> {
        self.generator(model, notation).graph(graph)
    }

    pub fn generate_concept(
        &mut self,
        model: &Model,
        concept: ConceptId,
        notation: Notation,
    ) -> Result<String, CgError> {
        self.generator(model, notation).concept(concept)
    }

    pub fn generate_relation(
        &mut self,
        model: &Model,
        relation: RelationId,
        notation: Notation,
    ) -> Result<String, CgError> {
        self.generator(model, notation).relation(relation)
    }

    pub fn generate_actor(
        &mut self,
        model: &Model,
        actor: RelationId,
        notation: Notation,
    ) -> Result<String, CgError> {
        self.generator(model, notation).actor(actor)
    }

    /// Write `graph` followed by a newline. The writer is not closed.
    pub fn write_graph<W: Write>(
        &mut self,
        model: &Model,
        graph: GraphId,
        notation: Notation,
        out: &mut W,
    ) -> Result<(), CgError> {
        let text = self.generate_graph(model, graph, notation)?;
        writeln!(out, "{}", text)?;
        Ok(())
    }
}
