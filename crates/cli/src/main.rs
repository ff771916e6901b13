mod config;

use std::collections::{BTreeSet, HashSet};
use std::error::Error;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use cgx_core::{CgError, Notation, ParseOptions, Session};
use cgx_model::{CorefSetId, GraphId, Hierarchy, Model};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Textual notation of an input or output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum NotationArg {
    /// Bracket interchange form
    Cgif,
    /// Arrow-based linear form
    Linear,
}

impl From<NotationArg> for Notation {
    fn from(n: NotationArg) -> Self {
        match n {
            NotationArg::Cgif => Notation::Cgif,
            NotationArg::Linear => Notation::Linear,
        }
    }
}

/// Conceptual-graph notation translator.
#[derive(Parser)]
#[command(name = "cgx", version, about = "Conceptual-graph notation translator")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log parser and generator decisions to stderr
    #[arg(long, global = true)]
    verbose: bool,

    /// Path to a cgx.toml with parse options and type declarations
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a file and print a JSON summary of the graph
    Parse {
        /// Path to the source file
        file: PathBuf,
        #[arg(long, default_value = "cgif", value_enum)]
        notation: NotationArg,
    },

    /// Translate a file from one notation to the other
    Convert {
        /// Path to the source file
        file: PathBuf,
        #[arg(long, default_value = "cgif", value_enum)]
        from: NotationArg,
        #[arg(long, default_value = "linear", value_enum)]
        to: NotationArg,
    },

    /// Parse, regenerate and reparse a file, checking the structure survives
    Roundtrip {
        /// Path to the source file
        file: PathBuf,
        #[arg(long, default_value = "cgif", value_enum)]
        notation: NotationArg,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (options, hierarchy) = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(loaded) => loaded,
            Err(msg) => {
                report_error(&msg, cli.output, cli.quiet);
                process::exit(1);
            }
        },
        None => (ParseOptions::default(), Hierarchy::new()),
    };
    let ctx = Context {
        options,
        hierarchy,
        output: cli.output,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Commands::Parse { file, notation } => cmd_parse(&ctx, &file, notation.into()),
        Commands::Convert { file, from, to } => cmd_convert(&ctx, &file, from.into(), to.into()),
        Commands::Roundtrip { file, notation } => cmd_roundtrip(&ctx, &file, notation.into()),
    };
    if let Err(err) = result {
        report_cg_error(&err, ctx.output, ctx.quiet);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: &Path) -> Result<(ParseOptions, Hierarchy), String> {
    let config = config::read_config(path)?;
    let hierarchy = config.hierarchy()?;
    debug!(
        path = %path.display(),
        concept_types = config.concept_types.len(),
        relation_types = config.relation_types.len(),
        "loaded config"
    );
    Ok((config.parse, hierarchy))
}

/// Settings shared by every subcommand.
struct Context {
    options: ParseOptions,
    hierarchy: Hierarchy,
    output: OutputFormat,
    quiet: bool,
}

impl Context {
    fn session(&self) -> Session {
        Session::with_options(self.options.clone())
    }

    fn model(&self) -> Model {
        Model::with_hierarchy(self.hierarchy.clone())
    }

    fn read_graph(&self, path: &Path, notation: Notation) -> Result<(Model, GraphId), CgError> {
        let mut model = self.model();
        let mut file = File::open(path)?;
        let graph = self
            .session()
            .parse_graph_from_reader(&mut model, &mut file, notation)?;
        debug!(path = %path.display(), ?notation, %graph, "parsed file");
        Ok((model, graph))
    }
}

// ──────────────────────────────────────────────
// Subcommands
// ──────────────────────────────────────────────

fn cmd_parse(ctx: &Context, path: &Path, notation: Notation) -> Result<(), CgError> {
    let (model, graph) = ctx.read_graph(path, notation)?;
    let summary = GraphSummary::of(&model, graph);
    let pretty = serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_owned());
    println!("{}", pretty);
    Ok(())
}

fn cmd_convert(ctx: &Context, path: &Path, from: Notation, to: Notation) -> Result<(), CgError> {
    let (model, graph) = ctx.read_graph(path, from)?;
    let text = Session::new().generate_graph(&model, graph, to)?;
    match ctx.output {
        OutputFormat::Text => println!("{}", text),
        OutputFormat::Json => println!("{}", serde_json::json!({ "text": text })),
    }
    Ok(())
}

fn cmd_roundtrip(ctx: &Context, path: &Path, notation: Notation) -> Result<(), CgError> {
    let (model, graph) = ctx.read_graph(path, notation)?;
    let text = Session::new().generate_graph(&model, graph, notation)?;

    let mut reread = ctx.model();
    let graph2 = ctx.session().parse_graph(&mut reread, &text, notation)?;
    let before = GraphSummary::of(&model, graph);
    let after = GraphSummary::of(&reread, graph2);
    let stable = before == after;
    debug!(stable, "compared round trip");

    match ctx.output {
        OutputFormat::Text => {
            println!("{}", text);
            if !ctx.quiet {
                if stable {
                    eprintln!("round trip stable");
                } else {
                    eprintln!("round trip changed the graph");
                }
            }
        }
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "text": text, "stable": stable, "before": before, "after": after })
        ),
    }
    if !stable {
        process::exit(1);
    }
    Ok(())
}

// ──────────────────────────────────────────────
// Summary
// ──────────────────────────────────────────────

/// Counts over a graph and every graph nested in it.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
struct GraphSummary {
    graphs: usize,
    concepts: usize,
    relations: usize,
    actors: usize,
    coreference_sets: usize,
    concept_types: BTreeSet<String>,
    relation_types: BTreeSet<String>,
}

impl GraphSummary {
    fn of(model: &Model, graph: GraphId) -> Self {
        let mut summary = GraphSummary::default();
        let mut sets = HashSet::new();
        summary.visit(model, graph, &mut sets);
        summary.coreference_sets = sets.len();
        summary
    }

    fn visit(&mut self, model: &Model, graph: GraphId, sets: &mut HashSet<CorefSetId>) {
        let data = model.graph(graph);
        self.graphs += 1;
        for &c in &data.concepts {
            let concept = model.concept(c);
            self.concepts += 1;
            sets.extend(concept.coref_sets.iter().copied());
            if let Some(ty) = concept.ty {
                let label = model.hierarchy.concepts.label(ty).unwrap_or("(lambda)");
                self.concept_types.insert(label.to_owned());
            }
            if let Some(inner) = concept.referent.as_ref().and_then(|r| r.descriptor) {
                self.visit(model, inner, sets);
            }
        }
        for &r in &data.relations {
            let relation = model.relation(r);
            if relation.is_actor() {
                self.actors += 1;
            } else {
                self.relations += 1;
            }
            if let Some(ty) = relation.ty {
                let label = model.hierarchy.relations.label(ty).unwrap_or("(lambda)");
                self.relation_types.insert(label.to_owned());
            }
        }
    }
}

// ──────────────────────────────────────────────
// Error reporting
// ──────────────────────────────────────────────

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": msg })),
    }
}

fn report_cg_error(err: &CgError, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => {
            eprintln!("error: {}", err);
            let mut cause = err.source();
            while let Some(c) = cause {
                eprintln!("  caused by: {}", c);
                cause = c.source();
            }
        }
        OutputFormat::Json => eprintln!("{}", err.to_json_value()),
    }
}
