use anyhow::{Context as AnyhowContext, Result};
use ccg_extractor::StructuralExtractor;
use ccg_graph::{CodeGraph, GraphBuilder, GraphSnapshot};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

mod config;
mod flags;

use config::CliConfig;
use flags::{EdgeKindFlag, NodeKindFlag};

#[derive(Parser)]
#[command(name = "ccg")]
#[command(about = "Build and query a code context graph", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the structural record of one file
    Extract(ExtractArgs),

    /// Extract files in the given order and export the graph snapshot
    Build(BuildArgs),

    /// Query a previously exported snapshot
    Query(QueryArgs),
}

#[derive(Args)]
struct ExtractArgs {
    /// Source file
    file: PathBuf,
}

#[derive(Args)]
struct BuildArgs {
    /// Source files; order decides inheritance resolution
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Write the snapshot here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the ingest report to stderr
    #[arg(long)]
    report: bool,
}

#[derive(Args)]
struct QueryArgs {
    /// Snapshot produced by `ccg build`
    #[arg(long)]
    graph: PathBuf,

    #[command(subcommand)]
    query: Query,
}

#[derive(Subcommand)]
enum Query {
    /// Show one node by id (e.g. class_3)
    Node { id: String },

    /// List nodes of a type
    Type {
        #[arg(value_enum)]
        kind: NodeKindFlag,
    },

    /// Edges of a node
    Relationships {
        id: String,
        #[arg(long, value_enum)]
        kind: Option<EdgeKindFlag>,
    },

    /// Names of functions calling NAME
    Callers { name: String },

    /// Names of functions called by NAME
    Callees { name: String },

    /// Classes inheriting from NAME
    Subclasses { name: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract(args) => run_extract(args, config),
        Commands::Build(args) => run_build(args, config),
        Commands::Query(args) => run_query(args),
    }
}

fn run_extract(args: ExtractArgs, config: CliConfig) -> Result<()> {
    let extractor = StructuralExtractor::new(config.extractor)?;
    let record = extractor.extract(&args.file);
    print_json(&record)
}

fn run_build(args: BuildArgs, config: CliConfig) -> Result<()> {
    let extractor = StructuralExtractor::new(config.extractor)?;
    let records = extractor.extract_batch(&args.files);

    let mut builder = GraphBuilder::new();
    let report = builder.ingest(&records);
    let graph = builder.finish();

    if args.report {
        eprintln!("{}", serde_json::to_string_pretty(&report)?);
    }

    let json = graph.to_snapshot().to_json_string()?;
    match args.output {
        Some(path) => {
            fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Snapshot written to {}", path.display());
            Ok(())
        }
        None => print_stdout(&json),
    }
}

fn run_query(args: QueryArgs) -> Result<()> {
    let graph = load_graph(&args.graph)?;

    match args.query {
        Query::Node { id } => {
            let node = graph
                .resolve_key(&id)
                .with_context(|| format!("Unknown node id {id}"))?;
            let entry = graph
                .node_snapshot(node)
                .with_context(|| format!("Unknown node id {id}"))?;
            print_json(&entry)
        }
        Query::Type { kind } => {
            let ids: Vec<String> = graph
                .find_nodes_by_type(kind.as_domain())
                .iter()
                .map(|node| node.key())
                .collect();
            print_json(&ids)
        }
        Query::Relationships { id, kind } => {
            let node = graph
                .resolve_key(&id)
                .with_context(|| format!("Unknown node id {id}"))?;
            let edges: Vec<(String, String)> = graph
                .query_relationships(node, kind.map(EdgeKindFlag::as_domain))
                .into_iter()
                .filter_map(|(target, edge)| {
                    graph
                        .get_node(target)
                        .map(|t| (t.key(), edge.as_str().to_string()))
                })
                .collect();
            print_json(&edges)
        }
        Query::Callers { name } => print_json(&graph.get_callers(&name)),
        Query::Callees { name } => print_json(&graph.get_callees(&name)),
        Query::Subclasses { name } => print_json(&graph.get_subclasses(&name)),
    }
}

fn load_graph(path: &Path) -> Result<CodeGraph> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let snapshot = GraphSnapshot::from_json_str(&raw)
        .with_context(|| format!("Invalid snapshot {}", path.display()))?;
    Ok(CodeGraph::from_snapshot(&snapshot)?)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    print_stdout(&serde_json::to_string_pretty(value)?)
}

fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}
