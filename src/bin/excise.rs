//! excise CLI: extract declarations and their dependencies.
//!
//! Usage:
//!   excise select -g pkg.json -g dep.json -y Reader,newReader
//!   excise select -g pkg.json -y Reader --json
//!   excise dot -g pkg.json            # merged use graph as DOT
//!   excise stats -g pkg.json          # graph statistics
//!
//! Partial graphs are JSON documents produced by the analysis front end.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use excise::config::{CONFIG_FILE, DEFAULT_LOG_FILTER};
use excise::{
    build_graph, select_with_config, ExciseConfig, ExciseError, PartialGraph, TargetSet, UseGraph,
};

/// Exit status for bad invocations (missing or empty targets).
const INVOCATION_ERROR: i32 = 2;

#[derive(Parser)]
#[command(name = "excise")]
#[command(about = "Extract declarations and their internal dependencies", long_about = None)]
struct Cli {
    /// Config file (default: ./excise.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select the declarations needed by the targets
    Select {
        /// Partial graph JSON files, merged in order
        #[arg(short, long = "graph", required = true)]
        graphs: Vec<PathBuf>,

        /// Declarations to extract (comma separated or repeated)
        #[arg(short = 'y', long = "target", required = true)]
        targets: Vec<String>,

        /// Print the selection as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the merged use graph as DOT
    Dot {
        #[arg(short, long = "graph", required = true)]
        graphs: Vec<PathBuf>,

        /// Include containment edges
        #[arg(long)]
        owns: bool,
    },

    /// Show graph statistics
    Stats {
        #[arg(short, long = "graph", required = true)]
        graphs: Vec<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    // An explicit --config must load; the implicit one may be absent or broken.
    let (loaded, fallback) = match &cli.config {
        Some(path) => (
            ExciseConfig::load(path).with_context(|| format!("loading {}", path.display())),
            None,
        ),
        None => {
            let (config, error) = ExciseConfig::load_or_default(Path::new(CONFIG_FILE));
            (Ok(config), error)
        }
    };
    let log_filter = loaded
        .as_ref()
        .map(|c| c.log_filter.as_str())
        .unwrap_or(DEFAULT_LOG_FILTER);

    // Logs go to stderr; stdout carries the result.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_filter)),
        )
        .init();

    if let Some(e) = fallback {
        warn!(path = CONFIG_FILE, error = %e, "invalid config, using defaults");
    }

    if let Err(e) = loaded.and_then(|config| run(cli, &config)) {
        eprintln!("Error: {:#}", e);
        let code = match e.downcast_ref::<ExciseError>() {
            Some(ExciseError::EmptyTargets | ExciseError::EmptyTargetName) => INVOCATION_ERROR,
            _ => 1,
        };
        std::process::exit(code);
    }
}

fn run(cli: Cli, config: &ExciseConfig) -> Result<()> {
    match cli.command {
        Commands::Select {
            graphs,
            targets,
            json,
        } => {
            let targets = TargetSet::new(targets.iter().flat_map(|t| t.split(',')))?;
            let graph = load_graph(&graphs)?;
            let selection = select_with_config(&graph, &targets, config)?;
            info!(
                targets = %targets,
                seen = selection.len(),
                external = selection.external.len(),
                "selection done"
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&selection)?);
                return Ok(());
            }

            println!("Wanted ({}):", selection.len());
            for &id in &selection.seen {
                if let Some(node) = graph.node(id) {
                    println!("  {} {} - {}", node.kind, node.name, node.position);
                }
            }
            if !selection.external.is_empty() {
                println!();
                println!("External ({}):", selection.external.len());
                for &id in &selection.external {
                    if let Some(node) = graph.node(id) {
                        match node.stable_path() {
                            Some(path) => println!("  {} {} - {}", node.kind, node.name, path),
                            None => println!("  {} {}", node.kind, node.name),
                        }
                    }
                }
            }
        }

        Commands::Dot { graphs, owns } => {
            let graph = load_graph(&graphs)?;
            print!("{}", graph.to_dot(owns || config.dot_include_owns));
        }

        Commands::Stats { graphs } => {
            let graph = load_graph(&graphs)?;
            println!("{}", graph.stats());
        }
    }
    Ok(())
}

/// Read and merge partial graphs in the order given.
fn load_graph(paths: &[PathBuf]) -> Result<UseGraph> {
    let partials = paths
        .iter()
        .map(|p| read_partial(p))
        .collect::<Result<Vec<_>>>()?;
    let graph = build_graph(&partials)?;
    info!(files = paths.len(), nodes = graph.len(), "graph merged");
    Ok(graph)
}

fn read_partial(path: &Path) -> Result<PartialGraph> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}
