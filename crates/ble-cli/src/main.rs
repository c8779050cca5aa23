//! BLE CLI
//!
//! - `ble graph build`: cached Wikidata relations → `graph.json`
//! - `ble run`: basic levels for one configuration → `assignments.json`
//! - `ble sweep`: statistics over several subsumer thresholds

use anyhow::{Context, Result};
use ble_core::{
    overview_table, BleCollection, BleConfig, GraphDocument, PathOrder, SourceScope,
    WeightProperty,
};
use ble_ingest_wikidata::{CacheFiles, EventTypeCollection, IngestOptions, EVENT_ROOT};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

mod logging;
mod report;

#[derive(Parser)]
#[command(name = "ble")]
#[command(author, version, about = "Basic Level Event selection over event-type hierarchies")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` wins.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Event-type graph commands.
    Graph {
        #[command(subcommand)]
        command: GraphCommands,
    },

    /// Compute basic levels for one configuration.
    Run(RunArgs),

    /// Compute basic levels for several subsumer thresholds and compare them.
    Sweep(SweepArgs),
}

#[derive(Subcommand)]
enum GraphCommands {
    /// Build `graph.json` from cached Wikidata relation files.
    Build {
        /// Directory holding subclass_of.json, instance_of.json, ...
        #[arg(long)]
        cache: PathBuf,
        /// Output graph document
        #[arg(short, long)]
        out: PathBuf,
        /// Keep only incidents with this property (repeatable)
        #[arg(long = "needed-property")]
        needed_properties: Vec<String>,
        /// Prune leaves with fewer incidents, repeatedly
        #[arg(long, default_value_t = 0)]
        min_leaf_incident_freq: u64,
    },
}

/// Options shared by `run` and `sweep`.
#[derive(Args)]
struct SelectionArgs {
    /// Graph document produced by `ble graph build`
    #[arg(long)]
    graph: PathBuf,
    /// JSON configuration; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Root node id
    #[arg(long)]
    root: Option<String>,
    /// occurrence_frequency | num_features
    #[arg(long)]
    weight_property: Option<WeightProperty>,
    /// root_to_leaf | leaf_to_root
    #[arg(long)]
    path_order: Option<PathOrder>,
    /// leaves | all_descendants
    #[arg(long)]
    sources: Option<SourceScope>,
    /// Keep the root's own weight
    #[arg(long)]
    keep_root_weight: bool,
    /// Abort overlap resolution after this many passes
    #[arg(long)]
    max_iterations: Option<usize>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    selection: SelectionArgs,
    /// Minimum number of descendants a basic level must subsume
    #[arg(short, long)]
    threshold: Option<usize>,
    /// Only list basic levels with at least this cumulative weight
    #[arg(long, default_value_t = 0)]
    min_cumulative_weight: u64,
    /// Write the assignment document here
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct SweepArgs {
    #[command(flatten)]
    selection: SelectionArgs,
    /// Subsumer thresholds to compare
    #[arg(long, num_args = 1.., required = true)]
    thresholds: Vec<usize>,
    /// Write the overview rows here
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Graph { command } => match command {
            GraphCommands::Build {
                cache,
                out,
                needed_properties,
                min_leaf_incident_freq,
            } => cmd_graph_build(&cache, &out, needed_properties, min_leaf_incident_freq),
        },
        Commands::Run(args) => cmd_run(&args),
        Commands::Sweep(args) => cmd_sweep(&args),
    }
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_graph_build(
    cache: &Path,
    out: &Path,
    needed_properties: Vec<String>,
    min_leaf_incident_freq: u64,
) -> Result<()> {
    println!(
        "{} Wikidata relations from {}",
        "Loading".green().bold(),
        cache.display()
    );

    let options = IngestOptions {
        needed_properties: needed_properties.into_iter().collect(),
        min_leaf_incident_freq,
    };
    let collection = EventTypeCollection::load(&CacheFiles::in_dir(cache), options)
        .with_context(|| format!("failed to load relation cache {}", cache.display()))?;
    let doc = collection.to_graph_document();

    write_json(out, &doc)?;
    println!(
        "{} {} event types, {} subclass edges → {}",
        "Wrote".green().bold(),
        doc.nodes.len(),
        doc.edges.len(),
        out.display()
    );
    Ok(())
}

fn cmd_run(args: &RunArgs) -> Result<()> {
    let doc = read_graph(&args.selection.graph)?;
    let mut config = args.selection.config()?;
    if let Some(threshold) = args.threshold {
        config.subsumer_threshold = threshold;
    }
    tracing::debug!(?config, "resolved configuration");

    let collection = BleCollection::new(&doc, config)
        .with_context(|| format!("failed to compute basic levels for {}", args.selection.graph.display()))?;

    println!("\n{}", "SETTINGS".bold());
    println!("{}", collection.config());
    println!("\n{}", "STATS".bold());
    println!("{}", collection.stats());

    let resolution = collection.resolution();
    if !resolution.is_noop() {
        println!(
            "\n{} {} basic level(s) in {} pass(es), {} assignment change(s)",
            "Disqualified".yellow().bold(),
            resolution.disqualified.len(),
            resolution.iterations,
            resolution.changes.len()
        );
    }

    println!("\n{}", "BASIC LEVELS".bold());
    print!(
        "{}",
        report::basic_level_table(&collection.basic_level_table(args.min_cumulative_weight))
    );

    if let Some(out) = &args.out {
        write_json(out, &collection.to_output())?;
        println!("\n{} {}", "Wrote".green().bold(), out.display());
    }
    Ok(())
}

fn cmd_sweep(args: &SweepArgs) -> Result<()> {
    let doc = read_graph(&args.selection.graph)?;
    let config = args.selection.config()?;

    println!(
        "{} {} threshold(s) below {}",
        "Sweeping".green().bold(),
        args.thresholds.len(),
        config.root
    );
    let rows = overview_table(&doc, &config, &args.thresholds)
        .with_context(|| format!("sweep over {} failed", args.selection.graph.display()))?;

    print!("{}", report::overview_table(&rows));

    if let Some(out) = &args.out {
        write_json(out, &rows)?;
        println!("\n{} {}", "Wrote".green().bold(), out.display());
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

impl SelectionArgs {
    /// Configuration file (if any) overlaid with explicit flags.
    fn config(&self) -> Result<BleConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => BleConfig::new(EVENT_ROOT, WeightProperty::default(), 0),
        };

        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        if let Some(weight_property) = self.weight_property {
            config.weight_property = weight_property;
        }
        if let Some(path_order) = self.path_order {
            config.path_order = path_order;
        }
        if let Some(sources) = self.sources {
            config.sources = sources;
        }
        if self.keep_root_weight {
            config.root_zero = false;
        }
        if let Some(max_iterations) = self.max_iterations {
            config.max_iterations = Some(max_iterations);
        }
        Ok(config)
    }
}

fn read_graph(path: &Path) -> Result<GraphDocument> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid graph document {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}
