//! Revgraph CLI - Review feature extraction and graph loading
//!
//! Usage:
//!   revgraph ingest --limit <n>
//!   revgraph load [--clear]
//!   revgraph reload --limit <n>
//!   revgraph upload <path>
//!   revgraph count <label>
//!   revgraph threshold <minWords,minSentiment>
//!   revgraph flavors <flavor,flavor,...>

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use revgraph_cli::{exit_code, init_tracing, Command, Dispatcher, ReviewPipeline};
use revgraph_core::{AppConfig, GraphBackendKind, RevgraphError};
use revgraph_graph::GraphBackend;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "revgraph")]
#[command(about = "Extract review features and load them into a property graph")]
#[command(version)]
struct Cli {
    /// TOML configuration file (environment variables override it)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Graph backend: memory or surrealdb
    #[arg(long, global = true)]
    backend: Option<GraphBackendKind>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract input files into the batch file
    Ingest {
        /// Number of input files to process
        #[arg(long, short, default_value_t = 100)]
        limit: usize,
    },
    /// Load the batch file into the graph
    Load {
        /// Delete everything in the graph first
        #[arg(long)]
        clear: bool,
    },
    /// Ingest, clear the graph and load the new batch
    Reload {
        /// Number of input files to process
        #[arg(long, short, default_value_t = 100)]
        limit: usize,
    },
    /// Extract a single review file and add it to the graph
    Upload { path: PathBuf },
    /// Count nodes with a label (Review, Entity or Flavor)
    Count { label: String },
    /// Count reviews above a word count and sentiment, e.g. "20,0.15"
    Threshold { input: String },
    /// Reviews with any of the given flavors, e.g. "pepper,strawberry"
    Flavors { input: String },
}

fn load_config(cli: &Cli) -> Result<AppConfig, RevgraphError> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };

    if let Some(backend) = cli.backend {
        config.graph.backend = backend;
    }
    Ok(config)
}

async fn connect(config: &AppConfig) -> Result<Arc<dyn GraphBackend>, RevgraphError> {
    revgraph_graph::connect(&config.graph).await.map_err(|e| {
        error!(error = %e, "Could not connect to the graph");
        e
    })
}

async fn run(cli: Cli, config: AppConfig) -> Result<i32, RevgraphError> {
    let pipeline = ReviewPipeline::new(config);

    let command = match cli.command {
        Commands::Ingest { limit } => {
            let records = pipeline.ingest(limit)?;
            println!(
                "Extracted {} reviews to {}",
                records.len(),
                pipeline.config().paths.batch_path().display()
            );
            return Ok(0);
        }
        Commands::Load { clear } => {
            let backend = connect(pipeline.config()).await?;
            let summary = pipeline.load(backend, clear).await?;
            println!("Loaded {} reviews ({} nodes merged)", summary.reviews, summary.nodes());
            return Ok(0);
        }
        Commands::Reload { limit } => {
            pipeline.ingest(limit)?;
            let backend = connect(pipeline.config()).await?;
            let summary = pipeline.load(backend, true).await?;
            println!("Reloaded {} reviews ({} nodes merged)", summary.reviews, summary.nodes());
            return Ok(0);
        }
        Commands::Upload { path } => Command::Upload { path },
        Commands::Count { label } => Command::CountByLabel { input: label },
        Commands::Threshold { input } => Command::ThresholdFilter { input },
        Commands::Flavors { input } => Command::FlavorMembership { input },
    };

    let report = Dispatcher::new(pipeline).dispatch(command).await;
    println!("{report}");
    Ok(if report.is_ok() { 0 } else { 1 })
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(exit_code(&e));
        }
    };

    if let Err(e) = init_tracing(&config.logging) {
        eprintln!("Error: {e:#}");
        std::process::exit(revgraph_cli::exit::CONFIG);
    }

    info!(backend = ?config.graph.backend, "Starting revgraph");

    let code = match run(cli, config).await {
        Ok(code) => code,
        Err(e) => {
            let code = exit_code(&e);
            error!(error = %e, code, "Fatal error, exiting");
            eprintln!("Error: {e}");
            code
        }
    };

    std::process::exit(code);
}
