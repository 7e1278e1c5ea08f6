//! Trellis CLI - Command line interface for typed property-graph frames

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{adjacency, completions, vertex};
use config::{config_file_path, Config, ResolverKind};
use output::OutputFormat;
use trellis_core::{ElementId, FramedGraph, PolymorphicTypeResolver, TypeResolver, UntypedTypeResolver, VertexFrame};
use trellis_storage::RedbGraphStore;

#[derive(Parser)]
#[command(name = "trellis")]
#[command(author, version, about = "Typed adjacency traversal over a property graph")]
pub struct Cli {
    /// Data directory
    #[arg(short, long, global = true)]
    pub data_dir: Option<String>,

    /// Config file
    #[arg(long, global = true, env = "TRELLIS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format: table, json
    #[arg(short, long, global = true)]
    pub format: Option<String>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config_file_path)
    }

    /// Get the data directory path
    pub fn data_dir(&self, config: &Config) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| config.data_dir.clone())
    }

    pub fn output_format(&self, config: &Config) -> anyhow::Result<OutputFormat> {
        self.format
            .as_deref()
            .unwrap_or(&config.default_format)
            .parse()
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage vertices
    Vertex(vertex::VertexArgs),
    /// Query and rewire adjacencies
    Adj(adjacency::AdjacencyArgs),
    /// Manage CLI configuration
    Config(commands::config::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Application context with the framed graph
pub struct AppContext {
    pub store: Arc<RedbGraphStore>,
    pub graph: FramedGraph,
    pub format: OutputFormat,
}

impl AppContext {
    pub fn new(cli: &Cli, config: &Config) -> anyhow::Result<Self> {
        let data_dir = cli.data_dir(config);
        std::fs::create_dir_all(&data_dir)?;

        let db_path = data_dir.join("trellis.redb");
        tracing::debug!("Using database at: {:?}", db_path);

        let store = Arc::new(RedbGraphStore::open(&db_path)?);
        let resolver: Arc<dyn TypeResolver> = match config.resolver {
            ResolverKind::Polymorphic => Arc::new(PolymorphicTypeResolver::new(config.type_registry()?)),
            ResolverKind::Untyped => Arc::new(UntypedTypeResolver),
        };

        Ok(Self {
            graph: FramedGraph::new(store.clone(), resolver),
            store,
            format: cli.output_format(config)?,
        })
    }

    /// Look up a vertex frame by its id string
    pub fn vertex(&self, id: &str) -> anyhow::Result<VertexFrame> {
        let id: ElementId = id
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid vertex id '{}': {}", id, e))?;
        self.graph
            .vertex(&id)?
            .ok_or_else(|| anyhow::anyhow!("Vertex '{}' not found", id))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting trellis CLI");

    let config_path = cli.config_path();
    match &cli.command {
        Commands::Config(args) => return commands::config::run(args, &config_path),
        Commands::Completions(args) => return completions::run(args),
        _ => {}
    }

    let config = Config::load(&config_path)?;
    let ctx = AppContext::new(&cli, &config)?;

    match &cli.command {
        Commands::Vertex(args) => vertex::run(args, &ctx)?,
        Commands::Adj(args) => adjacency::run(args, &ctx)?,
        Commands::Config(_) | Commands::Completions(_) => {}
    }

    Ok(())
}
