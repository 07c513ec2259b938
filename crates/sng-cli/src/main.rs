//! SNG CLI - Command line interface for the graph viewer

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{completions, config as config_cmd, generate, graph, seed, serve};
use config::{config_file_path, Backend, Config};
use output::OutputFormat;
use sng_core::GraphQueries;
use sng_storage::{ConnectionPool, GraphDatabase, MemoryGraph, RedbGraph};

#[derive(Parser)]
#[command(name = "sng")]
#[command(author, version, about = "Social network graph viewer")]
pub struct Cli {
    /// Config file
    #[arg(long, env = "SNG_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Data directory
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Graph database backend
    #[arg(short, long, value_enum, global = true)]
    pub backend: Option<Backend>,

    /// Output format: json, compact
    #[arg(short, long, default_value = "json", global = true)]
    pub format: String,

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

    /// Config file settings with command line overrides applied
    pub fn settings(&self) -> anyhow::Result<Config> {
        let mut config = Config::load(&self.config_path())?;
        if let Some(data_dir) = &self.data_dir {
            config.data_dir = data_dir.clone();
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        Ok(config)
    }

    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from(self.format.as_str())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the graph viewer
    Serve(serve::ServeArgs),
    /// Clear the database and load a seed file
    Seed(seed::SeedArgs),
    /// Print the graph view as nodes and links
    Graph(graph::GraphArgs),
    /// Print all users
    Users,
    /// Print all relationships as name pairs
    Relationships,
    /// Generate a random seed file
    Generate(generate::GenerateArgs),
    /// Manage configuration
    Config(config_cmd::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Application context with the database connection pool
pub struct AppContext {
    pub config: Config,
    pub pool: ConnectionPool,
    pub queries: GraphQueries,
}

impl AppContext {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let database: Arc<dyn GraphDatabase> = match config.backend {
            Backend::Memory => Arc::new(MemoryGraph::new()),
            Backend::Redb => {
                std::fs::create_dir_all(&config.data_dir)?;
                let db_path = config.data_dir.join("sng.redb");
                tracing::debug!("Using database at: {:?}", db_path);
                Arc::new(RedbGraph::open(&db_path)?)
            }
        };

        Ok(Self {
            pool: ConnectionPool::new(database, config.pool_size),
            queries: config.queries(),
            config,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
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

    tracing::debug!("Starting sng CLI");

    match &cli.command {
        Commands::Config(args) => return config_cmd::run(args, &cli.config_path()),
        Commands::Completions(args) => return completions::run(args),
        Commands::Generate(args) => return generate::run(args, &cli.settings()?),
        _ => {}
    }

    // Initialize storage
    let ctx = AppContext::new(cli.settings()?)?;

    match &cli.command {
        Commands::Serve(args) => serve::run(args, &ctx).await?,
        Commands::Seed(args) => seed::run(args, &cli, &ctx).await?,
        Commands::Graph(args) => graph::run_graph(args, &cli, &ctx).await?,
        Commands::Users => graph::run_users(&cli, &ctx).await?,
        Commands::Relationships => graph::run_relationships(&cli, &ctx).await?,
        Commands::Config(_) | Commands::Completions(_) | Commands::Generate(_) => {}
    }

    Ok(())
}
