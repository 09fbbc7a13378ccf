mod cli;
mod config;
mod dataset;
mod embedding;
mod error;
mod index;
mod query;
mod server;
mod tags;
mod text;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "culina", version, about = "Semantic recipe search index builder and embed server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the vector store: fetch, normalize, dedupe, embed, write
    Build,
    /// Start the query embedding server
    Serve,
    /// Search the built store from the terminal
    Search {
        /// Query text
        query: String,
        /// Number of results
        #[arg(short, long, default_value_t = 5)]
        k: usize,
    },
    /// Manage the embedding model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
}

#[derive(Subcommand)]
enum ModelAction {
    /// Download the embedding model variants to ~/.culina/models/
    Download,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = config::CulinaConfig::load()?;

    // Initialize tracing with the configured log level. Log to stderr so
    // stdout stays clean for pipeline output.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Build => {
            cli::build::build(&config).await?;
        }
        Command::Serve => {
            server::serve(config).await?;
        }
        Command::Search { query, k } => {
            cli::search::search(&config, &query, k).await?;
        }
        Command::Model { action } => match action {
            ModelAction::Download => {
                cli::model_download(&config.embedding).await?;
            }
        },
    }

    Ok(())
}
