//! Inkwell CLI — the main entry point.
//!
//! Commands:
//! - `serve`     — Start the HTTP API server
//! - `migrate`   — Create the database schema
//! - `config`    — Print the effective configuration
//! - `story add` — Add a story to the catalog

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "inkwell",
    about = "Inkwell — learning platform API server",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (defaults to ~/.inkwell/config.toml)
    #[arg(short, long, global = true, env = "INKWELL_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Create the database schema without starting the server
    Migrate,

    /// Print the effective configuration as TOML
    Config,

    /// Manage the story catalog
    Story {
        #[command(subcommand)]
        action: StoryAction,
    },
}

#[derive(Subcommand)]
enum StoryAction {
    /// Add a story
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        author: String,
        #[arg(long)]
        content: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { port } => commands::serve::run(config, port).await?,
        Commands::Migrate => commands::migrate::run(config).await?,
        Commands::Config => commands::config_cmd::show(&config)?,
        Commands::Story { action } => match action {
            StoryAction::Add {
                title,
                author,
                content,
            } => commands::story::add(config, title, author, content).await?,
        },
    }

    Ok(())
}
