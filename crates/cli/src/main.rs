//! Docent CLI
//!
//! Main entry point for the docent command-line tool.
//! Ingests one document and answers questions grounded in it.

mod commands;
mod input;

use clap::{Parser, Subcommand};
use commands::{AskCommand, IngestCommand, ResetCommand, StatsCommand};
use docent_core::logging::{self, LogFormat};
use docent_core::{config::AppConfig, AppResult};
use std::path::PathBuf;

/// Docent - answers questions from one document, and only from it
#[derive(Parser, Debug)]
#[command(name = "docent")]
#[command(about = "Document-grounded question answering", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "DOCENT_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file (default: .docent/config.yaml)
    #[arg(short, long, global = true, env = "DOCENT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level or filter directive (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Chat model identifier
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Embedding model identifier
    #[arg(long, global = true)]
    embedding_model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load, split, embed and index a document
    Ingest(IngestCommand),

    /// Ask questions about the ingested document
    Ask(AskCommand),

    /// Show index statistics
    Stats(StatsCommand),

    /// Remove every passage from the index
    Reset(ResetCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let document_path = match &cli.command {
        Commands::Ingest(cmd) => cmd.path.clone(),
        _ => None,
    };

    // Defaults, config file and environment, then CLI overrides
    let config = AppConfig::load(cli.workspace, cli.config)?.with_overrides(
        document_path,
        cli.model,
        cli.embedding_model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    let log_format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    logging::init_logging(config.log_level.as_deref(), config.no_color, log_format)?;

    tracing::info!("Docent CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!(
        "Embedding: {} ({}), generation: {} ({})",
        config.embedding.provider,
        config.embedding.model,
        config.generation.provider,
        config.generation.model
    );

    config.validate()?;
    config.ensure_docent_dir()?;

    let command_name = match &cli.command {
        Commands::Ingest(_) => "ingest",
        Commands::Ask(_) => "ask",
        Commands::Stats(_) => "stats",
        Commands::Reset(_) => "reset",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
        Commands::Reset(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
