//! Ingest command handler.

use clap::Args;
use docent_core::{config::AppConfig, AppError, AppResult};
use std::path::PathBuf;

/// Load, split, embed and index a document
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Document to ingest (default: DOCENT_DOCUMENT_PATH or `documentPath` in config)
    pub path: Option<PathBuf>,

    /// Clear the index before writing
    #[arg(long)]
    pub reset: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let path = config.document_path.as_deref().ok_or_else(|| {
            AppError::Config(
                "No document given: pass a path or set DOCENT_DOCUMENT_PATH".to_string(),
            )
        })?;

        tracing::info!("Executing ingest command for {}", path.display());

        let stats = docent_knowledge::ingest(config, path, self.reset).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!(
                "Ingested {} ({} pages, {} passages) in {:.2}s",
                stats.source,
                stats.pages,
                stats.written,
                stats.duration_ms as f64 / 1000.0
            );
        }

        Ok(())
    }
}
