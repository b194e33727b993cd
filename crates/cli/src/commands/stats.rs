//! Stats command handler.

use clap::Args;
use docent_core::{config::AppConfig, AppResult};

/// Show index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let stats = docent_knowledge::index_stats(config).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!("Index:      {} ({})", stats.location, stats.backend);
            println!("Collection: {}", stats.collection);
            println!("Passages:   {}", stats.rows);
            println!("Scores:     {}", stats.score_kind.as_str());
            println!(
                "Embeddings: {} ({})",
                stats.embedding_provider, stats.embedding_model
            );
        }

        Ok(())
    }
}
