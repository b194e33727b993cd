//! Reset command handler.

use clap::Args;
use docent_core::{config::AppConfig, AppResult};

/// Remove every passage from the index
#[derive(Args, Debug)]
pub struct ResetCommand {}

impl ResetCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing reset command");

        let removed = docent_knowledge::reset_index(config).await?;
        println!("Removed {} passages", removed);

        Ok(())
    }
}
