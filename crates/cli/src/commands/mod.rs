//! Command handlers for the docent CLI.

pub mod ask;
pub mod ingest;
pub mod reset;
pub mod stats;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use ingest::IngestCommand;
pub use reset::ResetCommand;
pub use stats::StatsCommand;
