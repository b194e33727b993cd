//! Generation-service integration for Docent.
//!
//! A single trait, [`LlmClient`], hides the chat-completion service. Two
//! HTTP implementations are provided:
//! - **OpenAI**: `/chat/completions` (default)
//! - **Ollama**: local `/api/generate`
//!
//! # Example
//! ```no_run
//! use docent_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::with_base_url("http://localhost:11434", Duration::from_secs(60))?;
//! let request = LlmRequest::new("Hello, world!", "llama3.2").with_temperature(0.0);
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiClient};
pub use types::ProviderType;
