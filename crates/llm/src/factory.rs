//! Generation client factory.
//!
//! Builds an [`LlmClient`] from the `generation` configuration section. The
//! API key is passed in by the caller; this module never reads the
//! environment.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiClient};
use crate::types::ProviderType;
use docent_core::config::GenerationSettings;
use docent_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create a generation client for the configured provider.
///
/// # Errors
/// - `AppError::Config` when the provider is unknown or its API key is missing
/// - `AppError::GenerationService` when the HTTP client cannot be built
pub fn create_client(
    settings: &GenerationSettings,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider = ProviderType::parse(&settings.provider).ok_or_else(|| {
        AppError::Config(format!("Unknown chat provider: {}", settings.provider))
    })?;

    let endpoint = settings
        .endpoint
        .as_deref()
        .unwrap_or_else(|| provider.default_endpoint());
    let timeout = Duration::from_secs(settings.timeout_secs);

    tracing::debug!(
        "Creating {} generation client at {}",
        provider.as_str(),
        endpoint
    );

    match provider {
        ProviderType::Ollama => Ok(Arc::new(OllamaClient::with_base_url(endpoint, timeout)?)),
        ProviderType::OpenAI => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config(format!(
                    "OpenAI provider requires API key (set {})",
                    settings.api_key_env.as_deref().unwrap_or("OPENAI_API_KEY")
                ))
            })?;
            Ok(Arc::new(OpenAiClient::new(endpoint, api_key, timeout)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(provider: &str) -> GenerationSettings {
        GenerationSettings {
            provider: provider.to_string(),
            ..GenerationSettings::default()
        }
    }

    #[test]
    fn test_create_ollama_client() {
        let client = create_client(&settings("ollama"), None).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_openai_client() {
        let client = create_client(&settings("openai"), Some("sk-test")).unwrap();
        assert_eq!(client.provider_name(), "openai");
    }

    #[test]
    fn test_openai_requires_api_key() {
        match create_client(&settings("openai"), None) {
            Err(AppError::Config(msg)) => assert!(msg.contains("requires API key")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("Expected error for OpenAI without API key"),
        }
    }

    #[test]
    fn test_unknown_provider() {
        assert!(matches!(
            create_client(&settings("unknown"), None),
            Err(AppError::Config(_))
        ));
    }
}
