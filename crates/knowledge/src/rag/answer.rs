//! Prompt-constrained answer generation.

use docent_core::config::GenerationSettings;
use docent_core::AppResult;
use docent_llm::{LlmClient, LlmRequest};
use docent_prompt::{build_prompt, PromptDefinition};
use std::sync::Arc;

/// Renders the grounded prompt and asks the generation service once.
pub struct Generator {
    client: Arc<dyn LlmClient>,
    prompt: PromptDefinition,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl Generator {
    pub fn new(
        client: Arc<dyn LlmClient>,
        prompt: PromptDefinition,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            client,
            prompt,
            model: model.into(),
            temperature,
            max_tokens: None,
        }
    }

    /// Cap the length of generated answers.
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn from_settings(
        client: Arc<dyn LlmClient>,
        prompt: PromptDefinition,
        settings: &GenerationSettings,
    ) -> Self {
        Self::new(client, prompt, settings.model.clone(), settings.temperature)
            .with_max_tokens(settings.max_tokens)
    }

    /// Answer `question` from `context` alone.
    ///
    /// A blank question returns `Ok(None)` without calling the service.
    /// Service failures are returned unchanged.
    pub async fn answer(&self, question: &str, context: &str) -> AppResult<Option<String>> {
        if question.trim().is_empty() {
            return Ok(None);
        }

        let built = build_prompt(&self.prompt, context, question)?;
        let mut request =
            LlmRequest::new(built.user, self.model.clone()).with_temperature(self.temperature);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        tracing::debug!(
            "Generating with {} (model {}, prompt {})",
            self.client.provider_name(),
            self.model,
            self.prompt.id
        );

        let response = self.client.complete(&request).await?;
        Ok(Some(response.content.trim().to_string()))
    }
}
