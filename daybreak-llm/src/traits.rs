use crate::prompt::{clean_post_text, MorningPrompt, DEFAULT_POST_MAX_TOKENS, DEFAULT_POST_TEMPERATURE};
use async_trait::async_trait;
use daybreak_common::{DaybreakError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
    /// Source links, present when the provider grounded the reply in a live
    /// search.
    pub citations: Option<Vec<String>>,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a response to the given prompt with optional system prompt
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse>;

    /// Check if the LLM service is available
    async fn health_check(&self) -> Result<bool>;

    /// Get the model name being used
    fn model_name(&self) -> &str;

    /// Compose a ready-to-publish morning post from the given prompt.
    ///
    /// Renders the system and user prompts, generates, and cleans the raw
    /// output (code fences, wrapping quotes). An empty post after cleanup is
    /// an error: there is nothing worth publishing.
    async fn compose_post(
        &self,
        prompt: &MorningPrompt,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<String> {
        let system = prompt.system_prompt();
        let user = prompt.user_prompt();

        let response = self
            .generate(
                &user,
                Some(&system),
                max_tokens.or(Some(DEFAULT_POST_MAX_TOKENS)),
                temperature.or(Some(DEFAULT_POST_TEMPERATURE)),
            )
            .await?;

        if let Some(citations) = &response.citations {
            tracing::debug!(count = citations.len(), "live search citations");
        }

        let text = clean_post_text(&response.text);
        if text.is_empty() {
            return Err(DaybreakError::Llm(format!(
                "model {} returned an empty post",
                self.model_name()
            )));
        }
        tracing::info!(
            model = %response.model.as_deref().unwrap_or(self.model_name()),
            chars = text.len(),
            "composed morning post"
        );
        Ok(text)
    }
}
