//! Provider-agnostic LLM integration for Daybreak.
//!
//! This crate exposes a common [`traits::LlmClient`] interface and concrete
//! provider implementations for Groq, xAI, and Gemini, plus the morning-post
//! prompt builder in [`prompt`]. A convenience function initializes a client
//! from a [`daybreak_common::LlmConfig`].
//!
//! # Examples
//! ```no_run
//! use daybreak_common::LlmConfig;
//! use daybreak_llm::build_llm_client;
//!
//! # fn main() -> daybreak_common::Result<()> {
//! let cfg = LlmConfig::Groq {
//!     api_key: "gsk-demo".into(),
//!     model: None,
//!     endpoint: None,
//!     temperature: None,
//!     max_tokens: None,
//! };
//! let client = build_llm_client(&cfg)?;
//! assert!(!client.model_name().is_empty());
//! # Ok(())
//! # }
//! ```
pub mod gemini;
pub mod groq;
pub mod prompt;
pub mod traits;
pub mod xai;

use daybreak_common::LlmConfig;
use gemini::GeminiClient;
use groq::GroqClient;
use std::sync::Arc;
use traits::LlmClient;
use xai::XaiClient;

/// Default model per provider when the variant config names none.
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_XAI_MODEL: &str = "grok-3";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Build a ready-to-use client from provider configuration.
///
/// Missing `model`/`endpoint` fields fall back to the provider defaults.
pub fn build_llm_client(
    config: &LlmConfig,
) -> daybreak_common::Result<Arc<dyn LlmClient + Send + Sync + 'static>> {
    match config {
        LlmConfig::Groq {
            api_key,
            model,
            endpoint,
            ..
        } => {
            let client = GroqClient::new(
                api_key.clone(),
                model.clone().unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string()),
                endpoint.as_deref(),
            )?;
            Ok(Arc::new(client))
        }
        LlmConfig::Xai {
            api_key,
            model,
            endpoint,
            live_search,
            max_search_results,
            ..
        } => {
            let client = XaiClient::new(
                api_key.clone(),
                model.clone().unwrap_or_else(|| DEFAULT_XAI_MODEL.to_string()),
                endpoint.as_deref(),
            )?
            .with_live_search(*live_search, *max_search_results);
            Ok(Arc::new(client))
        }
        LlmConfig::Gemini {
            api_key,
            model,
            endpoint,
            ..
        } => {
            let client = GeminiClient::new(
                api_key.clone(),
                model
                    .clone()
                    .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                endpoint.as_deref(),
            )?;
            Ok(Arc::new(client))
        }
    }
}
