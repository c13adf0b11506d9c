//! Common types and utilities shared across Daybreak crates.
//!
//! This crate defines the shared error type and the observability helpers
//! used throughout the Daybreak workspace. It is intentionally lightweight
//! so that every other crate can depend on it without pulling in heavy
//! transitive costs.
//!
//! # Overview
//!
//! - [`DaybreakError`] and [`Result`]: shared error handling
//! - [`LlmConfig`]: provider-agnostic LLM configuration
//! - [`observability`]: centralised tracing/logging initialisation

use serde::{Deserialize, Serialize};

pub mod observability;

/// Configuration for an LLM provider.
///
/// This is the single source of truth for provider settings: the
/// `daybreak-config` schema embeds it per variant and the `daybreak-llm`
/// factory consumes it. `model` and `endpoint` default per provider inside
/// the factory, so config files only name what they override.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum LlmConfig {
    Groq {
        api_key: String,
        #[serde(default)]
        model: Option<String>,
        #[serde(default)]
        endpoint: Option<String>,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<u32>,
    },
    Xai {
        api_key: String,
        #[serde(default)]
        model: Option<String>,
        #[serde(default)]
        endpoint: Option<String>,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<u32>,
        /// Ask the provider to ground the reply in a live search over X.
        #[serde(default)]
        live_search: bool,
        #[serde(default)]
        max_search_results: Option<u32>,
    },
    Gemini {
        api_key: String,
        #[serde(default)]
        model: Option<String>,
        #[serde(default)]
        endpoint: Option<String>,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<u32>,
    },
}

impl LlmConfig {
    pub fn provider_name(&self) -> &'static str {
        match self {
            LlmConfig::Groq { .. } => "groq",
            LlmConfig::Xai { .. } => "xai",
            LlmConfig::Gemini { .. } => "gemini",
        }
    }

    /// Sampling temperature override, if the config names one.
    pub fn temperature(&self) -> Option<f32> {
        match self {
            LlmConfig::Groq { temperature, .. }
            | LlmConfig::Xai { temperature, .. }
            | LlmConfig::Gemini { temperature, .. } => *temperature,
        }
    }

    /// Completion length override, if the config names one.
    pub fn max_tokens(&self) -> Option<u32> {
        match self {
            LlmConfig::Groq { max_tokens, .. }
            | LlmConfig::Xai { max_tokens, .. }
            | LlmConfig::Gemini { max_tokens, .. } => *max_tokens,
        }
    }
}

/// Error types used across the Daybreak pipeline.
#[derive(thiserror::Error, Debug)]
pub enum DaybreakError {
    /// Text generation failed or returned something unusable.
    #[error("LLM error: {0}")]
    Llm(String),

    /// The publishing/scheduling API reported an error.
    #[error("Publisher error: {0}")]
    Publisher(String),

    /// A contextual signal source (market data, news) reported an error.
    #[error("Signal error: {0}")]
    Signal(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local filesystem access failed (image directory, config file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenient alias for results that use [`DaybreakError`].
pub type Result<T> = std::result::Result<T, DaybreakError>;
