//! xAI Grok client, optionally grounded in a live search over X posts.
//!
//! The wire format is OpenAI-compatible chat completions plus an xAI-specific
//! `search_parameters` block. With live search on, the reply can reference
//! what is actually being posted this morning, and the response carries the
//! citation links.

use crate::traits::{LlmClient, LlmResponse};
use async_trait::async_trait;
use daybreak_common::{DaybreakError, Result};
use daybreak_http::{Auth, HttpClient, HttpError, RequestOpts};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const XAI_API_BASE: &str = "https://api.x.ai/v1/";
const GENERATE_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_SEARCH_RESULTS: u32 = 10;

pub struct XaiClient {
    client: HttpClient,
    api_key: String,
    model: String,
    live_search: bool,
    max_search_results: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_parameters: Option<SearchParameters>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct SearchParameters {
    mode: &'static str,
    sources: Vec<SearchSource>,
    max_search_results: u32,
    return_citations: bool,
}

#[derive(Serialize)]
struct SearchSource {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    model: Option<String>,
    usage: Option<ChatUsage>,
    #[serde(default)]
    citations: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: Option<u32>,
}

impl XaiClient {
    /// Create a new client. `endpoint` overrides the public API base
    /// (gateways, tests); `None` uses the real one.
    pub fn new(api_key: String, model: String, endpoint: Option<&str>) -> Result<Self> {
        let client = HttpClient::new(endpoint.unwrap_or(XAI_API_BASE))
            .map_err(|e| DaybreakError::Llm(format!("HttpClient init failed: {e}")))?;
        Ok(Self {
            client,
            api_key,
            model,
            live_search: false,
            max_search_results: DEFAULT_SEARCH_RESULTS,
        })
    }

    /// Ground replies in a live search over X posts.
    pub fn with_live_search(mut self, enabled: bool, max_results: Option<u32>) -> Self {
        self.live_search = enabled;
        if let Some(n) = max_results {
            self.max_search_results = n;
        }
        self
    }
}

#[async_trait]
impl LlmClient for XaiClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        let search_parameters = self.live_search.then(|| SearchParameters {
            mode: "on",
            sources: vec![SearchSource { kind: "x" }],
            max_search_results: self.max_search_results,
            return_citations: true,
        });

        let req = ChatRequest {
            model: &self.model,
            messages,
            max_tokens,
            temperature,
            search_parameters,
        };

        let resp: ChatResponse = self
            .client
            .post_json_opts(
                "chat/completions",
                &req,
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.api_key)),
                    timeout: Some(GENERATE_TIMEOUT),
                    ..Default::default()
                },
            )
            .await
            .map_err(http_to_llm)?;

        if self.live_search {
            tracing::debug!(citations = resp.citations.len(), "live search grounding");
        }

        let text = resp
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        Ok(LlmResponse {
            text,
            model: resp.model,
            tokens_used: resp.usage.and_then(|u| u.total_tokens),
            citations: self.live_search.then_some(resp.citations),
        })
    }

    async fn health_check(&self) -> Result<bool> {
        // Simple health check by trying to generate a minimal response
        let test_prompt = "Respond with just 'OK'";

        match self.generate(test_prompt, None, Some(5), Some(0.1)).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("xAI health check failed: {}", e);
                Ok(false)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn http_to_llm(e: HttpError) -> DaybreakError {
    DaybreakError::Llm(format!("{e}"))
}
