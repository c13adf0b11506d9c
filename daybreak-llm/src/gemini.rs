use crate::traits::{LlmClient, LlmResponse};
use async_trait::async_trait;
use daybreak_common::{DaybreakError, Result};
use daybreak_http::{Auth, HttpClient, HttpError, RequestOpts};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/";
const GENERATE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    safety_settings: Option<Vec<GeminiSafetySetting>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct GeminiSafetySetting {
    category: String,
    threshold: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiResponseContent,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiUsageMetadata {
    #[serde(rename = "totalTokenCount")]
    total_token_count: Option<u32>,
}

/// Google Gemini API client.
pub struct GeminiClient {
    client: HttpClient,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a new client. `endpoint` overrides the public API base
    /// (gateways, tests); `None` uses the real one.
    pub fn new(api_key: String, model: String, endpoint: Option<&str>) -> Result<Self> {
        let client = HttpClient::new(endpoint.unwrap_or(GEMINI_API_BASE))
            .map_err(|e| DaybreakError::Llm(format!("HttpClient init failed: {e}")))?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    fn create_safety_settings() -> Vec<GeminiSafetySetting> {
        // Casual humor trips MEDIUM too often; only block the serious stuff.
        [
            "HARM_CATEGORY_HARASSMENT",
            "HARM_CATEGORY_HATE_SPEECH",
            "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            "HARM_CATEGORY_DANGEROUS_CONTENT",
        ]
        .into_iter()
        .map(|category| GeminiSafetySetting {
            category: category.to_string(),
            threshold: "BLOCK_ONLY_HIGH".to_string(),
        })
        .collect()
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let generation_config = if max_tokens.is_some() || temperature.is_some() {
            Some(GeminiGenerationConfig {
                temperature,
                max_output_tokens: max_tokens,
            })
        } else {
            None
        };

        let system_instruction = system_prompt.map(|sys_prompt| GeminiSystemInstruction {
            parts: vec![GeminiPart {
                text: sys_prompt.to_string(),
            }],
        });

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config,
            safety_settings: Some(Self::create_safety_settings()),
            system_instruction,
        };

        let path = format!("models/{}:generateContent", self.model);
        let resp: GeminiResponse = self
            .client
            .post_json_opts(
                &path,
                &request,
                RequestOpts {
                    auth: Some(Auth::Query {
                        name: "key",
                        value: self.api_key.as_str().into(),
                    }),
                    timeout: Some(GENERATE_TIMEOUT),
                    ..Default::default()
                },
            )
            .await
            .map_err(http_to_llm)?;

        let Some(candidate) = resp.candidates.first() else {
            return Err(DaybreakError::Llm(
                "no candidates returned from Gemini".to_string(),
            ));
        };

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(DaybreakError::Llm(
                "content blocked by Gemini safety filters".to_string(),
            ));
        }

        let Some(part) = candidate.content.parts.first() else {
            return Err(DaybreakError::Llm(
                "no content parts in Gemini response".to_string(),
            ));
        };

        let tokens_used = resp.usage_metadata.and_then(|u| u.total_token_count);

        Ok(LlmResponse {
            text: part.text.clone(),
            model: Some(self.model.clone()),
            tokens_used,
            citations: None,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        // Simple health check by trying to generate a minimal response
        let test_prompt = "Respond with just 'OK'";

        match self.generate(test_prompt, None, Some(5), Some(0.1)).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Gemini health check failed: {}", e);
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
