use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Failure surfaced by a model backend. Components never propagate these;
/// each converts them into its own documented fallback or error result.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The request never completed: connect failure, timeout, DNS.
    #[error("{0}")]
    Transport(String),
    /// The endpoint answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// The endpoint answered 200 but the payload was unusable.
    #[error("{0}")]
    Malformed(String),
}

// ── Requests ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// One content part: prompt text or inline base64 data, never both.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
}

/// Content parts plus optional generation settings for one round-trip.
#[derive(Debug, Clone, Default)]
pub struct ModelRequest {
    pub parts: Vec<Part>,
    pub config: Option<GenerationConfig>,
}

impl ModelRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            parts: vec![Part {
                text: Some(prompt.into()),
                ..Part::default()
            }],
            config: None,
        }
    }

    pub fn with_inline_data(
        mut self,
        mime_type: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        self.parts.push(Part {
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
            ..Part::default()
        });
        self
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = Some(config);
        self
    }
}

// ── Backend seam ──────────────────────────────────────────────────────────

/// A generative model that turns one request into reply text. Components
/// hold this behind an `Arc` so tests can substitute scripted backends.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, request: ModelRequest) -> Result<String, ModelError>;
}

// ── Gemini wire types ─────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Deserialize)]
struct ReplyPart {
    #[serde(default)]
    text: Option<String>,
}

// ── Gemini client ─────────────────────────────────────────────────────────

/// Calls the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: build_http(DEFAULT_TIMEOUT_SECS),
            base_url: GEMINI_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.http = build_http(secs);
        self
    }
}

fn build_http(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_default()
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, request: ModelRequest) -> Result<String, ModelError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: request.parts,
            }],
            generation_config: request.config,
        };

        debug!(model = %self.model, "calling generateContent");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "generateContent returned an error status");
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Malformed(e.to_string()))?;

        let Some(candidate) = parsed.candidates.into_iter().next() else {
            return Err(ModelError::Malformed("reply carried no candidates".to_string()));
        };
        let text: String = candidate
            .content
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        debug!(reply_len = text.len(), "generateContent reply received");
        Ok(text)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_request_serializes_without_nulls() {
        let request = ModelRequest::text("hello");
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: request.parts,
            }],
            generation_config: request.config,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            json!({"contents": [{"parts": [{"text": "hello"}]}]})
        );
    }

    #[test]
    fn inline_data_and_config_serialize_snake_case() {
        let request = ModelRequest::text("check this")
            .with_inline_data("image/jpeg", "QUJD")
            .with_config(GenerationConfig {
                temperature: Some(0.3),
                max_output_tokens: Some(1024),
                response_mime_type: None,
            });
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: request.parts,
            }],
            generation_config: request.config,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value["contents"][0]["parts"][1]["inline_data"],
            json!({"mime_type": "image/jpeg", "data": "QUJD"})
        );
        assert_eq!(value["generation_config"]["max_output_tokens"], json!(1024));
        assert!(value["generation_config"].get("response_mime_type").is_none());
    }

    #[test]
    fn reply_text_concatenates_parts() {
        let raw = json!({
            "candidates": [{
                "content": {
                    "parts": [{"text": "one "}, {"text": "two"}, {"inline_data": {}}]
                }
            }]
        });
        let parsed: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        let text: String = parsed.candidates[0]
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.clone())
            .collect();
        assert_eq!(text, "one two");
    }
}
