//! The chat API seam and the OpenRouter-compatible client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::advisory::Advisory;

/// Errors that can occur while talking to the LLM API.
///
/// Every variant routes the request to the rule-based fallback; none of them
/// is surfaced to the caller directly.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The API answered with a non-success status.
    #[error("LLM API rejected request: {status}")]
    Upstream {
        /// HTTP status code from the API.
        status: u16,
    },

    /// The API answered 2xx but the response carried no message content.
    #[error("LLM API returned no content")]
    EmptyResponse,

    /// The call itself failed (connect, TLS, timeout).
    #[error("LLM API unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Chat-completion seam.
///
/// The production implementation is [`OpenRouterClient`]; tests substitute a
/// scripted fake to exercise the fallback paths.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Send a system + user message pair and return the assistant's text.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the call fails or yields no content.
    async fn chat(&self, system: &str, user: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenRouter-compatible chat-completion API.
#[derive(Clone)]
pub struct OpenRouterClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for OpenRouterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenRouterClient {
    /// Referer/title headers identifying this application to the API.
    const REFERER: &str = "https://mekongdoctor.lovable.app";
    const TITLE: &str = "Mekong Doctor";

    /// Create a client for the given API endpoint and model.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl ChatApi for OpenRouterClient {
    async fn chat(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.7,
            max_tokens: 1000,
        };

        debug!(model = %self.model, "calling LLM API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", Self::REFERER)
            .header("X-Title", Self::TITLE)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Upstream {
                status: status.as_u16(),
            });
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

/// Parse an [`Advisory`] out of model output.
///
/// Models frequently wrap JSON in a markdown code fence; the first fenced
/// block is preferred, otherwise the whole content is parsed as JSON.
/// Returns `None` when no valid advisory can be extracted.
#[must_use]
pub fn extract_advisory(content: &str) -> Option<Advisory> {
    let candidate = extract_fenced_block(content).unwrap_or_else(|| content.trim());
    serde_json::from_str(candidate).ok()
}

/// Find the body of the first ``` or ```json fenced block.
fn extract_fenced_block(content: &str) -> Option<&str> {
    let start = content.find("```")?;
    let after_fence = &content[start + 3..];
    // Skip an optional language tag on the fence line.
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}
