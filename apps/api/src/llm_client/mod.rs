/// LLM Client: the single point of entry for chat-completion calls.
///
/// No other module talks to the completion endpoint directly; the pipeline
/// only sees the `TextGenerator` trait so it can run against stubs.
///
/// A `None` result is the fallback signal: callers substitute template text.
/// There are no retries. A failed call is terminal for that one artifact.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::LlmSettings;

pub mod prompts;

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no API credential configured")]
    MissingCredential,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// Result of one successful completion call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiGeneration {
    pub content: String,
    pub tokens_used: u32,
    /// Estimated USD cost from the configured rate table.
    pub cost: f64,
}

/// Static per-1K-token rate pair used for cost estimates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenPricing {
    pub input_per_1k: f64,
    pub output_per_1k: f64,
}

impl TokenPricing {
    pub fn cost(&self, prompt_tokens: u32, completion_tokens: u32) -> f64 {
        (prompt_tokens as f64 / 1000.0) * self.input_per_1k
            + (completion_tokens as f64 / 1000.0) * self.output_per_1k
    }
}

/// Text generation capability consumed by the pack pipeline.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns `None` when the call could not produce text (missing key,
    /// transport failure, non-2xx response). `model = None` uses the
    /// client's default model.
    async fn generate(&self, prompt: &str, system: &str, model: Option<&str>)
        -> Option<AiGeneration>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl ChatResponse {
    /// Text of the first completion, empty when the model returned nothing.
    pub fn text(&self) -> &str {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .unwrap_or_default()
    }
}

/// Chat-completion client with a bearer credential and a fixed rate table.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    default_model: String,
    temperature: f32,
    max_tokens: u32,
    pricing: TokenPricing,
}

impl LlmClient {
    pub fn new(settings: &LlmSettings) -> Self {
        Self {
            client: Client::new(),
            api_key: settings.api_key.clone(),
            endpoint: format!(
                "{}{}",
                settings.base_url.trim_end_matches('/'),
                COMPLETIONS_PATH
            ),
            default_model: settings.default_model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            pricing: TokenPricing {
                input_per_1k: settings.input_cost_per_1k,
                output_per_1k: settings.output_cost_per_1k,
            },
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Makes a single raw call, returning the decoded response.
    pub async fn call(
        &self,
        prompt: &str,
        system: &str,
        model: &str,
    ) -> Result<ChatResponse, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingCredential)?;

        let request_body = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let chat: ChatResponse = response.json().await?;
        debug!(
            "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
            chat.usage.prompt_tokens, chat.usage.completion_tokens
        );
        Ok(chat)
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(
        &self,
        prompt: &str,
        system: &str,
        model: Option<&str>,
    ) -> Option<AiGeneration> {
        let model = model.unwrap_or(&self.default_model);
        match self.call(prompt, system, model).await {
            Ok(chat) => Some(AiGeneration {
                content: strip_code_fences(chat.text()).to_string(),
                tokens_used: chat.usage.total_tokens,
                cost: self
                    .pricing
                    .cost(chat.usage.prompt_tokens, chat.usage.completion_tokens),
            }),
            Err(LlmError::MissingCredential) => {
                warn!("OPENAI_API_KEY not set, falling back to templates");
                None
            }
            Err(LlmError::Api { status, message }) => {
                error!("LLM API error: status={status} body={message}");
                None
            }
            Err(e) => {
                error!("LLM call failed: {e}");
                None
            }
        }
    }
}

/// Strips ```html / ```markdown / ``` fences the model sometimes wraps output in.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (e.g. "html") up to the first newline.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .map(str::trim)
        .unwrap_or_else(|| body.trim())
}
