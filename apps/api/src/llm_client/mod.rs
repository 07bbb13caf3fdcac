/// LLM Client: the single point of entry for all completion calls.
///
/// ARCHITECTURAL RULE: nothing outside this module talks to the Anthropic API.
/// Generation code depends on the [`CompletionService`] trait only, so tests
/// can swap in an in-memory stub.
///
/// Model: claude-sonnet-4-5 (hardcoded, do not make configurable to prevent drift)
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;
#[cfg(test)]
pub mod stub;

use prompts::JSON_ONLY_SYSTEM;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all completion calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("No user or assistant messages to send")]
    EmptyPrompt,
}

// ────────────────────────────────────────────────────────────────────────────
// Service trait
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    /// Ask for a bare JSON document (no prose, no fences).
    pub json_mode: bool,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.6,
            json_mode: true,
        }
    }
}

/// A black-box text completion backend.
///
/// Carried in `AppState` as `Arc<dyn CompletionService>`. Implementations
/// return the raw model text; parsing and validation belong to the caller.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: CompletionOptions,
    ) -> Result<String, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Anthropic wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: &'static str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
}

#[derive(Debug, PartialEq, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Maps chat messages onto the Messages API shape.
///
/// System messages are hoisted into the `system` field (with the JSON-only
/// fragment first in JSON mode). Consecutive messages with the same role are
/// merged, since the API requires alternating turns.
fn build_request(
    messages: &[ChatMessage],
    options: CompletionOptions,
) -> Result<AnthropicRequest, LlmError> {
    let mut system_parts: Vec<&str> = Vec::new();
    if options.json_mode {
        system_parts.push(JSON_ONLY_SYSTEM);
    }

    let mut turns: Vec<AnthropicMessage> = Vec::new();
    for message in messages {
        let role = match message.role {
            Role::System => {
                system_parts.push(&message.content);
                continue;
            }
            Role::User => "user",
            Role::Assistant => "assistant",
        };

        if let Some(last) = turns.last_mut().filter(|last| last.role == role) {
            last.content.push_str("\n\n");
            last.content.push_str(&message.content);
            continue;
        }

        turns.push(AnthropicMessage {
            role,
            content: message.content.clone(),
        });
    }

    if turns.is_empty() {
        return Err(LlmError::EmptyPrompt);
    }

    Ok(AnthropicRequest {
        model: MODEL,
        max_tokens: MAX_TOKENS,
        temperature: options.temperature,
        system: (!system_parts.is_empty()).then(|| system_parts.join("\n\n")),
        messages: turns,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The production completion backend.
/// Wraps the Anthropic Messages API with transport-level retry.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
        })
    }

    /// Sends one request, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    async fn call(&self, request_body: &AnthropicRequest) -> Result<LlmResponse, LlmError> {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: LlmResponse = response.json().await?;

            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                llm_response.usage.input_tokens, llm_response.usage.output_tokens
            );

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl CompletionService for LlmClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: CompletionOptions,
    ) -> Result<String, LlmError> {
        let request_body = build_request(messages, options)?;
        let response = self.call(&request_body).await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?;

        if options.json_mode {
            Ok(strip_json_fences(text).to_string())
        } else {
            Ok(text.trim().to_string())
        }
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_build_request_hoists_system_and_merges_turns() {
        let messages = [
            ChatMessage::system("Be warm."),
            ChatMessage::user("first"),
            ChatMessage::user("second"),
            ChatMessage::assistant("{}"),
            ChatMessage::user("Please return only valid JSON."),
        ];
        let options = CompletionOptions { temperature: 0.6, json_mode: true };
        let request = build_request(&messages, options).unwrap();

        let system = request.system.unwrap();
        assert!(system.starts_with(JSON_ONLY_SYSTEM));
        assert!(system.ends_with("Be warm."));
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[0].content, "first\n\nsecond");
        assert_eq!(request.messages[1].role, "assistant");
    }

    #[test]
    fn test_build_request_plain_mode_has_no_system() {
        let options = CompletionOptions { temperature: 0.2, json_mode: false };
        let request = build_request(&[ChatMessage::user("hi")], options).unwrap();
        assert!(request.system.is_none());
        assert_eq!(request.temperature, 0.2);
    }

    #[test]
    fn test_build_request_rejects_system_only() {
        let result = build_request(&[ChatMessage::system("x")], CompletionOptions::default());
        assert!(matches!(result, Err(LlmError::EmptyPrompt)));
    }
}
