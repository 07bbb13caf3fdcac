//! Generation Orchestrator: one structured completion call with a bounded retry.
//!
//! Flow: Building → Calling → Parsing → Accepted, or
//!       Parsing → Retrying → Calling → Parsing → Accepted | Failed.
//!
//! Only a parse/schema failure is retried, and only once. Service errors
//! surface immediately; transport-level retry is the client's business. After
//! acceptance the task's guardrails repair the payload's text fields.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::generation::guardrails::{self, GuardrailConfig};
use crate::generation::prompts::{DEFAULT_LENGTH_GUIDANCE, EMPTY_SECTION, GENERATION_CONTEXT_TEMPLATE};
use crate::llm_client::prompts::JSON_RETRY_REMINDER;
use crate::llm_client::{strip_json_fences, ChatMessage, CompletionOptions, CompletionService, LlmError};
use crate::scenes::recommender::{format_scene_count_for_prompt, SceneCountRecommendation};
use crate::text::density::TargetLengthRange;

/// Parse failures tolerated before giving up. Do not raise.
pub const MAX_PARSE_RETRIES: u32 = 1;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Completion service unavailable: {0}")]
    ServiceUnavailable(#[from] LlmError),

    #[error("Malformed model output after {attempts} attempts: {reason}")]
    MalformedOutput { attempts: u32, reason: String },

    #[error("Generation cancelled by caller")]
    Cancelled,
}

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// How long the output should be, rendered into the prompt.
#[derive(Debug, Clone, Copy)]
pub enum LengthGuidance {
    Range(TargetLengthRange),
    Scenes(SceneCountRecommendation),
    Default,
}

impl LengthGuidance {
    pub fn render(&self) -> String {
        match self {
            LengthGuidance::Range(range) if !range.is_degenerate() => format!(
                "Write between {} and {} words ({}-{} characters). \
                 Match the richness of what they shared ({} words); cover every idea they mentioned.",
                range.min_words, range.max_words, range.min_chars, range.max_chars, range.input_words
            ),
            LengthGuidance::Scenes(rec) => format_scene_count_for_prompt(rec),
            LengthGuidance::Range(_) | LengthGuidance::Default => DEFAULT_LENGTH_GUIDANCE.to_string(),
        }
    }
}

/// Everything needed for one completion call. Built per request, never stored.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub category: String,
    pub instruction_text: String,
    pub flattened_context: String,
    pub length_guidance: LengthGuidance,
}

impl GenerationRequest {
    /// System prompt, then the context block, then the task instructions.
    fn messages(&self, system_prompt: &str) -> Vec<ChatMessage> {
        let context = self.flattened_context.trim();
        let context_block = GENERATION_CONTEXT_TEMPLATE
            .replace("{category}", &self.category)
            .replace(
                "{flattened_context}",
                if context.is_empty() { EMPTY_SECTION } else { context },
            )
            .replace("{length_guidance}", &self.length_guidance.render());

        vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(context_block),
            ChatMessage::user(self.instruction_text.clone()),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult<T> {
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub payload: T,
    pub guardrails_applied: Vec<String>,
    pub attempts: u32,
}

/// A payload type the orchestrator can request, validate and repair.
pub trait StructuredOutput: DeserializeOwned + Serialize + Send {
    /// Short task name used in logs.
    const TASK: &'static str;
    const SYSTEM_PROMPT: &'static str;
    const TEMPERATURE: f32 = 0.6;

    fn guardrails() -> GuardrailConfig;

    /// Schema checks beyond what deserialization enforces.
    fn validate(&self) -> Result<(), String>;

    /// Text fields the guardrails run over.
    fn guarded_fields(&mut self) -> Vec<&mut String>;
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Building,
    Calling,
    Parsing,
    Retrying,
    Accepted,
    Failed,
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestration
// ────────────────────────────────────────────────────────────────────────────

/// Runs one generation. The cancellation token is raced against each call;
/// once it fires no guardrails run and `Cancelled` is returned.
pub async fn run<T: StructuredOutput>(
    llm: &dyn CompletionService,
    request: &GenerationRequest,
    cancel: &CancellationToken,
) -> Result<GenerationResult<T>, GenerationError> {
    let request_id = Uuid::new_v4();
    debug!(%request_id, task = T::TASK, phase = ?Phase::Building, category = %request.category);

    let mut messages = request.messages(T::SYSTEM_PROMPT);
    let options = CompletionOptions {
        temperature: T::TEMPERATURE,
        json_mode: true,
    };

    let mut attempts: u32 = 0;
    let mut payload: T = loop {
        attempts += 1;
        debug!(%request_id, task = T::TASK, phase = ?Phase::Calling, attempt = attempts);

        let raw = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(%request_id, task = T::TASK, "Caller abandoned generation");
                return Err(GenerationError::Cancelled);
            }
            result = llm.complete(&messages, options) => match result {
                Ok(raw) => raw,
                Err(e) => {
                    error!(%request_id, task = T::TASK, phase = ?Phase::Failed, "Completion call failed: {e}");
                    return Err(GenerationError::ServiceUnavailable(e));
                }
            },
        };

        debug!(%request_id, task = T::TASK, phase = ?Phase::Parsing, bytes = raw.len());
        match parse_payload::<T>(&raw) {
            Ok(payload) => break payload,
            Err(reason) if attempts <= MAX_PARSE_RETRIES => {
                warn!(
                    %request_id,
                    task = T::TASK,
                    phase = ?Phase::Retrying,
                    "Attempt {attempts} returned unusable output ({reason}), retrying"
                );
                if !raw.trim().is_empty() {
                    messages.push(ChatMessage::assistant(raw));
                }
                messages.push(ChatMessage::user(JSON_RETRY_REMINDER));
            }
            Err(reason) => {
                error!(%request_id, task = T::TASK, phase = ?Phase::Failed, "Giving up after {attempts} attempts: {reason}");
                return Err(GenerationError::MalformedOutput { attempts, reason });
            }
        }
    };

    if cancel.is_cancelled() {
        warn!(%request_id, task = T::TASK, "Cancelled after response, skipping guardrails");
        return Err(GenerationError::Cancelled);
    }

    let guardrails_applied = apply_guardrails(&mut payload, request_id);

    info!(
        %request_id,
        task = T::TASK,
        phase = ?Phase::Accepted,
        attempts,
        guardrails = ?guardrails_applied,
        "Generation accepted"
    );

    Ok(GenerationResult {
        request_id,
        generated_at: Utc::now(),
        payload,
        guardrails_applied,
        attempts,
    })
}

fn parse_payload<T: StructuredOutput>(raw: &str) -> Result<T, String> {
    let payload: T = serde_json::from_str(strip_json_fences(raw)).map_err(|e| e.to_string())?;
    payload.validate()?;
    Ok(payload)
}

/// Applies the task's guardrails to every guarded field. Returns the distinct
/// guardrail names that changed something, in first-applied order.
fn apply_guardrails<T: StructuredOutput>(payload: &mut T, request_id: Uuid) -> Vec<String> {
    let config = T::guardrails();
    if config.is_noop() {
        return Vec::new();
    }

    let mut applied: Vec<String> = Vec::new();
    for field in payload.guarded_fields() {
        let (repaired, names) = guardrails::apply(field, &config);
        *field = repaired;

        for name in names {
            if !applied.iter().any(|a| a == name) {
                applied.push(name.to_string());
            }
        }

        let violations = guardrails::check(field, &config);
        if !violations.is_empty() {
            error!(%request_id, task = T::TASK, ?violations, "Guardrail post-condition failed");
        }
        debug_assert!(violations.is_empty(), "guardrails left violations: {violations:?}");
    }

    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde::Deserialize;

    use crate::generation::guardrails::{MOTIF_SENTENCE, NEGATION_SCRUB};
    use crate::llm_client::stub::{Scripted, ScriptedCompletion};
    use crate::text::density::{compute_target_length_range, LengthRatios};

    #[derive(Debug, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    impl StructuredOutput for Note {
        const TASK: &'static str = "note";
        const SYSTEM_PROMPT: &'static str = "Write a note.";

        fn guardrails() -> GuardrailConfig {
            GuardrailConfig::narrative()
        }

        fn validate(&self) -> Result<(), String> {
            if self.text.trim().is_empty() {
                return Err("text is empty".to_string());
            }
            Ok(())
        }

        fn guarded_fields(&mut self) -> Vec<&mut String> {
            vec![&mut self.text]
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            category: "health".to_string(),
            instruction_text: "Return {\"text\": ...}".to_string(),
            flattened_context: "- exercise_frequency: 3x weekly".to_string(),
            length_guidance: LengthGuidance::Default,
        }
    }

    #[tokio::test]
    async fn test_persistent_invalid_json_calls_twice_then_fails() {
        let stub = ScriptedCompletion::always("this is not json");
        let result = run::<Note>(&stub, &request(), &CancellationToken::new()).await;

        assert!(matches!(
            result,
            Err(GenerationError::MalformedOutput { attempts: 2, .. })
        ));
        assert_eq!(stub.calls(), 2);
    }

    #[tokio::test]
    async fn test_schema_violation_counts_as_parse_failure() {
        let stub = ScriptedCompletion::always(r#"{"text": "   "}"#);
        let result = run::<Note>(&stub, &request(), &CancellationToken::new()).await;
        assert!(matches!(result, Err(GenerationError::MalformedOutput { .. })));
        assert_eq!(stub.calls(), 2);
    }

    #[tokio::test]
    async fn test_retry_appends_reminder_and_succeeds() {
        let stub = ScriptedCompletion::sequence(vec![
            Scripted::Text("Sure! Here you go".to_string()),
            Scripted::Text(r#"```json
{"text": "Every morning I walk by the river."}
```"#
                .to_string()),
        ]);
        let result = run::<Note>(&stub, &request(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.attempts, 2);
        assert_eq!(stub.calls(), 2);
        let second_call = &stub.seen()[1];
        assert_eq!(second_call.last().unwrap().content, JSON_RETRY_REMINDER);
        assert!(result.payload.text.starts_with("Every morning I walk by the river."));
    }

    #[tokio::test]
    async fn test_service_error_is_not_retried() {
        let stub = ScriptedCompletion::sequence(vec![Scripted::ApiError(503)]);
        let result = run::<Note>(&stub, &request(), &CancellationToken::new()).await;

        assert!(matches!(result, Err(GenerationError::ServiceUnavailable(_))));
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn test_guardrails_repair_accepted_payload() {
        let stub = ScriptedCompletion::always(r#"{"text": "I do not feel rushed"}"#);
        let result = run::<Note>(&stub, &request(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.attempts, 1);
        assert_eq!(result.guardrails_applied[0], NEGATION_SCRUB);
        assert!(result.payload.text.contains(MOTIF_SENTENCE));
        assert!(!guardrails::contains_negation(&result.payload.text));
    }

    #[tokio::test]
    async fn test_messages_carry_context_and_guidance() {
        let stub = ScriptedCompletion::always(r#"{"text": "Each day I stretch."}"#);
        let range = compute_target_length_range("I like long walks", LengthRatios::default());
        let request = GenerationRequest {
            length_guidance: LengthGuidance::Range(range),
            ..request()
        };
        run::<Note>(&stub, &request, &CancellationToken::new()).await.unwrap();

        let first = &stub.seen()[0];
        assert_eq!(first[0].content, Note::SYSTEM_PROMPT);
        assert!(first[1].content.contains("CATEGORY: health"));
        assert!(first[1].content.contains("- exercise_frequency: 3x weekly"));
        assert!(first[1].content.contains("Write between 3 and 5 words"));
    }

    #[test]
    fn test_degenerate_range_uses_default_guidance() {
        let range = compute_target_length_range("", LengthRatios::default());
        assert_eq!(LengthGuidance::Range(range).render(), DEFAULT_LENGTH_GUIDANCE);
        assert_eq!(LengthGuidance::Default.render(), DEFAULT_LENGTH_GUIDANCE);
    }

    struct Hanging;

    #[async_trait]
    impl CompletionService for Hanging {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _options: CompletionOptions,
        ) -> Result<String, LlmError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_cancellation_while_waiting() {
        let token = CancellationToken::new();
        let child = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            child.cancel();
        });

        let result = run::<Note>(&Hanging, &request(), &token).await;
        assert!(matches!(result, Err(GenerationError::Cancelled)));
    }

    /// Cancels the caller's token while answering, as if the caller left mid-flight.
    struct CancelsOnReply(CancellationToken);

    #[async_trait]
    impl CompletionService for CancelsOnReply {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _options: CompletionOptions,
        ) -> Result<String, LlmError> {
            self.0.cancel();
            Ok(r#"{"text": "I do not rest"}"#.to_string())
        }
    }

    #[tokio::test]
    async fn test_cancelled_after_response_skips_guardrails() {
        let token = CancellationToken::new();
        let llm = CancelsOnReply(token.clone());
        let result = run::<Note>(&llm, &request(), &token).await;
        assert!(matches!(result, Err(GenerationError::Cancelled)));
    }
}
