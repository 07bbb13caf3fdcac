//! In-memory completion backend for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ChatMessage, CompletionOptions, CompletionService, LlmError};

#[derive(Debug, Clone)]
pub enum Scripted {
    Text(String),
    ApiError(u16),
}

/// Replays scripted responses in order; the last one repeats once the script runs out.
pub struct ScriptedCompletion {
    script: Mutex<VecDeque<Scripted>>,
    last: Mutex<Option<Scripted>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedCompletion {
    pub fn sequence(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn always(text: impl Into<String>) -> Self {
        Self::sequence(vec![Scripted::Text(text.into())])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Message lists received, one entry per call.
    pub fn seen(&self) -> Vec<Vec<ChatMessage>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _options: CompletionOptions,
    ) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(messages.to_vec());

        let next = {
            let mut script = self.script.lock().unwrap();
            let mut last = self.last.lock().unwrap();
            if let Some(item) = script.pop_front() {
                *last = Some(item);
            }
            last.clone().unwrap_or(Scripted::ApiError(500))
        };

        match next {
            Scripted::Text(text) => Ok(text),
            Scripted::ApiError(status) => Err(LlmError::Api {
                status,
                message: "scripted failure".to_string(),
            }),
        }
    }
}
