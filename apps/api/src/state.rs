use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::llm_client::CompletionService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Completion backend. `LlmClient` in production, a stub in tests.
    pub llm: Arc<dyn CompletionService>,
    pub config: Config,
    /// Cancelled on shutdown. Handlers hand a child token to each generation.
    pub shutdown: CancellationToken,
}
