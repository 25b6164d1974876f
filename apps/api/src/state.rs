use std::sync::Arc;

use crate::llm_client::CompletionModel;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// `LlmClient` in production. Shared without locking: it holds no per-call state.
    pub llm: Arc<dyn CompletionModel>,
}
