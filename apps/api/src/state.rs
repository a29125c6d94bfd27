use std::sync::Arc;

use crate::inference::retriever::ContextSource;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// Context retriever behind a trait object so tests can substitute fakes.
    pub retriever: Arc<dyn ContextSource>,
}
