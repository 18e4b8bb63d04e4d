//! Completion service
//!
//! Turns an utterance plus conversation history into a Gemini request,
//! retries on rate limiting, and classifies the result.

mod client;
mod error;
mod gemini;
mod outcome;
mod retry;
mod transport;

#[cfg(test)]
mod proptests;
#[cfg(test)]
pub mod testing;

pub use client::CompletionClient;
pub use error::TransportError;
pub use gemini::DEFAULT_ENDPOINT;
pub use outcome::CompletionOutcome;
pub use retry::DEFAULT_MAX_ATTEMPTS;
pub use transport::ReqwestTransport;

use crate::history::Turn;
use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for completion backends
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Complete `user_text` given prior turns. Never fails: every failure is
    /// a [`CompletionOutcome`] variant.
    async fn complete(&self, user_text: &str, history: &[Turn]) -> CompletionOutcome;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Logging wrapper for completion services
pub struct LoggingService {
    inner: Arc<dyn CompletionService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn CompletionService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl CompletionService for LoggingService {
    async fn complete(&self, user_text: &str, history: &[Turn]) -> CompletionOutcome {
        let start = std::time::Instant::now();
        let outcome = self.inner.complete(user_text, history).await;
        let duration = start.elapsed();

        if outcome.is_failure() {
            tracing::error!(
                model = %self.model_id,
                duration_ms = %duration.as_millis(),
                history_turns = history.len(),
                outcome = outcome.kind(),
                "Completion request failed"
            );
        } else {
            tracing::info!(
                model = %self.model_id,
                duration_ms = %duration.as_millis(),
                history_turns = history.len(),
                outcome = outcome.kind(),
                "Completion request completed"
            );
        }

        outcome
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
