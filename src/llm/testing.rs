//! Mock implementations for testing
//!
//! These mocks enable testing the client and the bot without real I/O.

use super::transport::{HttpReply, Transport};
use super::{CompletionOutcome, CompletionService, TransportError};
use crate::history::Turn;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

// ============================================================================
// Mock Transport
// ============================================================================

/// One request seen by [`MockTransport`]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub url: String,
    pub body: Value,
    pub at: Instant,
}

/// Transport that returns queued replies and records every request
pub struct MockTransport {
    replies: Mutex<VecDeque<Result<HttpReply, TransportError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue an HTTP reply
    pub fn queue_status(&self, status: u16, body: &str) {
        self.replies.lock().unwrap().push_back(Ok(HttpReply {
            status,
            body: body.to_string(),
        }));
    }

    /// Queue a transport failure
    pub fn queue_error(&self, error: TransportError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpReply, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            url: url.to_string(),
            body: body.clone(),
            at: Instant::now(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::other("No mock reply queued")))
    }
}

// ============================================================================
// Mock Completion Service
// ============================================================================

/// Completion service that returns queued outcomes
pub struct MockCompletionService {
    outcomes: Mutex<VecDeque<CompletionOutcome>>,
    model_id: String,
    delay: Option<Duration>,
    /// Record of (utterance, history) for each call
    calls: Mutex<Vec<(String, Vec<Turn>)>>,
}

impl MockCompletionService {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering, to let concurrent calls interleave
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn queue_outcome(&self, outcome: CompletionOutcome) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn queue_text(&self, text: &str) {
        self.queue_outcome(CompletionOutcome::Success {
            text: text.to_string(),
        });
    }

    pub fn recorded_calls(&self) -> Vec<(String, Vec<Turn>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionService for MockCompletionService {
    async fn complete(&self, user_text: &str, history: &[Turn]) -> CompletionOutcome {
        self.calls
            .lock()
            .unwrap()
            .push((user_text.to_string(), history.to_vec()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(CompletionOutcome::NoContent)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Panicking Completion Service
// ============================================================================

/// Completion service that panics, for exercising the dispatcher catch-all
pub struct PanickingCompletionService;

#[async_trait]
impl CompletionService for PanickingCompletionService {
    async fn complete(&self, _user_text: &str, _history: &[Turn]) -> CompletionOutcome {
        panic!("completion backend exploded");
    }

    fn model_id(&self) -> &str {
        "panicking"
    }
}
