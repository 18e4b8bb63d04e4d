//! Pure retry state machine for a single completion call
//!
//! `Attempt(n) -> Attempt(n + 1)` happens only when the service rate limits
//! and attempts remain. Every other observation finishes the call.

use super::outcome::{excerpt, CompletionOutcome, BODY_EXCERPT_LIMIT, TRANSPORT_MESSAGE_LIMIT};
use rand::Rng;
use std::time::Duration;

/// Default total number of tries per call
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// What one attempt produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// HTTP 429
    RateLimited,
    /// 2xx with a parsed body; `None` when no text was present
    Completed(Option<String>),
    /// Any other HTTP status
    Rejected { status: u16, body: String },
    /// The request failed below HTTP, or the body could not be parsed
    TransportFailed(String),
}

/// Next action for the driver
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Retry { next: AttemptState, delay: Duration },
    Done(CompletionOutcome),
}

/// Zero-based attempt counter bounded by `max_attempts`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptState {
    attempt: u32,
    max_attempts: u32,
}

impl AttemptState {
    /// State for the first attempt. At least one attempt is always made.
    pub fn first(max_attempts: u32) -> Self {
        Self {
            attempt: 0,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn attempt(self) -> u32 {
        self.attempt
    }

    pub fn max_attempts(self) -> u32 {
        self.max_attempts
    }

    fn has_retries_left(self) -> bool {
        self.attempt + 1 < self.max_attempts
    }

    /// Pure transition. `jitter` must be in `[0, 1)`.
    pub fn step(self, observation: Observation, jitter: f64) -> Step {
        match observation {
            Observation::RateLimited if self.has_retries_left() => Step::Retry {
                next: Self {
                    attempt: self.attempt + 1,
                    ..self
                },
                delay: backoff(self.attempt, jitter),
            },
            Observation::RateLimited => Step::Done(CompletionOutcome::ExhaustedRetries {
                attempts: self.attempt + 1,
            }),
            Observation::Completed(Some(text)) => Step::Done(CompletionOutcome::Success { text }),
            Observation::Completed(None) => Step::Done(CompletionOutcome::NoContent),
            Observation::Rejected { status, body } => Step::Done(CompletionOutcome::RequestFailed {
                status,
                body_excerpt: excerpt(&body, BODY_EXCERPT_LIMIT),
            }),
            Observation::TransportFailed(message) => Step::Done(CompletionOutcome::TransportError {
                message: excerpt(&message, TRANSPORT_MESSAGE_LIMIT),
            }),
        }
    }
}

/// Delay before retrying after `attempt` was rate limited:
/// `2^attempt` seconds plus `jitter` seconds.
pub fn backoff(attempt: u32, jitter: f64) -> Duration {
    let base = Duration::from_secs(2u64.saturating_pow(attempt));
    base + Duration::from_secs_f64(jitter.clamp(0.0, 1.0))
}

/// Uniform sample from `[0, 1)`
pub fn sample_jitter() -> f64 {
    rand::thread_rng().gen_range(0.0..1.0)
}
