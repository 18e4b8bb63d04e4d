//! Gemini completion client with rate-limit backoff

use super::gemini::{generate_content_url, GenerateContentRequest, GenerateContentResponse};
use super::outcome::{excerpt, TRANSPORT_MESSAGE_LIMIT};
use super::retry::{sample_jitter, AttemptState, Observation, Step};
use super::transport::{HttpReply, Transport};
use super::{CompletionOutcome, CompletionService};
use crate::config::BotConfig;
use crate::history::Turn;
use async_trait::async_trait;

const RATE_LIMITED: u16 = 429;

pub struct CompletionClient<T> {
    transport: T,
    credential: Option<String>,
    url: String,
    model_id: String,
    system_instruction: String,
    max_attempts: u32,
}

impl<T: Transport> CompletionClient<T> {
    pub fn new(transport: T, config: &BotConfig) -> Self {
        Self {
            transport,
            credential: config.api_key.clone().filter(|key| !key.is_empty()),
            url: generate_content_url(&config.endpoint, &config.model),
            model_id: config.model.clone(),
            system_instruction: config.system_prompt.clone(),
            max_attempts: config.max_attempts,
        }
    }

    async fn run(&self, user_text: &str, history: &[Turn]) -> CompletionOutcome {
        let Some(credential) = self.credential.as_deref() else {
            tracing::warn!(
                model = %self.model_id,
                "No API key configured, skipping completion request"
            );
            return CompletionOutcome::MissingCredential;
        };

        let request = GenerateContentRequest::new(history, user_text, &self.system_instruction);
        let body = match serde_json::to_value(&request) {
            Ok(body) => body,
            Err(e) => {
                return CompletionOutcome::TransportError {
                    message: excerpt(&format!("Malformed request: {e}"), TRANSPORT_MESSAGE_LIMIT),
                };
            }
        };
        let url = format!("{}?key={}", self.url, credential);

        let mut state = AttemptState::first(self.max_attempts);
        loop {
            let observation = match self.transport.post_json(&url, &body).await {
                Ok(reply) => observe(reply),
                Err(e) => {
                    tracing::error!(
                        model = %self.model_id,
                        attempt = state.attempt(),
                        kind = ?e.kind,
                        error = %e,
                        "Completion transport failed"
                    );
                    Observation::TransportFailed(e.message)
                }
            };

            match state.step(observation, sample_jitter()) {
                Step::Retry { next, delay } => {
                    tracing::warn!(
                        model = %self.model_id,
                        attempt = state.attempt(),
                        max_attempts = state.max_attempts(),
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Rate limited, backing off before retry"
                    );
                    tokio::time::sleep(delay).await;
                    state = next;
                }
                Step::Done(outcome) => return outcome,
            }
        }
    }
}

/// Classify one HTTP reply for the retry state machine
fn observe(reply: HttpReply) -> Observation {
    match reply.status {
        RATE_LIMITED => Observation::RateLimited,
        200..=299 => match GenerateContentResponse::parse(&reply.body) {
            Ok(response) => {
                let text = response.first_text().map(str::to_string);
                if text.is_none() {
                    tracing::warn!(
                        finish_reason = response.finish_reason().unwrap_or("unknown"),
                        "Completion response contained no text"
                    );
                }
                Observation::Completed(text)
            }
            Err(e) => Observation::TransportFailed(format!("Failed to parse response: {e}")),
        },
        status => {
            tracing::error!(status, "Completion request rejected");
            Observation::Rejected {
                status,
                body: reply.body,
            }
        }
    }
}

#[async_trait]
impl<T: Transport> CompletionService for CompletionClient<T> {
    async fn complete(&self, user_text: &str, history: &[Turn]) -> CompletionOutcome {
        self.run(user_text, history).await
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
