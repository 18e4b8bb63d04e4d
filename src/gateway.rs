//! Boundary with the chat platform
//!
//! A gateway turns platform events into [`InboundMessage`]s and hands them to
//! the [`Dispatcher`]; replies go back out through a [`ReplySink`].

pub mod console;

use crate::bot::Bot;
use crate::history::ConversationKey;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Reply sent when handling a message fails unexpectedly
pub const RUNTIME_ERROR_REPLY: &str =
    "Droid malfunction: something went wrong while handling that message.";

#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub conversation_key: ConversationKey,
    pub author_is_bot: bool,
    pub raw_text: String,
}

impl InboundMessage {
    pub fn new(
        conversation_key: impl Into<String>,
        author_is_bot: bool,
        raw_text: impl Into<String>,
    ) -> Self {
        Self {
            conversation_key: ConversationKey::new(conversation_key),
            author_is_bot,
            raw_text: raw_text.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[allow(dead_code)] // Raised by platform gateways
    #[error("Channel unavailable: {0}")]
    Unavailable(String),
}

/// Delivers replies back to the platform
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send(&self, key: &ConversationKey, text: &str) -> Result<(), DeliveryError>;
}

/// Runs each inbound message on its own task so slow completions never block
/// other channels, and nothing that goes wrong reaches the gateway loop.
pub struct Dispatcher {
    bot: Arc<Bot>,
    sink: Arc<dyn ReplySink>,
}

impl Dispatcher {
    pub fn new(bot: Arc<Bot>, sink: Arc<dyn ReplySink>) -> Self {
        Self { bot, sink }
    }

    pub fn dispatch(&self, message: InboundMessage) -> JoinHandle<()> {
        let bot = Arc::clone(&self.bot);
        let sink = Arc::clone(&self.sink);

        tokio::spawn(async move {
            let key = message.conversation_key.clone();

            // Inner task so a panic surfaces as a JoinError instead of
            // tearing down this one
            let handled = tokio::spawn(async move { bot.handle(&message).await }).await;
            let reply = match handled {
                Ok(Some(reply)) => reply,
                Ok(None) => return,
                Err(e) => {
                    tracing::error!(conversation = %key, error = %e, "Message handler crashed");
                    RUNTIME_ERROR_REPLY.to_string()
                }
            };

            if let Err(e) = sink.send(&key, &reply).await {
                tracing::error!(conversation = %key, error = %e, "Failed to deliver reply");
                if let Err(e) = sink.send(&key, RUNTIME_ERROR_REPLY).await {
                    tracing::error!(
                        conversation = %key,
                        error = %e,
                        "Failed to deliver error notice"
                    );
                }
            }
        })
    }
}
