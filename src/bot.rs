//! Message handling for the droid bot
//!
//! Decides whether a message addresses the bot, runs the completion with the
//! channel's history, records the exchange, and formats the reply.

use crate::config::BotConfig;
use crate::gateway::InboundMessage;
use crate::history::{ConversationKey, HistoryStore, Turn};
use crate::llm::CompletionService;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Longest reply the chat platform accepts
pub const MAX_REPLY_CHARS: usize = 2000;
/// Length kept when a reply is cut down
pub const TRUNCATED_REPLY_CHARS: usize = 1980;
pub const TRUNCATION_SUFFIX: &str = " yada yada";

/// What to do with an inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Not addressed to the bot, or sent by a bot
    Ignore,
    /// Trigger with nothing after it
    Usage,
    Ask(&'a str),
}

/// Classify `raw_text` against the trigger token
pub fn parse_command<'a>(trigger: &str, author_is_bot: bool, raw_text: &'a str) -> Command<'a> {
    if author_is_bot {
        return Command::Ignore;
    }
    match raw_text.strip_prefix(trigger) {
        None => Command::Ignore,
        Some(rest) => match rest.trim() {
            "" => Command::Usage,
            utterance => Command::Ask(utterance),
        },
    }
}

/// Fixed reply for a bare trigger
pub fn usage_reply(trigger: &str) -> String {
    format!(
        "Usage: {trigger} <message>. \
         Ask me anything, I remember the last few exchanges in this channel."
    )
}

/// Cut replies over the platform limit down to size
pub fn format_reply(text: &str) -> String {
    if text.chars().count() <= MAX_REPLY_CHARS {
        return text.to_string();
    }
    let mut reply: String = text.chars().take(TRUNCATED_REPLY_CHARS).collect();
    reply.push_str(TRUNCATION_SUFFIX);
    reply
}

/// Per-channel async mutexes so same-channel messages run in arrival order
#[derive(Default)]
pub struct ChannelLocks {
    locks: Mutex<HashMap<ConversationKey, Arc<Mutex<()>>>>,
}

impl ChannelLocks {
    pub async fn acquire(&self, key: &ConversationKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(key.clone()).or_default())
        };
        lock.lock_owned().await
    }
}

pub struct Bot {
    trigger: String,
    history: HistoryStore,
    completions: Arc<dyn CompletionService>,
    channel_locks: Option<ChannelLocks>,
}

impl Bot {
    pub fn new(config: &BotConfig, completions: Arc<dyn CompletionService>) -> Self {
        Self {
            trigger: config.trigger.clone(),
            history: HistoryStore::new(config.max_history_turns),
            completions,
            channel_locks: config.serialize_channels.then(ChannelLocks::default),
        }
    }

    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    /// Reply to send for `message`, or `None` when the bot stays silent.
    ///
    /// Without channel serialization, two messages on the same channel can
    /// both read the history before either records its exchange; the later
    /// one then does not see the earlier pair.
    pub async fn handle(&self, message: &InboundMessage) -> Option<String> {
        let command = parse_command(&self.trigger, message.author_is_bot, &message.raw_text);
        let utterance = match command {
            Command::Ignore => return None,
            Command::Usage => return Some(usage_reply(&self.trigger)),
            Command::Ask(utterance) => utterance,
        };
        let key = &message.conversation_key;

        let _guard = match &self.channel_locks {
            Some(locks) => Some(locks.acquire(key).await),
            None => None,
        };

        let history = self.history.get(key).await;
        tracing::info!(
            conversation = %key,
            utterance_chars = utterance.chars().count(),
            history_turns = history.len(),
            "Handling message"
        );

        let outcome = self.completions.complete(utterance, &history).await;
        let reply = outcome.reply_text();

        self.history
            .append(key, Turn::user(utterance), Turn::model(reply.clone()))
            .await;

        Some(format_reply(&reply))
    }
}
