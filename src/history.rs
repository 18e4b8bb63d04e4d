//! Per-channel conversation history
//!
//! Keeps a bounded, oldest-first window of turns for each conversation key.
//! Entries live for the lifetime of the process; keys are never evicted.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use tokio::sync::RwLock;

#[cfg(test)]
mod proptests;

/// Identifier grouping messages into one context (one per channel)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationKey(String);

impl ConversationKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[allow(dead_code)] // API completeness
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Wire name used by the completion API
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One message unit in a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    role: Role,
    text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Bounded conversation windows keyed by [`ConversationKey`]
///
/// Each window holds at most `2 * max_turn_pairs` turns. Appending past that
/// drops whole pairs from the front, so the retained turns stay in order.
pub struct HistoryStore {
    max_turn_pairs: usize,
    conversations: RwLock<HashMap<ConversationKey, VecDeque<Turn>>>,
}

impl HistoryStore {
    pub fn new(max_turn_pairs: usize) -> Self {
        Self {
            max_turn_pairs,
            conversations: RwLock::new(HashMap::new()),
        }
    }

    /// Maximum number of turns kept per conversation
    pub fn capacity(&self) -> usize {
        self.max_turn_pairs.saturating_mul(2)
    }

    /// Snapshot of the turns for `key`, oldest first. Unknown keys are empty.
    pub async fn get(&self, key: &ConversationKey) -> Vec<Turn> {
        self.conversations
            .read()
            .await
            .get(key)
            .map(|turns| turns.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Record one exchange and trim the window to capacity.
    pub async fn append(&self, key: &ConversationKey, user: Turn, model: Turn) {
        let capacity = self.capacity();
        let mut conversations = self.conversations.write().await;
        let turns = conversations.entry(key.clone()).or_default();
        turns.push_back(user);
        turns.push_back(model);

        // Length and capacity are both even, so this only ever drops pairs
        let excess = turns.len().saturating_sub(capacity);
        if excess > 0 {
            turns.drain(..excess);
            tracing::debug!(
                conversation = %key,
                dropped_turns = excess,
                retained_turns = turns.len(),
                "Trimmed conversation history"
            );
        }
    }

    /// Number of conversations seen so far
    #[cfg(test)]
    pub async fn conversation_count(&self) -> usize {
        self.conversations.read().await.len()
    }
}
