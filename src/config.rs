//! Bot configuration, loaded once from the environment at startup

use crate::llm::{DEFAULT_ENDPOINT, DEFAULT_MAX_ATTEMPTS};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_TRIGGER: &str = "!droid";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_MAX_HISTORY_TURNS: usize = 5;
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Droid, a slightly sarcastic but helpful \
service droid hanging out in a group chat. Keep answers short and conversational, \
use plain text, and stay in character. If you do not know something, say so.";

#[derive(Clone)]
pub struct BotConfig {
    /// Prefix that addresses the bot, e.g. `!droid`
    pub trigger: String,
    /// Gemini API key; `None` disables completion requests
    pub api_key: Option<String>,
    pub model: String,
    /// API base URL, without the `/models/...` suffix
    pub endpoint: String,
    pub system_prompt: String,
    /// Turn pairs kept per channel
    pub max_history_turns: usize,
    /// Total tries per completion call
    pub max_attempts: u32,
    /// Process messages for the same channel one at a time
    pub serialize_channels: bool,
    pub http_timeout: Duration,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            trigger: DEFAULT_TRIGGER.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_history_turns: DEFAULT_MAX_HISTORY_TURNS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            serialize_channels: false,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

// Hand-written so the API key never ends up in logs
impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("trigger", &self.trigger)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("max_history_turns", &self.max_history_turns)
            .field("max_attempts", &self.max_attempts)
            .field("serialize_channels", &self.serialize_channels)
            .field("http_timeout", &self.http_timeout)
            .finish_non_exhaustive()
    }
}

impl BotConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            trigger: get("DROID_TRIGGER")
                .map(|t| t.trim().to_string())
                .unwrap_or(defaults.trigger),
            api_key: get("GEMINI_API_KEY"),
            model: get("GEMINI_MODEL").unwrap_or(defaults.model),
            endpoint: get("GEMINI_ENDPOINT").unwrap_or(defaults.endpoint),
            system_prompt: get("DROID_SYSTEM_PROMPT").unwrap_or(defaults.system_prompt),
            max_history_turns: parse_or(
                "DROID_MAX_HISTORY",
                get("DROID_MAX_HISTORY"),
                defaults.max_history_turns,
            ),
            max_attempts: parse_or(
                "DROID_MAX_ATTEMPTS",
                get("DROID_MAX_ATTEMPTS"),
                defaults.max_attempts,
            )
            .max(1),
            serialize_channels: get("DROID_SERIALIZE_CHANNELS").is_some_and(|v| {
                matches!(
                    v.trim().to_ascii_lowercase().as_str(),
                    "1" | "true" | "yes"
                )
            }),
            http_timeout: Duration::from_secs(parse_or(
                "DROID_HTTP_TIMEOUT_SECS",
                get("DROID_HTTP_TIMEOUT_SECS"),
                defaults.http_timeout.as_secs(),
            )),
        }
    }
}

fn parse_or<T: FromStr + Copy + fmt::Display>(name: &str, raw: Option<String>, default: T) -> T {
    let Some(raw) = raw else {
        return default;
    };
    raw.trim().parse().unwrap_or_else(|_| {
        tracing::warn!(variable = name, value = %raw, %default, "Invalid number, using default");
        default
    })
}
