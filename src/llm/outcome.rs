//! Completion outcomes
//!
//! Exactly one outcome is produced per completion call. Only `Success` and
//! `NoContent` carry model text; the rest are failures that map to fixed
//! user-facing replies.

/// Reply used when the service answers without any text
pub const NO_CONTENT_PLACEHOLDER: &str = "No comment.";

/// Upper bound on transport error text shown to users
pub const TRANSPORT_MESSAGE_LIMIT: usize = 80;

/// Upper bound on error response bodies shown to users
pub const BODY_EXCERPT_LIMIT: usize = 200;

const MISSING_CREDENTIAL_REPLY: &str =
    "Droid is offline: no completion API key is configured.";
const EXHAUSTED_RETRIES_REPLY: &str =
    "The completion service is overloaded right now. Try again in a moment.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Generated text from the first candidate
    Success { text: String },
    /// Well-formed response without usable text
    NoContent,
    /// No API key configured; no request was sent
    MissingCredential,
    /// Non-success, non-rate-limit status
    RequestFailed { status: u16, body_excerpt: String },
    /// Network or parse failure
    TransportError { message: String },
    /// Every attempt was rate limited
    ExhaustedRetries { attempts: u32 },
}

impl CompletionOutcome {
    /// Stable name for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::NoContent => "no_content",
            Self::MissingCredential => "missing_credential",
            Self::RequestFailed { .. } => "request_failed",
            Self::TransportError { .. } => "transport_error",
            Self::ExhaustedRetries { .. } => "exhausted_retries",
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Success { .. } | Self::NoContent)
    }

    /// Model text, if the call produced any
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Success { text } => Some(text),
            Self::NoContent => Some(NO_CONTENT_PLACEHOLDER),
            _ => None,
        }
    }

    /// Text to show the user for this outcome
    pub fn reply_text(&self) -> String {
        match self {
            Self::Success { .. } | Self::NoContent => {
                self.text().unwrap_or_default().to_string()
            }
            Self::MissingCredential => MISSING_CREDENTIAL_REPLY.to_string(),
            Self::RequestFailed {
                status,
                body_excerpt,
            } => format!("Completion request failed (HTTP {status}): {body_excerpt}"),
            Self::TransportError { message } => {
                format!("Could not reach the completion service: {message}")
            }
            Self::ExhaustedRetries { .. } => EXHAUSTED_RETRIES_REPLY.to_string(),
        }
    }
}

/// First `limit` characters of `text`
pub fn excerpt(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
