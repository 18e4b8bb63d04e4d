//! Google Gemini `generateContent` wire format

use crate::history::{Role, Turn};
use serde::{Deserialize, Serialize};

/// Default API base for direct (non-proxied) access
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Full `generateContent` URL for `model`, without the key parameter
pub fn generate_content_url(endpoint: &str, model: &str) -> String {
    format!(
        "{}/models/{}:generateContent",
        endpoint.trim_end_matches('/'),
        model
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
    system_instruction: GeminiContent,
}

impl GenerateContentRequest {
    /// History turns in order, then the new user turn
    pub fn new(history: &[Turn], user_text: &str, system_instruction: &str) -> Self {
        let contents = history
            .iter()
            .map(|turn| GeminiContent::with_role(turn.role(), turn.text()))
            .chain(std::iter::once(GeminiContent::with_role(
                Role::User,
                user_text,
            )))
            .collect();

        Self {
            contents,
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart::text(system_instruction)],
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

impl GeminiContent {
    fn with_role(role: Role, text: &str) -> Self {
        Self {
            role: Some(role.as_str().to_string()),
            parts: vec![GeminiPart::text(text)],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl GeminiPart {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

impl GenerateContentResponse {
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Text at `candidates[0].content.parts[0].text`, if non-empty
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
            .filter(|text| !text.is_empty())
    }

    /// Why the first candidate stopped, e.g. `SAFETY` for declined prompts
    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates.first()?.finish_reason.as_deref()
    }
}
