//! Anthropic Claude Messages API types.

use serde::{Deserialize, Serialize};

/// Claude message role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClaudeRole {
    /// Human user message.
    User,
    /// AI assistant response.
    Assistant,
}

/// A single plain-text turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClaudeMessage {
    pub role: ClaudeRole,
    pub content: String,
}

/// Body of `POST /v1/messages`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<ClaudeMessage>,
}

impl MessagesRequest {
    /// Single user turn carrying the whole prompt.
    pub fn single_turn(model: &str, max_tokens: u32, prompt: &str) -> Self {
        Self {
            model: model.to_string(),
            max_tokens,
            messages: vec![ClaudeMessage { role: ClaudeRole::User, content: prompt.to_string() }],
        }
    }
}

/// Response content block. Only text is consumed; other block types are skipped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ClaudeContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Successful `POST /v1/messages` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessagesResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub content: Vec<ClaudeContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl MessagesResponse {
    /// Concatenated text of all text blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ClaudeContentBlock::Text { text } => Some(text.as_str()),
                ClaudeContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Error envelope: `{"type":"error","error":{"type":"…","message":"…"}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub error_type: String,
    #[serde(default)]
    pub message: String,
}
