//! Wire types for OpenAI-compatible chat completion endpoints.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    pub stream: bool,
}

/// One `data:` payload of a streamed completion.
///
/// Providers report mid-stream failures by sending an object with an `error`
/// member instead of `choices`, so both are optional.
#[derive(Deserialize, Debug, Default)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ChatChoice {
    #[serde(default)]
    pub delta: ChatDelta,
}

#[derive(Deserialize, Debug, Default)]
pub struct ChatDelta {
    pub content: Option<String>,
}
