//! Wire payloads for the supported backend protocols.
//!
//! The OpenAI-compatible chat completion types live here; Ollama and Gemini
//! have their own submodules.

pub mod gemini;
pub mod ollama;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::message::Message;

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role.as_str().to_string(),
            content: message.content.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

/// Incremental delta inside one SSE `chat.completion.chunk`.
#[derive(Debug, Deserialize, Default)]
pub struct ChatResponseDelta {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    /// DeepSeek-style servers name the reasoning delta differently.
    #[serde(default)]
    pub reasoning_content: Option<String>,
}

impl ChatResponseDelta {
    pub fn reasoning_text(&self) -> Option<&str> {
        self.reasoning
            .as_deref()
            .filter(|text| !text.is_empty())
            .or_else(|| self.reasoning_content.as_deref())
            .filter(|text| !text.is_empty())
    }

    pub fn content_text(&self) -> Option<&str> {
        self.content.as_deref().filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatResponseChoice {
    #[serde(default)]
    pub delta: ChatResponseDelta,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatResponseChoice>,
    #[serde(default)]
    pub error: Option<Value>,
}

/// JSON pointer to the answer of a non-streamed chat completion.
pub const COMPLETION_CONTENT_POINTER: &str = "/choices/0/message/content";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_accepts_reasoning_content_alias() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"delta":{"reasoning_content":"why","content":""}}]}"#,
        )
        .unwrap();
        let delta = &response.choices[0].delta;
        assert_eq!(delta.reasoning_text(), Some("why"));
        assert_eq!(delta.content_text(), None);
    }

    #[test]
    fn empty_reasoning_falls_through_to_alias() {
        let delta: ChatResponseDelta =
            serde_json::from_str(r#"{"reasoning":"","reasoning_content":"deep"}"#).unwrap();
        assert_eq!(delta.reasoning_text(), Some("deep"));
    }

    #[test]
    fn request_serializes_role_tagged_messages() {
        let request = ChatRequest {
            model: "test-model".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "hello".to_string(),
            }],
            stream: true,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "model": "test-model",
                "messages": [{"role": "user", "content": "hello"}],
                "stream": true
            })
        );
    }
}
