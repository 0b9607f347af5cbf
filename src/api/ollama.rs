//! Ollama native API payloads (`/api/generate`, `/api/chat`).

use serde::Serialize;

use super::ChatMessage;

/// Text of one `/api/generate` line.
pub const GENERATE_TEXT_POINTER: &str = "/response";

/// Text of one `/api/chat` line.
pub const CHAT_TEXT_POINTER: &str = "/message/content";

#[derive(Debug, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}
