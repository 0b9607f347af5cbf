//! Gemini `generateContent` payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::message::{Message, Role};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Part {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            thought: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

impl GenerateContentRequest {
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::text(prompt)],
            }],
            system_instruction: None,
        }
    }

    /// System turns become the system instruction; assistant turns use
    /// Gemini's `model` role.
    pub fn from_messages(messages: &[Message]) -> Self {
        let mut contents = Vec::new();
        let mut system_parts = Vec::new();

        for message in messages {
            match message.role {
                Role::System => system_parts.push(Part::text(message.content.clone())),
                Role::User | Role::Assistant => contents.push(Content {
                    role: Some(gemini_role(message.role).to_string()),
                    parts: vec![Part::text(message.content.clone())],
                }),
            }
        }

        let system_instruction = (!system_parts.is_empty()).then(|| Content {
            role: None,
            parts: system_parts,
        });

        Self {
            contents,
            system_instruction,
        }
    }
}

fn gemini_role(role: Role) -> &'static str {
    match role {
        Role::Assistant => "model",
        Role::User | Role::System => "user",
    }
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// Full answer of a `generateContent` response: the first candidate's text
/// parts, excluding thought summaries.
pub fn answer_text(document: &Value) -> Option<String> {
    let response = GenerateContentResponse::deserialize(document).ok()?;
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content
        .parts
        .into_iter()
        .filter(|part| part.thought != Some(true))
        .map(|part| part.text)
        .collect();
    Some(text)
}
