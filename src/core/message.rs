#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One conversation turn. Assistant content is the visible answer with
/// reasoning already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

impl Role {
    /// Role name on the wire for OpenAI-compatible and Ollama chat payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ChatMessage;

    #[test]
    fn wire_message_carries_lowercase_role() {
        let value = serde_json::to_value(ChatMessage::from(&Message::user("hi"))).unwrap();
        assert_eq!(value, serde_json::json!({"role": "user", "content": "hi"}));

        let value = serde_json::to_value(ChatMessage::from(&Message::assistant("hello"))).unwrap();
        assert_eq!(value["role"], "assistant");
        assert_eq!(Role::System.as_str(), "system");
    }
}
