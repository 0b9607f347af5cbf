use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{endpoint_url, send_checked, Backend};
use crate::api::{ChatMessage, ChatRequest, COMPLETION_CONTENT_POINTER};
use crate::core::adapters::single_shot::pointer_text;
use crate::core::adapters::{single_shot_fragments, sse_fragments, FragmentStream};
use crate::core::error::Result;
use crate::core::message::{Message, Role};

/// OpenAI-compatible `/chat/completions`, used for both OpenAI and
/// OpenRouter. Streams SSE.
pub struct OpenAiBackend {
    client: reqwest::Client,
    provider: String,
    base_url: String,
    model: String,
    api_key: String,
    stream: bool,
    extra_headers: Vec<(&'static str, &'static str)>,
}

impl OpenAiBackend {
    pub fn new(
        client: reqwest::Client,
        provider: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        stream: bool,
    ) -> Self {
        Self {
            client,
            provider: provider.into(),
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
            stream,
            extra_headers: Vec::new(),
        }
    }

    /// Adds a fixed header sent with every request.
    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.extra_headers.push((name, value));
        self
    }

    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<FragmentStream> {
        let url = endpoint_url(&self.base_url, "chat/completions");
        debug!(%url, model = %self.model, stream = self.stream, "chat completion request");

        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            stream: self.stream,
        };

        let mut builder = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request);
        for (name, value) in &self.extra_headers {
            builder = builder.header(*name, *value);
        }

        let body = send_checked(builder).await?.bytes_stream();
        if self.stream {
            Ok(Box::pin(sse_fragments(body)))
        } else {
            Ok(Box::pin(single_shot_fragments(body, |document: &Value| {
                pointer_text(document, COMPLETION_CONTENT_POINTER)
            })))
        }
    }
}

#[async_trait]
impl Backend for OpenAiBackend {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<FragmentStream> {
        let message = Message::new(Role::User, prompt);
        self.complete(vec![ChatMessage::from(&message)]).await
    }

    async fn chat(&self, messages: &[Message]) -> Result<FragmentStream> {
        self.complete(messages.iter().map(ChatMessage::from).collect())
            .await
    }
}
