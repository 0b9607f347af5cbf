use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{endpoint_url, send_checked, Backend};
use crate::api::ollama::{ChatRequest, GenerateRequest, CHAT_TEXT_POINTER, GENERATE_TEXT_POINTER};
use crate::api::ChatMessage;
use crate::core::adapters::single_shot::pointer_text;
use crate::core::adapters::{ndjson_fragments, single_shot_fragments, FragmentStream};
use crate::core::error::Result;
use crate::core::message::Message;

/// Ollama's native API. Streams NDJSON; with streaming off the reply is one
/// JSON document carrying the same fields.
pub struct OllamaBackend {
    client: reqwest::Client,
    provider: String,
    base_url: String,
    model: String,
    api_key: Option<String>,
    stream: bool,
}

impl OllamaBackend {
    pub fn new(
        client: reqwest::Client,
        provider: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        stream: bool,
    ) -> Self {
        Self {
            client,
            provider: provider.into(),
            base_url: base_url.into(),
            model: model.into(),
            api_key: None,
            stream,
        }
    }

    /// Sends `key` as a bearer token, for servers behind an authenticating
    /// proxy.
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key;
        self
    }

    async fn post<T: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        payload: &T,
        pointer: &'static str,
    ) -> Result<FragmentStream> {
        let url = endpoint_url(&self.base_url, endpoint);
        debug!(%url, model = %self.model, stream = self.stream, "ollama request");

        let mut request = self.client.post(&url).json(payload);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = send_checked(request).await?;
        let body = response.bytes_stream();

        if self.stream {
            Ok(Box::pin(ndjson_fragments(body, pointer)))
        } else {
            Ok(Box::pin(single_shot_fragments(body, move |document: &Value| {
                pointer_text(document, pointer)
            })))
        }
    }
}

#[async_trait]
impl Backend for OllamaBackend {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<FragmentStream> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: self.stream,
        };
        self.post("api/generate", &request, GENERATE_TEXT_POINTER)
            .await
    }

    async fn chat(&self, messages: &[Message]) -> Result<FragmentStream> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: messages.iter().map(ChatMessage::from).collect(),
            stream: self.stream,
        };
        self.post("api/chat", &request, CHAT_TEXT_POINTER).await
    }
}
