use async_trait::async_trait;
use tracing::debug;

use super::{endpoint_url, send_checked, Backend};
use crate::api::gemini::{answer_text, GenerateContentRequest};
use crate::core::adapters::{single_shot_fragments, FragmentStream};
use crate::core::error::Result;
use crate::core::message::Message;

/// Gemini `generateContent`. Always single-shot: the whole answer arrives in
/// one document.
pub struct GeminiBackend {
    client: reqwest::Client,
    provider: String,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiBackend {
    pub fn new(
        client: reqwest::Client,
        provider: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            provider: provider.into(),
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    async fn generate_content(&self, request: GenerateContentRequest) -> Result<FragmentStream> {
        let url = endpoint_url(
            &self.base_url,
            &format!("models/{}:generateContent", self.model),
        );
        debug!(%url, "gemini request");

        let builder = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request);

        let body = send_checked(builder).await?.bytes_stream();
        Ok(Box::pin(single_shot_fragments(body, answer_text)))
    }
}

#[async_trait]
impl Backend for GeminiBackend {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<FragmentStream> {
        self.generate_content(GenerateContentRequest::from_prompt(prompt))
            .await
    }

    async fn chat(&self, messages: &[Message]) -> Result<FragmentStream> {
        self.generate_content(GenerateContentRequest::from_messages(messages))
            .await
    }
}
