//! HTTP backends, one per protocol family.
//!
//! A backend issues the request and hands the response body to the adapter
//! for its wire protocol. It never buffers a streamed reply itself.

pub mod gemini;
pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use tracing::debug;

use crate::core::adapters::FragmentStream;
use crate::core::error::{Error, Result};
use crate::core::message::Message;

pub use gemini::GeminiBackend;
pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;

#[async_trait]
pub trait Backend: Send + Sync {
    /// Configured provider name, e.g. `ollama` or `openrouter`.
    fn provider(&self) -> &str;

    fn model(&self) -> &str;

    /// Single-prompt generation.
    async fn generate(&self, prompt: &str) -> Result<FragmentStream>;

    /// Generation from the full ordered conversation. The backend does not
    /// retain `messages`.
    async fn chat(&self, messages: &[Message]) -> Result<FragmentStream>;
}

/// Joins a base URL and an endpoint path with exactly one slash between them.
pub fn endpoint_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

/// Sends the request and turns a non-2xx answer into [`Error::Status`].
pub(crate) async fn send_checked(request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let body = body.trim().to_string();
    debug!(
        status = status.as_u16(),
        first_line = body.lines().next().unwrap_or_default(),
        "backend rejected request"
    );
    Err(Error::Status {
        status: status.as_u16(),
        body: if body.is_empty() {
            status.canonical_reason().unwrap_or("Unknown").to_string()
        } else {
            body
        },
    })
}
