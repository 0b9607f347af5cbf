//! Server-sent events streaming (OpenAI-compatible chat completions).

use bytes::Bytes;
use futures_util::stream::{self, Stream, StreamExt};
use tracing::debug;

use super::{error_message, lines, stop_after_terminal};
use crate::api::ChatResponse;
use crate::core::error::{Error, Result};
use crate::core::fragment::Fragment;

const DONE_SENTINEL: &str = "[DONE]";

fn extract_data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim_start)
}

/// Classifies one SSE line into zero, one or two fragments.
///
/// When a delta carries both reasoning and content, the reasoning fragment
/// comes first.
pub fn classify_line(line: &str) -> Result<Vec<Fragment>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return Ok(Vec::new());
    }

    let Some(payload) = extract_data_payload(line) else {
        debug!(line, "skipping non-data SSE field");
        return Ok(Vec::new());
    };

    if payload == DONE_SENTINEL {
        return Ok(vec![Fragment::Done]);
    }

    let response = match serde_json::from_str::<ChatResponse>(payload) {
        Ok(response) => response,
        Err(err) => {
            debug!(%err, payload, "undecodable SSE payload");
            return Ok(vec![Fragment::Invalid]);
        }
    };

    if let Some(error) = &response.error {
        return Err(Error::Api(error_message(error)));
    }

    let mut fragments = Vec::with_capacity(2);
    if let Some(choice) = response.choices.first() {
        if let Some(reasoning) = choice.delta.reasoning_text() {
            fragments.push(Fragment::Reasoning(reasoning.to_string()));
        }
        if let Some(content) = choice.delta.content_text() {
            fragments.push(Fragment::Content(content.to_string()));
        }
    }
    Ok(fragments)
}

/// Streams fragments from an SSE body. Ends after the `[DONE]` sentinel
/// without reading any further lines.
pub fn sse_fragments<S, E>(body: S) -> impl Stream<Item = Result<Fragment>> + Send
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Into<Error> + Send,
{
    let fragments = lines(body).flat_map(|line| {
        let items: Vec<Result<Fragment>> = match line.and_then(|line| classify_line(&line)) {
            Ok(fragments) => fragments.into_iter().map(Ok).collect(),
            Err(err) => vec![Err(err)],
        };
        stream::iter(items)
    });
    stop_after_terminal(fragments)
}
