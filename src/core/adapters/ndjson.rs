//! Newline-delimited JSON streaming (Ollama).

use bytes::Bytes;
use futures_util::future;
use futures_util::stream::{Stream, StreamExt};
use serde_json::Value;

use super::{error_message, lines, stop_after_terminal};
use crate::core::error::{Error, Result};
use crate::core::fragment::Fragment;

/// Classifies one NDJSON line. `pointer` addresses the generated text.
///
/// Blank lines and lines whose text field is empty or absent yield nothing.
pub fn classify_line(line: &str, pointer: &str) -> Result<Option<Fragment>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(line)
        .map_err(|err| Error::protocol(format!("Malformed JSON line ({err}): {line}")))?;

    if let Some(error) = value.get("error") {
        return Err(Error::Api(error_message(error)));
    }

    Ok(value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(|text| Fragment::Content(text.to_string())))
}

/// Streams Content fragments from an NDJSON body until the connection closes.
pub fn ndjson_fragments<S, E>(
    body: S,
    pointer: &'static str,
) -> impl Stream<Item = Result<Fragment>> + Send
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Into<Error> + Send,
{
    let fragments = lines(body).filter_map(move |line| {
        future::ready(line.and_then(|line| classify_line(&line, pointer)).transpose())
    });
    stop_after_terminal(fragments)
}
