//! Fragment source adapters.
//!
//! Each adapter turns an HTTP body (a stream of byte chunks) into a lazy
//! stream of [`Fragment`]s. Lines are reassembled across chunk boundaries
//! before they are classified, so a chunk may end anywhere, including in the
//! middle of a UTF-8 sequence.

pub mod ndjson;
pub mod single_shot;
pub mod sse;

use std::pin::Pin;

use bytes::Bytes;
use futures_util::stream::{self, Stream, StreamExt};
use memchr::memchr;
use serde_json::Value;

use crate::core::error::{Error, Result};
use crate::core::fragment::Fragment;

pub use ndjson::ndjson_fragments;
pub use single_shot::single_shot_fragments;
pub use sse::sse_fragments;

/// Boxed fragment stream handed from a backend to its consumer. Dropping it
/// drops the HTTP body and releases the connection.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<Fragment>> + Send>>;

/// Splits a byte stream into UTF-8 lines without their terminators.
///
/// A trailing line without a newline is yielded at end of body. After a
/// transport error the stream ends.
pub fn lines<S, E>(body: S) -> impl Stream<Item = Result<String>> + Send
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Into<Error> + Send,
{
    let state = (Box::pin(body), Vec::<u8>::new(), false);

    stream::unfold(state, |(mut body, mut buffer, mut finished)| async move {
        loop {
            if let Some(newline_pos) = memchr(b'\n', &buffer) {
                let line: Vec<u8> = buffer.drain(..=newline_pos).collect();
                let decoded = decode_line(&line[..newline_pos]);
                return Some((decoded, (body, buffer, finished)));
            }

            if finished {
                if buffer.is_empty() {
                    return None;
                }
                let line = std::mem::take(&mut buffer);
                return Some((decode_line(&line), (body, buffer, finished)));
            }

            match body.next().await {
                Some(Ok(chunk)) => buffer.extend_from_slice(&chunk),
                Some(Err(err)) => {
                    buffer.clear();
                    return Some((Err(err.into()), (body, buffer, true)));
                }
                None => finished = true,
            }
        }
    })
}

fn decode_line(raw: &[u8]) -> Result<String> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8(raw.to_vec())
        .map_err(|err| Error::protocol(format!("Invalid UTF-8 in stream: {err}")))
}

/// Ends the stream right after the first error or `Done` sentinel, so no
/// further transport lines are read.
pub(crate) fn stop_after_terminal<S>(fragments: S) -> impl Stream<Item = Result<Fragment>> + Send
where
    S: Stream<Item = Result<Fragment>> + Send,
{
    stream::unfold((Box::pin(fragments), false), |(mut fragments, ended)| async move {
        if ended {
            return None;
        }
        let item = fragments.next().await?;
        let ended = matches!(item, Err(_) | Ok(Fragment::Done));
        Some((item, (fragments, ended)))
    })
}

/// Best-effort human summary of a backend error object.
pub(crate) fn error_message(error: &Value) -> String {
    let summary = match error {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned),
        _ => None,
    };

    summary
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| error.to_string())
}
