//! Non-streamed responses: the whole body is one JSON document.

use bytes::Bytes;
use futures_util::stream::{self, Stream, StreamExt, TryStreamExt};
use serde_json::Value;

use super::error_message;
use crate::core::error::{Error, Result};
use crate::core::fragment::Fragment;

/// Reads the string at a JSON pointer, if present.
pub fn pointer_text(document: &Value, pointer: &str) -> Option<String> {
    document
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Parses a complete response document into zero or one Content fragment.
pub fn parse_document<F>(raw: &[u8], extract: F) -> Result<Option<Fragment>>
where
    F: FnOnce(&Value) -> Option<String>,
{
    let document: Value = serde_json::from_slice(raw).map_err(|err| {
        let preview = String::from_utf8_lossy(&raw[..raw.len().min(200)]).into_owned();
        Error::protocol(format!("Malformed JSON response ({err}): {preview}"))
    })?;

    if let Some(error) = document.get("error") {
        return Err(Error::Api(error_message(error)));
    }

    Ok(extract(&document)
        .filter(|text| !text.is_empty())
        .map(Fragment::Content))
}

/// Collects the entire body before yielding anything, then yields the
/// extracted answer as a single Content fragment.
pub fn single_shot_fragments<S, E, F>(
    body: S,
    extract: F,
) -> impl Stream<Item = Result<Fragment>> + Send
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Into<Error> + Send,
    F: FnOnce(&Value) -> Option<String> + Send + 'static,
{
    let whole = async move {
        let raw: Vec<u8> = body
            .map_err(|err| -> Error { err.into() })
            .try_fold(Vec::new(), |mut raw, chunk| async move {
                raw.extend_from_slice(&chunk);
                Ok::<_, Error>(raw)
            })
            .await?;
        parse_document(&raw, extract)
    };

    stream::once(whole).filter_map(|result| async move { result.transpose() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::COMPLETION_CONTENT_POINTER;
    use crate::core::adapters::test_support::{body, collect};

    fn completion(raw: &str) -> Result<Option<Fragment>> {
        parse_document(raw.as_bytes(), |document| {
            pointer_text(document, COMPLETION_CONTENT_POINTER)
        })
    }

    #[test]
    fn completion_answer_becomes_one_fragment() {
        let fragment =
            completion(r#"{"choices":[{"message":{"role":"assistant","content":"Hi"}}]}"#)
                .unwrap();
        assert_eq!(fragment, Some(Fragment::Content("Hi".to_string())));
    }

    #[test]
    fn missing_or_empty_answer_yields_nothing() {
        assert_eq!(completion(r#"{"choices":[]}"#).unwrap(), None);
        assert_eq!(
            completion(r#"{"choices":[{"message":{"content":""}}]}"#).unwrap(),
            None
        );
    }

    #[test]
    fn error_document_is_an_api_error() {
        let err = completion(r#"{"error":{"code":429,"message":"quota\n exceeded"}}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "API error: quota exceeded");
    }

    #[test]
    fn malformed_document_is_a_protocol_error() {
        assert!(matches!(completion("<html>"), Err(Error::Protocol(_))));
    }

    #[tokio::test]
    async fn body_is_collected_across_chunks() {
        let fragments = collect(single_shot_fragments(
            body(&["{\"response\":\"<think>x</th", "ink>answer\",\"done\":true}"]),
            |document: &Value| pointer_text(document, "/response"),
        ))
        .await;

        assert_eq!(fragments.len(), 1);
        assert_eq!(
            fragments[0].as_ref().unwrap(),
            &Fragment::Content("<think>x</think>answer".to_string())
        );
    }

    #[tokio::test]
    async fn empty_answer_yields_an_empty_stream() {
        let fragments = collect(single_shot_fragments(
            body(&["{\"response\":\"\"}"]),
            |document: &Value| pointer_text(document, "/response"),
        ))
        .await;
        assert!(fragments.is_empty());
    }
}
