//! Reasoning/content splitting for streamed model output.
//!
//! A [`ReasoningSplitter`] accumulates every fragment of one generation and
//! recomputes the visible text after each update. Reasoning can arrive in two
//! shapes: already classified by the protocol ([`Fragment::Reasoning`]), or
//! inline in raw text between `<think>` and `</think>`. Classified reasoning
//! is written into the buffer between synthesized markers, so a single scan
//! over the whole buffer handles both shapes, including markers that are
//! split across arrivals.

use crate::core::fragment::Fragment;

pub const THINK_OPEN: &str = "<think>";
pub const THINK_CLOSE: &str = "</think>";

const ESCAPED_OPEN: &str = "\\<think\\>";
const ESCAPED_CLOSE: &str = "\\</think\\>";

/// Result of scanning text for reasoning spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagScan {
    /// Text with every complete span removed. When a span is still open this
    /// holds only the text before its open marker.
    pub text: String,
    /// An open marker was found with no close marker after it.
    pub unterminated: bool,
}

/// Removes `<think>...</think>` spans from `text`.
///
/// Matching is find-based: each open marker pairs with the first close marker
/// after it, so nested open markers inside a span are not balanced.
pub fn scan_reasoning(text: &str) -> TagScan {
    let mut kept = String::with_capacity(text.len());
    let mut rest = text;

    loop {
        let Some(start) = rest.find(THINK_OPEN) else {
            kept.push_str(rest);
            return TagScan {
                text: kept,
                unterminated: false,
            };
        };

        kept.push_str(&rest[..start]);
        let after_open = &rest[start + THINK_OPEN.len()..];
        match after_open.find(THINK_CLOSE) {
            Some(end) => rest = &after_open[end + THINK_CLOSE.len()..],
            None => {
                return TagScan {
                    text: kept,
                    unterminated: true,
                }
            }
        }
    }
}

/// Renders reasoning markers inert so a markdown renderer shows them literally.
pub fn escape_markers(text: &str) -> String {
    text.replace(THINK_OPEN, ESCAPED_OPEN)
        .replace(THINK_CLOSE, ESCAPED_CLOSE)
}

/// Token-output state machine for one generation request.
#[derive(Debug, Clone)]
pub struct ReasoningSplitter {
    buffer: String,
    visible: String,
    in_reasoning: bool,
    show_reasoning: bool,
    // Start of the body of an open synthesized <think> span.
    classified_span: Option<usize>,
}

impl ReasoningSplitter {
    pub fn new(show_reasoning: bool) -> Self {
        Self {
            buffer: String::new(),
            visible: String::new(),
            in_reasoning: false,
            show_reasoning,
            classified_span: None,
        }
    }

    /// Consumes one classified fragment.
    pub fn push(&mut self, fragment: &Fragment) {
        match fragment {
            Fragment::Reasoning(text) => {
                let start = match self.classified_span {
                    Some(start) => start,
                    None => {
                        self.buffer.push_str(THINK_OPEN);
                        let start = self.buffer.len();
                        self.classified_span = Some(start);
                        start
                    }
                };
                self.buffer.push_str(text);
                self.neutralise_close_markers(start);
            }
            Fragment::Content(text) => {
                self.close_classified_span();
                self.buffer.push_str(text);
            }
            Fragment::Done | Fragment::Invalid => return,
        }
        self.refresh();
    }

    /// Consumes a raw token that may carry inline reasoning markers.
    pub fn push_text(&mut self, text: &str) {
        self.close_classified_span();
        self.buffer.push_str(text);
        self.refresh();
    }

    /// The text that should be visible right now.
    ///
    /// Empty while an unterminated reasoning span is open and reasoning is
    /// hidden.
    pub fn content(&self) -> &str {
        if self.in_reasoning && !self.show_reasoning {
            return "";
        }
        &self.visible
    }

    /// The assembled answer with all reasoning removed, whatever the display
    /// mode. This is what gets recorded as the assistant turn.
    pub fn answer(&self) -> String {
        scan_reasoning(&self.buffer).text.trim().to_string()
    }

    pub fn in_reasoning(&self) -> bool {
        self.in_reasoning
    }

    pub fn show_reasoning(&self) -> bool {
        self.show_reasoning
    }

    /// Everything received so far, before tag removal.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    fn close_classified_span(&mut self) {
        if self.classified_span.take().is_some() {
            self.buffer.push_str(THINK_CLOSE);
            if self.show_reasoning {
                self.buffer.push_str("\n\n");
            }
        }
    }

    /// Classified reasoning may itself mention `</think>`, possibly split
    /// across deltas. Only the synthesized marker may close the span.
    fn neutralise_close_markers(&mut self, start: usize) {
        let Some(body) = self.buffer.get(start..) else {
            return;
        };
        if body.contains(THINK_CLOSE) {
            let body = body.replace(THINK_CLOSE, ESCAPED_CLOSE);
            self.buffer.truncate(start);
            self.buffer.push_str(&body);
        }
    }

    fn refresh(&mut self) {
        let scan = scan_reasoning(&self.buffer);
        self.in_reasoning = scan.unterminated;
        self.visible = if self.show_reasoning {
            escape_markers(&self.buffer)
        } else {
            scan.text
        };
    }
}
