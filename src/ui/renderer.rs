//! Plain-text output of a streamed reply.
//!
//! Renderers see every fragment together with the splitter state after that
//! fragment. They write to any [`Write`] so tests can capture output in a
//! `Vec<u8>`.

use std::io::{self, Write};

use crate::core::fragment::Fragment;
use crate::core::splitter::{ReasoningSplitter, THINK_CLOSE, THINK_OPEN};

pub trait Renderer {
    fn update(&mut self, fragment: &Fragment, splitter: &ReasoningSplitter) -> io::Result<()>;

    /// Called once after the stream ended successfully.
    fn finish(&mut self) -> io::Result<()>;

    /// Called when the request failed or was cancelled after output started.
    fn abort(&mut self) -> io::Result<()>;
}

/// Length of the longest suffix of `text` that is a proper prefix of a
/// reasoning marker.
fn partial_marker_len(text: &str) -> usize {
    [THINK_OPEN, THINK_CLOSE]
        .iter()
        .flat_map(|marker| (1..marker.len()).map(move |len| &marker[..len]))
        .filter(|prefix| text.ends_with(prefix))
        .map(str::len)
        .max()
        .unwrap_or(0)
}

/// Prints only the newly visible suffix after each fragment.
///
/// Text that has been printed is never retracted: a trailing partial marker
/// is held back until the next fragment resolves it, and updates that do not
/// extend what was printed (an open hidden span) print nothing.
pub struct PlainRenderer<W: Write> {
    out: W,
    printed: String,
    latest: String,
}

impl<W: Write> PlainRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: String::new(),
            latest: String::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn print_up_to(&mut self, end: usize) -> io::Result<()> {
        if end <= self.printed.len() || !self.latest.starts_with(&self.printed) {
            return Ok(());
        }
        let suffix = &self.latest[self.printed.len()..end];
        self.out.write_all(suffix.as_bytes())?;
        self.out.flush()?;
        self.printed.push_str(suffix);
        Ok(())
    }

    fn end_line(&mut self) -> io::Result<()> {
        if !self.printed.is_empty() && !self.printed.ends_with('\n') {
            self.out.write_all(b"\n")?;
        }
        self.out.flush()
    }
}

impl<W: Write> Renderer for PlainRenderer<W> {
    fn update(&mut self, _fragment: &Fragment, splitter: &ReasoningSplitter) -> io::Result<()> {
        self.latest.clear();
        self.latest.push_str(splitter.content());
        let end = self.latest.len() - partial_marker_len(&self.latest);
        self.print_up_to(end)
    }

    fn finish(&mut self) -> io::Result<()> {
        let end = self.latest.len();
        self.print_up_to(end)?;
        self.end_line()
    }

    fn abort(&mut self) -> io::Result<()> {
        self.end_line()
    }
}

/// Shows every fragment as `[text]`, then the final visible content.
pub struct DebugRenderer<W: Write> {
    out: W,
    latest: String,
}

impl<W: Write> DebugRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            latest: String::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for DebugRenderer<W> {
    fn update(&mut self, fragment: &Fragment, splitter: &ReasoningSplitter) -> io::Result<()> {
        match fragment {
            Fragment::Content(text) | Fragment::Reasoning(text) => {
                write!(self.out, "[{text}]")?;
                self.out.flush()?;
            }
            Fragment::Done | Fragment::Invalid => {}
        }
        self.latest.clear();
        self.latest.push_str(splitter.content());
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "--- CONTENT ---")?;
        writeln!(self.out, "{}", self.latest)?;
        writeln!(self.out, "---")?;
        self.out.flush()
    }

    fn abort(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<R: Renderer>(renderer: &mut R, show_reasoning: bool, tokens: &[&str]) {
        let mut splitter = ReasoningSplitter::new(show_reasoning);
        for token in tokens {
            let fragment = Fragment::Content(token.to_string());
            splitter.push(&fragment);
            renderer.update(&fragment, &splitter).unwrap();
        }
        renderer.finish().unwrap();
    }

    fn plain(show_reasoning: bool, tokens: &[&str]) -> String {
        let mut renderer = PlainRenderer::new(Vec::new());
        render(&mut renderer, show_reasoning, tokens);
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn partial_marker_suffixes() {
        assert_eq!(partial_marker_len("answer <"), 1);
        assert_eq!(partial_marker_len("answer <th"), 3);
        assert_eq!(partial_marker_len("answer </thin"), 6);
        assert_eq!(partial_marker_len("answer <think>"), 0);
        assert_eq!(partial_marker_len("a < b"), 0);
        assert_eq!(partial_marker_len("ção"), 0);
    }

    #[test]
    fn hidden_reasoning_split_across_fragments_never_prints() {
        let out = plain(false, &["<thi", "nk>hidden</th", "ink>visible"]);
        assert_eq!(out, "visible\n");
    }

    #[test]
    fn text_before_a_late_span_is_kept() {
        let out = plain(false, &["Hello ", "<think>", "plan", "</think>", "world"]);
        assert_eq!(out, "Hello world\n");
    }

    #[test]
    fn shown_reasoning_prints_escaped_markers_once() {
        let out = plain(true, &["<th", "ink>x</thi", "nk>y"]);
        assert_eq!(out, "\\<think\\>x\\</think\\>y\n");
    }

    #[test]
    fn held_back_angle_bracket_is_flushed_at_finish() {
        let out = plain(false, &["1 <", " 2 and 3 <"]);
        assert_eq!(out, "1 < 2 and 3 <\n");
    }

    #[test]
    fn output_ending_in_newline_gets_no_extra_line() {
        assert_eq!(plain(false, &["done\n"]), "done\n");
        assert_eq!(plain(false, &[]), "");
    }

    #[test]
    fn debug_renderer_brackets_fragments_and_prints_content() {
        let mut renderer = DebugRenderer::new(Vec::new());
        render(&mut renderer, false, &["<think>", "r", "</think>", "ok"]);
        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(
            out,
            "[<think>][r][</think>][ok]\n--- CONTENT ---\nok\n---\n"
        );
    }
}
