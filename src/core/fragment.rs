/// Classification of a [`Fragment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Content,
    Reasoning,
    Done,
    Invalid,
}

/// One classified unit of streamed text, produced by an adapter from a single
/// transport line or event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Final answer text.
    Content(String),
    /// Model deliberation that precedes the answer it supports.
    Reasoning(String),
    /// End-of-stream sentinel.
    Done,
    /// A payload that could not be decoded and was skipped.
    Invalid,
}

impl Fragment {
    pub fn kind(&self) -> FragmentKind {
        match self {
            Fragment::Content(_) => FragmentKind::Content,
            Fragment::Reasoning(_) => FragmentKind::Reasoning,
            Fragment::Done => FragmentKind::Done,
            Fragment::Invalid => FragmentKind::Invalid,
        }
    }

    /// Text payload; empty for `Done` and `Invalid`.
    pub fn text(&self) -> &str {
        match self {
            Fragment::Content(text) | Fragment::Reasoning(text) => text,
            Fragment::Done | Fragment::Invalid => "",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Fragment::Done)
    }
}
