//! Conversation state and the fragment consumer loop.

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::adapters::FragmentStream;
use crate::core::backends::Backend;
use crate::core::error::{Error, Result};
use crate::core::fragment::Fragment;
use crate::core::message::{Message, Role};
use crate::core::splitter::ReasoningSplitter;

/// Ordered, append-only list of conversation turns.
#[derive(Debug, Default, Clone)]
pub struct SessionLog {
    messages: Vec<Message>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Drives `stream` through `splitter` until the stream ends, a `Done`
/// sentinel arrives, an error surfaces, or `cancel` fires.
///
/// `on_update` runs after every fragment with the splitter already updated.
/// Cancellation wins over a fragment that is ready at the same time. The
/// stream is dropped on return, which releases the connection.
pub async fn consume<F>(
    mut stream: FragmentStream,
    splitter: &mut ReasoningSplitter,
    cancel: &CancellationToken,
    mut on_update: F,
) -> Result<()>
where
    F: FnMut(&Fragment, &ReasoningSplitter) -> std::io::Result<()>,
{
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("request cancelled while streaming");
                return Err(Error::Cancelled);
            }
            next = stream.next() => next,
        };

        let Some(fragment) = next else {
            return Ok(());
        };
        let fragment = fragment?;

        splitter.push(&fragment);
        on_update(&fragment, splitter)?;

        if fragment.is_done() {
            return Ok(());
        }
    }
}

/// Sends a single prompt without history and drives the reply through
/// `splitter`. Cancellation is honoured while waiting for the response
/// headers as well as while streaming.
pub async fn generate<F>(
    backend: &dyn Backend,
    prompt: &str,
    splitter: &mut ReasoningSplitter,
    cancel: &CancellationToken,
    on_update: F,
) -> Result<()>
where
    F: FnMut(&Fragment, &ReasoningSplitter) -> std::io::Result<()>,
{
    let stream = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!("request cancelled before the response arrived");
            return Err(Error::Cancelled);
        }
        stream = backend.generate(prompt) => stream?,
    };
    consume(stream, splitter, cancel, on_update).await
}

/// One conversation against one backend. A single request is in flight at a
/// time because [`ChatSession::ask`] borrows the session mutably.
pub struct ChatSession {
    backend: Box<dyn Backend>,
    log: SessionLog,
}

impl ChatSession {
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self {
            backend,
            log: SessionLog::new(),
        }
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    /// Starts a fresh log. Entries of the old log are not touched.
    pub fn reset(&mut self) -> SessionLog {
        std::mem::take(&mut self.log)
    }

    /// Sends `prompt` with the whole conversation and returns the visible
    /// answer, which is also recorded as the assistant turn.
    ///
    /// The user turn is recorded before the request. On error or
    /// cancellation no assistant turn is recorded.
    pub async fn ask<F>(
        &mut self,
        prompt: &str,
        show_reasoning: bool,
        cancel: &CancellationToken,
        on_update: F,
    ) -> Result<String>
    where
        F: FnMut(&Fragment, &ReasoningSplitter) -> std::io::Result<()>,
    {
        self.log.add(Role::User, prompt);

        let stream = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            stream = self.backend.chat(self.log.messages()) => stream?,
        };

        let mut splitter = ReasoningSplitter::new(show_reasoning);
        consume(stream, &mut splitter, cancel, on_update).await?;

        let answer = splitter.answer();
        self.log.add(Role::Assistant, answer.clone());
        Ok(answer)
    }
}
