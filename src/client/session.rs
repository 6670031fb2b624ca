//! One chat session: transcript plus round trips through a transport

use futures::StreamExt;

use crate::stream::{StreamReassembler, Transcript};

use super::transport::{ChatError, ChatTransport};

/// Result of a submitted line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input, nothing sent
    Ignored,
    /// Round trip finished with this reply (possibly empty)
    Replied(String),
}

/// Chat session state
///
/// `send` borrows the session mutably for the whole round trip, so only one
/// request can be in flight at a time.
pub struct ChatSession<T: ChatTransport> {
    transport: T,
    transcript: Transcript,
}

impl<T: ChatTransport> ChatSession<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            transcript: Transcript::new(),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Forget the conversation and start over
    pub fn reset(&mut self) {
        self.transcript = Transcript::new();
    }

    /// Submit a line and stream the reply into the transcript.
    ///
    /// `render` is called after the user entry is added, after every reply
    /// fragment, and once more after a failed round trip is unwound. On
    /// failure the transcript has already been rolled back according to
    /// [`ChatError::rolls_back`] when the error is returned.
    pub async fn send<F>(&mut self, input: &str, mut render: F) -> Result<SendOutcome, ChatError>
    where
        F: FnMut(&Transcript),
    {
        let content = input.trim();
        if content.is_empty() {
            return Ok(SendOutcome::Ignored);
        }

        self.transcript.push_user(content);
        render(&self.transcript);

        match self.stream_reply(&mut render).await {
            Ok(reply) => {
                self.transcript.end_reply();
                Ok(SendOutcome::Replied(reply))
            }
            Err(e) => {
                tracing::warn!("Chat round trip failed: {}", e);
                if e.rolls_back() {
                    self.transcript.rollback();
                } else {
                    self.transcript.end_reply();
                }
                render(&self.transcript);
                Err(e)
            }
        }
    }

    async fn stream_reply<F>(&mut self, render: &mut F) -> Result<String, ChatError>
    where
        F: FnMut(&Transcript),
    {
        let mut stream = self.transport.open(self.transcript.messages()).await?;
        let mut reassembler = StreamReassembler::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            for snapshot in reassembler.push(&chunk) {
                self.transcript.apply_reply(&snapshot);
                render(&self.transcript);
            }
            if reassembler.is_done() {
                break;
            }
        }

        for snapshot in reassembler.finish() {
            self.transcript.apply_reply(&snapshot);
            render(&self.transcript);
        }

        Ok(reassembler.content().to_string())
    }
}
