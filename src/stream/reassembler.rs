// src/stream/reassembler.rs
// Rebuilds the assistant reply from a chunked event stream

use super::decoder::Utf8Decoder;
use super::records::{classify, extract_delta, Record};

/// Stream reassembler with put-back buffering
///
/// Feeds raw transport chunks through an incremental UTF-8 decoder into a
/// line buffer, classifies each complete line, and accumulates the content
/// deltas in arrival order. Every [`push`](Self::push) returns one snapshot
/// of the accumulated reply per delta it extracted, so a caller can
/// re-render after each fragment.
///
/// # Example
/// ```
/// use mirror::stream::StreamReassembler;
///
/// let mut stream = StreamReassembler::new();
/// stream.push(b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n");
/// stream.push(b"data: [DONE]\n");
/// stream.finish();
/// assert_eq!(stream.content(), "Hi");
/// ```
#[derive(Debug, Default)]
pub struct StreamReassembler {
    decoder: Utf8Decoder,
    buffer: String,
    content: String,
    /// A complete line failed to parse and was put back; hold off until more bytes land
    stalled: bool,
    done: bool,
}

impl StreamReassembler {
    /// Largest record we are willing to hold back waiting for its remainder
    pub const MAX_INCOMPLETE_RECORD: usize = 64 * 1024;

    pub fn new() -> Self {
        Self::default()
    }

    /// Push one transport chunk.
    ///
    /// Returns the accumulated content after each newly extracted delta.
    /// Once the terminal sentinel has been seen, further bytes are ignored.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        if self.done {
            return Vec::new();
        }

        let text = self.decoder.decode(chunk);
        if text.is_empty() {
            return Vec::new();
        }
        self.buffer.push_str(&text);
        self.stalled = false;

        let mut snapshots = Vec::new();
        self.drain_lines(&mut snapshots);
        self.enforce_limit();
        snapshots
    }

    /// Run the final pass at transport end-of-stream.
    ///
    /// Every remaining line is classified once more. Nothing can complete a
    /// fragment any more, so payloads that fail to parse are dropped.
    pub fn finish(&mut self) -> Vec<String> {
        let tail = self.decoder.finish();
        self.buffer.push_str(&tail);
        let remaining = std::mem::take(&mut self.buffer);
        self.stalled = false;

        let mut snapshots = Vec::new();
        if self.done || remaining.trim().is_empty() {
            return snapshots;
        }

        for line in remaining.split('\n') {
            match classify(line) {
                Record::Done => {
                    self.done = true;
                    break;
                }
                Record::Data(payload) => match extract_delta(payload) {
                    Ok(Some(delta)) => snapshots.push(self.append(&delta)),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::debug!("Dropping unparseable trailing record: {}", e);
                    }
                },
                Record::Blank | Record::Comment | Record::Ignored => {}
            }
        }

        snapshots
    }

    /// Reply accumulated so far
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whether the terminal sentinel has been seen
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Bytes currently waiting for a line terminator or a put-back retry
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    fn append(&mut self, delta: &str) -> String {
        self.content.push_str(delta);
        self.content.clone()
    }

    /// Consume every complete line, compacting the buffer once at the end.
    ///
    /// A data line that fails to parse is held in place until more bytes
    /// arrive, unless the held data already exceeds the limit; then it is
    /// dropped and extraction moves on.
    fn drain_lines(&mut self, snapshots: &mut Vec<String>) {
        let mut consumed = 0;
        let mut dropped = 0usize;

        while !self.done && !self.stalled {
            let Some(pos) = self.buffer[consumed..].find('\n') else {
                break;
            };
            let line = &self.buffer[consumed..consumed + pos];

            let parsed = match classify(line) {
                Record::Blank | Record::Comment | Record::Ignored => {
                    consumed += pos + 1;
                    continue;
                }
                Record::Done => {
                    self.done = true;
                    consumed += pos + 1;
                    continue;
                }
                Record::Data(payload) => extract_delta(payload),
            };

            match parsed {
                Ok(Some(delta)) => {
                    self.content.push_str(&delta);
                    snapshots.push(self.content.clone());
                    consumed += pos + 1;
                }
                Ok(None) => consumed += pos + 1,
                Err(_) if self.buffer.len() - consumed > Self::MAX_INCOMPLETE_RECORD => {
                    dropped += 1;
                    consumed += pos + 1;
                }
                // Looks like a record cut mid-payload: leave it and wait
                Err(_) => self.stalled = true,
            }
        }

        self.buffer.drain(..consumed);

        if dropped > 0 {
            tracing::warn!(
                dropped,
                "Dropped stalled stream records after {}KB of buffered data",
                Self::MAX_INCOMPLETE_RECORD / 1024
            );
        }
    }

    /// Bound how much an unterminated record may hold
    fn enforce_limit(&mut self) {
        if self.done || self.stalled || self.buffer.len() <= Self::MAX_INCOMPLETE_RECORD {
            return;
        }

        tracing::warn!(
            "Stream record exceeded {}KB without a line break, discarding",
            Self::MAX_INCOMPLETE_RECORD / 1024
        );
        self.buffer.clear();
    }
}
