// src/stream/records.rs
// Line classification for the chat-completion event stream

use serde_json::Value;

/// Prefix carried by every data record
pub const DATA_PREFIX: &str = "data: ";

/// Payload that marks the end of the stream
pub const DONE_SENTINEL: &str = "[DONE]";

/// One line of the stream, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record<'a> {
    /// Empty or whitespace-only separator
    Blank,
    /// `:`-prefixed keep-alive or comment
    Comment,
    /// Any line without the data prefix (`event:`, `id:`, ...)
    Ignored,
    /// Data record with its trimmed payload
    Data(&'a str),
    /// Terminal sentinel
    Done,
}

/// Classify a single line (without its `\n`).
///
/// One trailing `\r` is stripped first so CRLF streams behave like LF ones.
pub fn classify(line: &str) -> Record<'_> {
    let line = line.strip_suffix('\r').unwrap_or(line);

    if line.starts_with(':') {
        return Record::Comment;
    }
    if line.trim().is_empty() {
        return Record::Blank;
    }

    match line.strip_prefix(DATA_PREFIX) {
        Some(payload) => {
            let payload = payload.trim();
            if payload == DONE_SENTINEL {
                Record::Done
            } else {
                Record::Data(payload)
            }
        }
        None => Record::Ignored,
    }
}

/// Parse a data payload and pull out `choices[0].delta.content`.
///
/// A payload that is valid JSON but lacks the field yields `Ok(None)`.
/// Only a JSON syntax failure is an error, which the caller treats as a
/// record that has not fully arrived yet.
pub fn extract_delta(payload: &str) -> Result<Option<String>, serde_json::Error> {
    let value: Value = serde_json::from_str(payload)?;
    Ok(value
        .pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string))
}
