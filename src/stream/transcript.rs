// src/stream/transcript.rs
// In-memory conversation with an explicit reply state machine

use crate::types::{Message, Role};

/// Where the in-flight assistant reply stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplySlot {
    /// No round trip in progress
    #[default]
    Idle,
    /// Round trip started, no content yet
    Awaiting,
    /// Assistant entry exists at `index` (always the last entry)
    Open { index: usize },
}

/// Volatile, append-only conversation for one session
///
/// Only the last entry may change, and only while a reply is open. An open
/// reply is updated by overwriting the entry with a fresh [`Message`] built
/// from the accumulated content.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    slot: ReplySlot,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
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

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn slot(&self) -> ReplySlot {
        self.slot
    }

    /// Append the user's message and start waiting for a reply
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.end_reply();
        self.messages.push(Message::user(content));
        self.slot = ReplySlot::Awaiting;
    }

    /// Show the accumulated reply: opens the assistant entry on first content,
    /// overwrites it afterwards
    pub fn apply_reply(&mut self, content: &str) {
        match self.slot {
            ReplySlot::Open { index } => {
                self.messages[index] = Message::assistant(content);
            }
            ReplySlot::Idle | ReplySlot::Awaiting => {
                self.messages.push(Message::assistant(content));
                self.slot = ReplySlot::Open {
                    index: self.messages.len() - 1,
                };
            }
        }
    }

    /// Close the reply; the entry becomes immutable
    pub fn end_reply(&mut self) {
        self.slot = ReplySlot::Idle;
    }

    /// Drop a partially streamed reply and close the slot
    pub fn discard_reply(&mut self) -> Option<Message> {
        let removed = match self.slot {
            ReplySlot::Open { index } if index + 1 == self.messages.len() => self.messages.pop(),
            _ => None,
        };
        self.slot = ReplySlot::Idle;
        removed
    }

    /// Undo the optimistic user entry of a failed round trip
    pub fn rollback(&mut self) -> Option<Message> {
        self.discard_reply();
        match self.messages.last() {
            Some(last) if last.role == Role::User => self.messages.pop(),
            _ => None,
        }
    }

    /// Whether a reply is being waited on without any content yet
    pub fn is_awaiting(&self) -> bool {
        self.slot == ReplySlot::Awaiting
    }
}
