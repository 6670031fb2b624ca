//! Chat-completion stream handling
//!
//! Turns the gateway's newline-delimited event stream back into a growing
//! assistant reply:
//! - [`records`] classifies single lines and extracts content deltas
//! - [`decoder`] decodes UTF-8 across chunk boundaries
//! - [`reassembler`] buffers, splits and accumulates
//! - [`transcript`] holds the conversation and the reply state machine

pub mod decoder;
pub mod reassembler;
pub mod records;
pub mod transcript;

pub use reassembler::StreamReassembler;
pub use records::{Record, DATA_PREFIX, DONE_SENTINEL};
pub use transcript::{ReplySlot, Transcript};
