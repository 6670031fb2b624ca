//! Incremental terminal rendering of a streamed reply

use std::io::{self, Write};

use crate::stream::{ReplySlot, Transcript};

use super::colors::{self, ansi::CLEAR_LINE};

/// Renders transcript updates for one round trip.
///
/// Shows a pending indicator while the slot is awaiting, then prints only
/// the newly appended part of the open assistant entry on each update.
pub struct ReplyPrinter<W: Write> {
    out: W,
    printed: usize,
    indicator: bool,
    started: bool,
}

impl ReplyPrinter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ReplyPrinter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: 0,
            indicator: false,
            started: false,
        }
    }

    /// Render callback for [`ChatSession::send`](crate::client::ChatSession::send)
    pub fn render(&mut self, transcript: &Transcript) {
        let _ = self.try_render(transcript);
    }

    fn try_render(&mut self, transcript: &Transcript) -> io::Result<()> {
        match transcript.slot() {
            ReplySlot::Awaiting => {
                if !self.indicator && !self.started {
                    write!(self.out, "\n{}", colors::thinking())?;
                    self.indicator = true;
                }
            }
            ReplySlot::Open { index } => {
                let content = transcript
                    .messages()
                    .get(index)
                    .map(|m| m.content.as_str())
                    .unwrap_or("");
                if self.indicator {
                    write!(self.out, "{}", CLEAR_LINE)?;
                    self.indicator = false;
                }
                self.started = true;
                // content only ever grows by appending, so this stays on a char boundary
                write!(self.out, "{}", content.get(self.printed..).unwrap_or(""))?;
                self.printed = content.len();
            }
            ReplySlot::Idle => self.clear_indicator()?,
        }
        self.out.flush()
    }

    /// End the round trip's output
    pub fn finish(&mut self) {
        let _ = self.clear_indicator();
        if self.started {
            let _ = writeln!(self.out);
            let _ = writeln!(self.out);
        }
        let _ = self.out.flush();
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn clear_indicator(&mut self) -> io::Result<()> {
        if self.indicator {
            write!(self.out, "{}", CLEAR_LINE)?;
            self.indicator = false;
        }
        Ok(())
    }
}
