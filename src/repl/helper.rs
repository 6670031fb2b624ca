//! Rustyline helper for the chat prompt with slash-command completion

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use std::borrow::Cow;

use super::colors::ansi::{DIM, RESET};

/// Slash commands for tab completion
pub const SLASH_COMMANDS: &[&str] = &["/help", "/clear", "/transcript", "/quit", "/exit"];

/// Custom helper for rustyline with completion and hints
pub struct MirrorHelper {
    hinter: HistoryHinter,
}

impl MirrorHelper {
    pub fn new() -> Self {
        Self {
            hinter: HistoryHinter::new(),
        }
    }
}

impl Default for MirrorHelper {
    fn default() -> Self {
        Self::new()
    }
}

/// Slash commands starting with the typed word
pub fn complete_command(line: &str) -> Vec<&'static str> {
    let word = line.split_whitespace().next().unwrap_or("");
    SLASH_COMMANDS
        .iter()
        .copied()
        .filter(|cmd| cmd.starts_with(word))
        .collect()
}

impl Completer for MirrorHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        // Only complete slash commands at the start of the line
        if line.starts_with('/') && pos <= line.find(' ').unwrap_or(line.len()) {
            let matches = complete_command(line)
                .into_iter()
                .map(|cmd| Pair {
                    display: cmd.to_string(),
                    replacement: cmd.to_string(),
                })
                .collect();
            Ok((0, matches))
        } else {
            Ok((pos, vec![]))
        }
    }
}

/// Rest of the only slash command the typed word can still become
pub fn command_hint(line: &str) -> Option<&'static str> {
    if !line.starts_with('/') || line.contains(char::is_whitespace) {
        return None;
    }
    match complete_command(line).as_slice() {
        &[only] if only.len() > line.len() => Some(&only[line.len()..]),
        _ => None,
    }
}

impl Hinter for MirrorHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        if line.starts_with('/') {
            command_hint(line).map(str::to_string)
        } else if line.trim_end().ends_with('\\') {
            // Mid multi-line message; earlier messages are no help here
            None
        } else {
            self.hinter.hint(line, pos, ctx)
        }
    }
}

impl Highlighter for MirrorHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("{}{}{}", DIM, hint, RESET))
    }
}

impl Validator for MirrorHelper {}

impl Helper for MirrorHelper {}
