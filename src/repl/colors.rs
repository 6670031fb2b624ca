//! ANSI color helpers for terminal output

/// ANSI escape codes
pub mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const ITALIC: &str = "\x1b[3m";

    pub const RED: &str = "\x1b[31m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const MAGENTA: &str = "\x1b[35m";
    pub const GRAY: &str = "\x1b[90m";

    /// Carriage return plus erase line
    pub const CLEAR_LINE: &str = "\r\x1b[2K";
}

use ansi::*;

/// Format an error message (red)
pub fn error(msg: &str) -> String {
    format!("{}{}{}", RED, msg, RESET)
}

/// Format a warning message (yellow)
pub fn warning(msg: &str) -> String {
    format!("{}{}{}", YELLOW, msg, RESET)
}

/// Format a status/info message (gray)
pub fn status(msg: &str) -> String {
    format!("{}{}{}", GRAY, msg, RESET)
}

/// Format the big title
pub fn title(text: &str) -> String {
    format!("{}{}{}{}", BOLD, MAGENTA, text, RESET)
}

/// Format a muted subtitle
pub fn subtitle(text: &str) -> String {
    format!("{}{}{}{}", DIM, ITALIC, text, RESET)
}

/// The chat prompt
pub fn prompt() -> String {
    format!("{}{}>>> {}", BOLD, MAGENTA, RESET)
}

/// Continuation prompt for multi-line input
pub fn continuation_prompt() -> String {
    format!("{}{}... {}", BOLD, MAGENTA, RESET)
}

/// Pending-reply indicator
pub fn thinking() -> String {
    format!("{}  · · ·{}", DIM, RESET)
}

/// Format a horizontal separator
pub fn separator(width: usize) -> String {
    format!("{}{}{}", DIM, "─".repeat(width), RESET)
}

/// Format startup banner line
pub fn banner_line(label: &str, value: &str) -> String {
    format!("{}{:<10}{} {}", DIM, label, RESET, value)
}
