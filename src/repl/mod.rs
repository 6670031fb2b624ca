//! Interactive shell for Mirror
//!
//! Provides:
//! - A password gate in front of the chat
//! - Readline input with history and slash-command completion
//! - Multi-line input via trailing `\`
//! - Streaming reply display

pub mod colors;
mod helper;
mod streaming;

use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use std::io::{self, BufRead, IsTerminal};

use crate::client::{ChatSession, RelayClient, SendOutcome};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::gate::{self, Gate};
use crate::types::Role;

use colors::ansi::*;
use helper::MirrorHelper;
pub use streaming::ReplyPrinter;

/// Shown when the conversation is empty
pub const WELCOME: &str = "Look here long enough and you'll start to remember.";

/// Header subtitle of the chat surface
pub const TAGLINE: &str = "The reflection that speaks truth";

/// What a submitted line asks the shell to do
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Help,
    Clear,
    Transcript,
    Quit,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    /// Parse a slash command; `None` means the line is a chat message
    pub fn parse(line: &'a str) -> Option<Self> {
        let word = line.trim().split_whitespace().next()?;
        if !word.starts_with('/') {
            return None;
        }
        Some(match word {
            "/help" => Command::Help,
            "/clear" => Command::Clear,
            "/transcript" => Command::Transcript,
            "/quit" | "/exit" => Command::Quit,
            other => Command::Unknown(other),
        })
    }
}

/// Run the gated chat shell
pub async fn run(config: ClientConfig) -> Result<()> {
    println!();
    println!("  {}", colors::title(gate::TITLE));
    println!("  {}", colors::subtitle(gate::SUBTITLE));
    println!();

    let mut gate = Gate::new(config.password.clone());
    if !unlock(&mut gate)? {
        println!("Goodbye!");
        return Ok(());
    }

    let client = RelayClient::new(&config);

    println!("{}", colors::separator(50));
    println!("{}", colors::banner_line("Me", TAGLINE));
    println!("{}", colors::banner_line("Relay", client.url()));
    println!("{}", colors::separator(50));
    println!();

    let mut repl = Repl::new(ChatSession::new(client))?;
    repl.run().await
}

/// Ask for the password until it matches or input ends
fn unlock(gate: &mut Gate) -> Result<bool> {
    let interactive = io::stdin().is_terminal();

    while !gate.is_authenticated() {
        let candidate = if interactive {
            match dialoguer::Password::new()
                .with_prompt("Password")
                .allow_empty_password(true)
                .interact()
            {
                Ok(pw) => pw,
                Err(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::Interrupted => {
                    return Ok(false);
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            let mut line = String::new();
            if io::stdin().lock().read_line(&mut line)? == 0 {
                return Ok(false);
            }
            line.trim_end_matches(['\r', '\n']).to_string()
        };

        gate.edit();
        if !gate.submit(candidate) {
            println!("  {}", colors::error(gate::INCORRECT));
        }
    }

    tracing::debug!("Gate opened");
    Ok(true)
}

/// REPL state
pub struct Repl {
    /// Readline editor with completion; history lives only for this session
    editor: Editor<MirrorHelper, DefaultHistory>,
    session: ChatSession<RelayClient>,
}

impl Repl {
    pub fn new(session: ChatSession<RelayClient>) -> Result<Self> {
        let mut editor = Editor::new()?;
        editor.set_helper(Some(MirrorHelper::new()));
        Ok(Self { editor, session })
    }

    /// Run the REPL loop
    pub async fn run(&mut self) -> Result<()> {
        println!("{}", colors::status("Type your message (Ctrl+D to exit, /help for commands)"));
        println!("{}", colors::status("  End a line with \\ to continue on the next one"));
        println!();
        println!("  {}{}{}", ITALIC, WELCOME, RESET);
        println!();

        while let Some(line) = self.read_input()? {
            if line.trim().is_empty() {
                continue;
            }
            self.editor.add_history_entry(line.as_str())?;

            match Command::parse(&line) {
                Some(Command::Quit) => break,
                Some(command) => self.handle_command(command),
                None => self.process_input(&line).await,
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// One round trip, rendered as it streams
    async fn process_input(&mut self, input: &str) {
        let mut printer = ReplyPrinter::stdout();
        let result = self.session.send(input, |t| printer.render(t)).await;
        printer.finish();

        match result {
            Ok(SendOutcome::Replied(reply)) => {
                tracing::debug!(chars = reply.len(), "Reply complete");
            }
            Ok(SendOutcome::Ignored) => {}
            Err(e) => {
                println!("{}", colors::error(e.notice()));
                println!();
            }
        }
    }

    fn handle_command(&mut self, command: Command<'_>) {
        match command {
            Command::Help => {
                println!("Commands:");
                println!("  /help              - Show this help");
                println!("  /clear             - Start a fresh conversation");
                println!("  /transcript        - Show the conversation so far");
                println!("  /quit              - Exit");
            }
            Command::Clear => {
                self.session.reset();
                println!("Conversation cleared.");
                println!();
                println!("  {}{}{}", ITALIC, WELCOME, RESET);
            }
            Command::Transcript => {
                let transcript = self.session.transcript();
                if transcript.is_empty() {
                    println!("{}", colors::status("(empty)"));
                }
                for message in transcript.messages() {
                    let label = match message.role {
                        Role::User => format!("{}you{}", BOLD, RESET),
                        Role::Assistant => format!("{}me{}", MAGENTA, RESET),
                    };
                    println!("{}  {}", label, message.content);
                }
            }
            Command::Unknown(cmd) => {
                println!("{}", colors::warning(&format!("Unknown command: {} (try /help)", cmd)));
            }
            Command::Quit => {}
        }
        println!();
    }

    /// Read input with backslash continuation
    fn read_input(&mut self) -> Result<Option<String>> {
        let first_line = match self.editor.readline(&colors::prompt()) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                return Ok(Some(String::new()));
            }
            Err(ReadlineError::Eof) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        if !first_line.trim_end().ends_with('\\') {
            return Ok(Some(first_line));
        }

        let mut lines = vec![strip_continuation(&first_line).to_string()];
        loop {
            match self.editor.readline(&colors::continuation_prompt()) {
                Ok(line) => {
                    if line.trim_end().ends_with('\\') {
                        lines.push(strip_continuation(&line).to_string());
                    } else {
                        lines.push(line);
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C (cancelled multi-line)");
                    return Ok(Some(String::new()));
                }
                Err(ReadlineError::Eof) => return Ok(None),
                Err(err) => return Err(err.into()),
            }
        }

        Ok(Some(lines.join("\n")))
    }
}

fn strip_continuation(line: &str) -> &str {
    let trimmed = line.trim_end();
    trimmed.strip_suffix('\\').unwrap_or(trimmed)
}
