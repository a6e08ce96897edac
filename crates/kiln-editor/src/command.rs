//! Command-line mode: the `:` prompt on the message line.
//!
//! Pressing `:` in normal mode opens the command line. Characters accumulate
//! after the marker, Backspace removes the last one (and leaves command mode
//! once nothing is left), Enter parses and runs it, Escape discards it.
//!
//! # Supported commands
//!
//! | Command           | Action                                   |
//! |-------------------|------------------------------------------|
//! | `:w`              | Save to the current path (prompt if none)|
//! | `:w <path>`       | Save to a specific path                  |
//! | `:q`              | Quit (refused while the buffer is dirty) |
//! | `:q!`             | Quit, discarding changes                 |
//! | `:wq`             | Save, then quit if the save succeeded    |
//! | `:set <args>`     | Options, see [`options`](crate::options) |

use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `:w`
    Write,

    /// `:w <path>`
    WriteAs(PathBuf),

    /// `:q`
    Quit,

    /// `:q!`
    ForceQuit,

    /// `:wq`
    WriteQuit,

    /// `:set <args>`, arguments unparsed.
    Set(String),

    /// Anything else. Holds the trimmed input for the error message.
    Unknown(String),
}

/// What running a command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Succeeded, with an optional status message.
    Ok(Option<String>),

    /// Failed. The message goes to the status line.
    Err(String),

    /// The editor should exit.
    Quit,
}

// ---------------------------------------------------------------------------
// CommandLine
// ---------------------------------------------------------------------------

/// The text typed after `:`. The marker itself is not stored; the view
/// draws it.
#[derive(Debug, Clone, Default)]
pub struct CommandLine {
    input: String,
}

impl CommandLine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            input: String::new(),
        }
    }

    /// The text typed so far, without the `:`.
    #[inline]
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    /// Append a character. Control characters are ignored.
    pub fn push(&mut self, ch: char) {
        if !ch.is_control() {
            self.input.push(ch);
        }
    }

    /// Remove the last character. Returns `false` when there was nothing to
    /// remove, which the editor takes as "leave command mode".
    pub fn backspace(&mut self) -> bool {
        self.input.pop().is_some()
    }

    pub fn clear(&mut self) {
        self.input.clear();
    }

    /// Parse the current input.
    #[must_use]
    pub fn parse(&self) -> Command {
        parse_command(&self.input)
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a command string (without the leading `:`).
#[must_use]
pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();

    let (cmd, arg) = trimmed
        .find(char::is_whitespace)
        .map_or((trimmed, ""), |pos| {
            (&trimmed[..pos], trimmed[pos..].trim_start())
        });

    match (cmd, arg.is_empty()) {
        ("w", true) => Command::Write,
        ("w", false) => Command::WriteAs(PathBuf::from(arg)),
        ("q", true) => Command::Quit,
        ("q!", true) => Command::ForceQuit,
        ("wq", true) => Command::WriteQuit,
        ("set" | "se", _) => Command::Set(arg.to_string()),
        _ => Command::Unknown(trimmed.to_string()),
    }
}
