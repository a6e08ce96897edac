//! The editing session: one buffer, a cursor, and the modal key handler.
//!
//! [`Editor::handle_key`] is the only way keys get in. Each key is handled
//! completely (mode transition, buffer mutation, highlight cascade, cursor
//! clamp) before it returns, and the returned [`Action`] tells the event
//! loop whether to keep going.
//!
//! # Keys
//!
//! | Mode    | Key                   | Effect                                  |
//! |---------|-----------------------|-----------------------------------------|
//! | Normal  | `h` `j` `k` `l`, arrows | Move; `h`/`l` wrap across rows        |
//! | Normal  | `0` / Home, `$` / End | Row start / end                         |
//! | Normal  | `i` `I` `A`           | Insert here / at row start / at row end |
//! | Normal  | `o` `O`               | Open a row below / above, then insert   |
//! | Normal  | `x`                   | Delete the byte under the cursor        |
//! | Normal  | `:`                   | Command line                            |
//! | Normal  | Ctrl-S                | Save (prompts for a name if needed)     |
//! | Normal  | Ctrl-Q                | Quit; press twice if there are changes  |
//! | Insert  | text, Tab             | Insert                                  |
//! | Insert  | Enter                 | Split the row                           |
//! | Insert  | Backspace / Delete    | Delete before / under the cursor        |
//! | Insert  | Esc                   | Back to normal                          |
//!
//! Messages for the user (save results, warnings, unknown commands) go to a
//! single status message that the view draws under the status bar. A key
//! clears it unless the key itself produced a new one.

use std::path::PathBuf;

use kiln_term::event_loop::Action;
use kiln_term::input::{KeyCode, KeyEvent, Modifiers};
use tracing::{debug, info};

use crate::buffer::Buffer;
use crate::command::{Command, CommandLine, CommandResult};
use crate::mode::Mode;
use crate::options::Options;
use crate::position::Position;
use crate::storage::{FsStorage, Storage};

const UNSAVED_QUIT: &str = "WARNING: File has unsaved changes. Use :q! to force quit.";
const UNSAVED_CTRL_Q: &str = "WARNING: File has unsaved changes. Press Ctrl-Q again to quit.";

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

/// The "Save as: " prompt shown when saving a buffer that has no name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prompt {
    input: String,
    /// Quit after a successful save (the prompt came from `:wq`).
    quit_after: bool,
}

impl Prompt {
    pub const LABEL: &'static str = "Save as: ";

    #[inline]
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

// ---------------------------------------------------------------------------
// StatusLine
// ---------------------------------------------------------------------------

/// What the status bar shows. Line and column are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub name: Option<String>,
    pub dirty: bool,
    pub rows: usize,
    pub mode: Mode,
    pub filetype: Option<&'static str>,
    pub line: usize,
    pub col: usize,
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

pub struct Editor {
    buffer: Buffer,
    storage: Box<dyn Storage>,

    cursor: Position,
    /// Render column of the cursor, refreshed by [`scroll`](Self::scroll).
    rx: usize,
    row_offset: usize,
    col_offset: usize,

    mode: Mode,
    cmdline: CommandLine,
    prompt: Option<Prompt>,
    options: Options,

    message: Option<String>,
    message_is_error: bool,

    /// Ctrl-Q was pressed once on a dirty buffer.
    quit_armed: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// An empty session that reads and writes the real filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::with_storage(Box::new(FsStorage))
    }

    #[must_use]
    pub fn with_storage(storage: Box<dyn Storage>) -> Self {
        Self {
            buffer: Buffer::new(),
            storage,
            cursor: Position::ZERO,
            rx: 0,
            row_offset: 0,
            col_offset: 0,
            mode: Mode::Normal,
            cmdline: CommandLine::new(),
            prompt: None,
            options: Options::default(),
            message: None,
            message_is_error: false,
            quit_armed: false,
        }
    }

    /// Load `path` into the buffer. A file that doesn't exist yet still
    /// names the buffer, so the first save creates it. Other failures
    /// leave the buffer alone and report "Cannot open file".
    pub fn open(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        match self.buffer.load(self.storage.as_ref(), path.clone()) {
            Ok(()) => {
                self.cursor = Position::ZERO;
                self.clear_message();
            }
            Err(e) if e.is_not_found() => {
                self.buffer.set_path(path);
                self.set_message("New file");
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Position {
        self.cursor
    }

    /// Render column of the cursor as of the last [`scroll`](Self::scroll).
    #[inline]
    #[must_use]
    pub const fn rx(&self) -> usize {
        self.rx
    }

    #[inline]
    #[must_use]
    pub const fn row_offset(&self) -> usize {
        self.row_offset
    }

    #[inline]
    #[must_use]
    pub const fn col_offset(&self) -> usize {
        self.col_offset
    }

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub const fn command_line(&self) -> &CommandLine {
        &self.cmdline
    }

    /// The save-as prompt, while it is open.
    #[inline]
    #[must_use]
    pub const fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    #[inline]
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    #[inline]
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[inline]
    #[must_use]
    pub const fn message_is_error(&self) -> bool {
        self.message_is_error
    }

    #[must_use]
    pub fn status_line(&self) -> StatusLine {
        StatusLine {
            name: self.buffer.file_name(),
            dirty: self.buffer.is_dirty(),
            rows: self.buffer.len(),
            mode: self.mode,
            filetype: self.buffer.syntax().map(|s| s.name),
            line: self.cursor.row + 1,
            col: self.cursor.col + 1,
        }
    }

    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_is_error = false;
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_is_error = true;
    }

    pub fn clear_message(&mut self) {
        self.message = None;
        self.message_is_error = false;
    }

    // -----------------------------------------------------------------------
    // Viewport
    // -----------------------------------------------------------------------

    /// Adjust the offsets so the cursor is inside a `text_rows` by
    /// `text_cols` window. Horizontal offsets are in render columns.
    pub fn scroll(&mut self, text_rows: usize, text_cols: usize) {
        self.rx = self
            .buffer
            .row(self.cursor.row)
            .map_or(0, |row| row.cx_to_rx(self.cursor.col));

        if self.cursor.row < self.row_offset {
            self.row_offset = self.cursor.row;
        }
        if text_rows > 0 && self.cursor.row >= self.row_offset + text_rows {
            self.row_offset = self.cursor.row + 1 - text_rows;
        }
        if self.rx < self.col_offset {
            self.col_offset = self.rx;
        }
        if text_cols > 0 && self.rx >= self.col_offset + text_cols {
            self.col_offset = self.rx + 1 - text_cols;
        }
    }

    // -----------------------------------------------------------------------
    // Key dispatch
    // -----------------------------------------------------------------------

    /// Handle one key press.
    pub fn handle_key(&mut self, key: &KeyEvent) -> Action {
        if !key.is_ctrl('q') {
            self.quit_armed = false;
        }
        self.clear_message();

        let action = if self.prompt.is_some() {
            self.handle_prompt(key)
        } else {
            match self.mode {
                Mode::Normal => self.handle_normal(key),
                Mode::Insert => self.handle_insert(key),
                Mode::Command => self.handle_command(key),
            }
        };
        self.clamp_cursor();
        action
    }

    fn handle_normal(&mut self, key: &KeyEvent) -> Action {
        if key.is_ctrl('q') {
            return self.quit_guarded();
        }
        if key.is_ctrl('s') {
            return self.save(false);
        }
        if key.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT) {
            return Action::Continue;
        }

        match key.code {
            KeyCode::Char(':') => {
                self.cmdline.clear();
                self.mode = Mode::Command;
            }
            KeyCode::Char('i') => self.mode = Mode::Insert,
            KeyCode::Char('I') => {
                self.cursor.col = 0;
                self.mode = Mode::Insert;
            }
            KeyCode::Char('A') => {
                self.cursor.col = self.buffer.row_len(self.cursor.row);
                self.mode = Mode::Insert;
            }
            KeyCode::Char('o') => {
                let end = self.buffer.row_len(self.cursor.row);
                self.cursor = self.buffer.split_row(self.cursor.row, end);
                self.mode = Mode::Insert;
            }
            KeyCode::Char('O') => {
                self.buffer.insert_row(self.cursor.row, b"");
                self.cursor.col = 0;
                self.mode = Mode::Insert;
            }
            KeyCode::Char('x') => {
                self.buffer.delete_char_at(self.cursor.row, self.cursor.col);
            }
            code => self.move_cursor(code),
        }
        Action::Continue
    }

    fn handle_insert(&mut self, key: &KeyEvent) -> Action {
        if key.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT) {
            return Action::Continue;
        }

        match key.code {
            KeyCode::Escape => self.mode = Mode::Normal,
            KeyCode::Enter => {
                self.cursor = self.buffer.split_row(self.cursor.row, self.cursor.col);
            }
            KeyCode::Backspace => {
                if let Some(pos) = self.buffer.delete_char(self.cursor.row, self.cursor.col) {
                    self.cursor = pos;
                }
            }
            KeyCode::Delete => self.delete_forward(),
            KeyCode::Tab => self.insert_byte(b'\t'),
            // Single-byte model: only ASCII goes into the text.
            KeyCode::Char(ch) if ch.is_ascii() && !ch.is_ascii_control() => {
                if let Ok(b) = u8::try_from(ch) {
                    self.insert_byte(b);
                }
            }
            code => self.move_cursor(code),
        }
        Action::Continue
    }

    fn handle_command(&mut self, key: &KeyEvent) -> Action {
        match key.code {
            KeyCode::Escape => {
                self.cmdline.clear();
                self.mode = Mode::Normal;
            }
            KeyCode::Enter => {
                let cmd = self.cmdline.parse();
                self.cmdline.clear();
                self.mode = Mode::Normal;
                return self.execute_command(cmd);
            }
            KeyCode::Backspace => {
                if !self.cmdline.backspace() {
                    self.mode = Mode::Normal;
                }
            }
            KeyCode::Char(ch) if !key.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT) => {
                self.cmdline.push(ch);
            }
            _ => {}
        }
        Action::Continue
    }

    fn handle_prompt(&mut self, key: &KeyEvent) -> Action {
        let Some(prompt) = self.prompt.as_mut() else {
            return Action::Continue;
        };

        match key.code {
            KeyCode::Escape => {
                self.prompt = None;
                self.set_message("Save aborted");
            }
            KeyCode::Enter if !prompt.input.is_empty() => {
                let path = PathBuf::from(std::mem::take(&mut prompt.input));
                let quit_after = prompt.quit_after;
                self.prompt = None;
                let result = self.write_as(path);
                let saved = matches!(result, CommandResult::Ok(_));
                self.report(result);
                if saved && quit_after {
                    info!(target: "kiln::editor", "quit after save");
                    return Action::Quit;
                }
            }
            KeyCode::Backspace => {
                prompt.input.pop();
            }
            KeyCode::Char(ch)
                if !ch.is_control() && !key.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT) =>
            {
                prompt.input.push(ch);
            }
            _ => {}
        }
        Action::Continue
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    /// Insert at the cursor. On the empty line past the end, a row is
    /// created first.
    fn insert_byte(&mut self, b: u8) {
        if self.cursor.row == self.buffer.len() {
            self.buffer.insert_row(self.buffer.len(), b"");
        }
        self.buffer.insert_char(self.cursor.row, self.cursor.col, b);
        self.cursor.col += 1;
    }

    /// Delete under the cursor, joining the next row at the end of a row.
    fn delete_forward(&mut self) {
        let Position { row, col } = self.cursor;
        if col < self.buffer.row_len(row) {
            self.buffer.delete_char_at(row, col);
        } else if row + 1 < self.buffer.len() {
            self.buffer.delete_char(row + 1, 0);
        }
    }

    fn move_cursor(&mut self, code: KeyCode) {
        let Position { row, col } = self.cursor;
        let len = self.buffer.len();
        match code {
            KeyCode::Char('h') | KeyCode::Left => {
                if col > 0 {
                    self.cursor.col -= 1;
                } else if row > 0 {
                    self.cursor = Position::new(row - 1, self.buffer.row_len(row - 1));
                }
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if row < len {
                    if col < self.buffer.row_len(row) {
                        self.cursor.col += 1;
                    } else if row + 1 < len {
                        self.cursor = Position::new(row + 1, 0);
                    }
                }
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if row + 1 < len {
                    self.cursor.row += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.cursor.row = row.saturating_sub(1);
            }
            KeyCode::Char('0') | KeyCode::Home => self.cursor.col = 0,
            KeyCode::Char('$') | KeyCode::End => self.cursor.col = self.buffer.row_len(row),
            _ => {}
        }
    }

    /// Row into `[0, len]`, column into `[0, row length]`.
    fn clamp_cursor(&mut self) {
        self.cursor.row = self.cursor.row.min(self.buffer.len());
        self.cursor.col = self.cursor.col.min(self.buffer.row_len(self.cursor.row));
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    fn execute_command(&mut self, cmd: Command) -> Action {
        debug!(target: "kiln::command", command = ?cmd, "execute");
        match self.run_command(cmd) {
            CommandResult::Quit => Action::Quit,
            result => {
                self.report(result);
                Action::Continue
            }
        }
    }

    fn run_command(&mut self, cmd: Command) -> CommandResult {
        match cmd {
            Command::Write => self.cmd_write(false),
            Command::WriteAs(path) => self.write_as(path),
            Command::Quit => self.cmd_quit(),
            Command::ForceQuit => {
                info!(target: "kiln::editor", dirty = self.buffer.dirty(), "force quit");
                CommandResult::Quit
            }
            Command::WriteQuit => self.cmd_write(true),
            Command::Set(args) => match self.options.set(&args) {
                Ok(msg) => CommandResult::Ok(msg),
                Err(msg) => CommandResult::Err(msg),
            },
            Command::Unknown(input) if input.is_empty() => CommandResult::Ok(None),
            Command::Unknown(input) => CommandResult::Err(format!("Unknown command: {input}")),
        }
    }

    /// `:w` and `:wq`. An unnamed buffer opens the save-as prompt instead.
    fn cmd_write(&mut self, quit_after: bool) -> CommandResult {
        if self.buffer.path().is_none() {
            self.prompt = Some(Prompt {
                input: String::new(),
                quit_after,
            });
            return CommandResult::Ok(None);
        }
        match self.write() {
            CommandResult::Ok(_) if quit_after && !self.buffer.is_dirty() => CommandResult::Quit,
            result => result,
        }
    }

    /// `:q`. Refused while there are unsaved changes.
    fn cmd_quit(&self) -> CommandResult {
        if self.buffer.is_dirty() {
            info!(target: "kiln::editor", dirty = self.buffer.dirty(), "quit refused");
            CommandResult::Err(UNSAVED_QUIT.to_string())
        } else {
            CommandResult::Quit
        }
    }

    fn write(&mut self) -> CommandResult {
        match self.buffer.save(self.storage.as_mut()) {
            Ok(bytes) => CommandResult::Ok(Some(format!("{bytes} bytes written to disk"))),
            Err(e) => CommandResult::Err(e.to_string()),
        }
    }

    fn write_as(&mut self, path: PathBuf) -> CommandResult {
        match self.buffer.save_as(self.storage.as_mut(), path) {
            Ok(bytes) => CommandResult::Ok(Some(format!("{bytes} bytes written to disk"))),
            Err(e) => CommandResult::Err(e.to_string()),
        }
    }

    /// Ctrl-S.
    fn save(&mut self, quit_after: bool) -> Action {
        match self.cmd_write(quit_after) {
            CommandResult::Quit => Action::Quit,
            result => {
                self.report(result);
                Action::Continue
            }
        }
    }

    /// Ctrl-Q. A dirty buffer needs two presses in a row.
    fn quit_guarded(&mut self) -> Action {
        if self.buffer.is_dirty() && !self.quit_armed {
            self.quit_armed = true;
            info!(target: "kiln::editor", dirty = self.buffer.dirty(), "quit armed");
            self.set_error(UNSAVED_CTRL_Q);
            return Action::Continue;
        }
        info!(target: "kiln::editor", dirty = self.buffer.is_dirty(), "quit");
        Action::Quit
    }

    fn report(&mut self, result: CommandResult) {
        match result {
            CommandResult::Ok(Some(msg)) => self.set_message(msg),
            CommandResult::Err(msg) => self.set_error(msg),
            CommandResult::Ok(None) | CommandResult::Quit => {}
        }
    }
}
