//! The three editing modes.
//!
//! | Mode    | Cursor shape | Cursor limit        | Keys do            |
//! |---------|--------------|---------------------|--------------------|
//! | Normal  | Block        | `0..=row_len`       | motions, commands  |
//! | Insert  | Bar          | `0..=row_len`       | type text          |
//! | Command | Bar          | (in command line)   | build a `:` line   |
//!
//! The single-byte model lets the cursor sit one past the last byte in every
//! mode, so `A` and `$` land on the same column.

use std::fmt;

use kiln_term::ansi::CursorShape;

/// The current editing mode. Pure data; key handling lives in
/// [`Editor`](crate::editor::Editor).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Keys are commands.
    #[default]
    Normal,
    /// Keys produce bytes in the buffer.
    Insert,
    /// Keys build the `:` command line.
    Command,
}

impl Mode {
    /// Name shown in the status bar.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
            Self::Command => "COMMAND",
        }
    }

    #[must_use]
    pub const fn cursor_shape(self) -> CursorShape {
        match self {
            Self::Normal => CursorShape::SteadyBlock,
            Self::Insert | Self::Command => CursorShape::SteadyBar,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_normal() {
        assert_eq!(Mode::default(), Mode::Normal);
    }

    #[test]
    fn display_names() {
        assert_eq!(Mode::Normal.display_name(), "NORMAL");
        assert_eq!(Mode::Insert.display_name(), "INSERT");
        assert_eq!(Mode::Command.display_name(), "COMMAND");
        assert_eq!(Mode::Insert.to_string(), "INSERT");
    }

    #[test]
    fn cursor_shapes() {
        assert_eq!(Mode::Normal.cursor_shape(), CursorShape::SteadyBlock);
        assert_eq!(Mode::Insert.cursor_shape(), CursorShape::SteadyBar);
        assert_eq!(Mode::Command.cursor_shape(), CursorShape::SteadyBar);
    }
}
