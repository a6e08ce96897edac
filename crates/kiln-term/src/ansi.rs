// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions writing escape sequences to any `impl Write`. The diff
// renderer decides when to emit; this module only knows the encodings.
// Coordinates are 0-indexed here and converted to the terminal's 1-based
// convention on output.

use std::io::{self, Write};

use crate::cell::Attr;
use crate::color::Color;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` (CUP).
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

/// Cursor shapes (DECSCUSR).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorShape {
    /// Whatever the user's terminal is configured for.
    Default,
    SteadyBlock,
    SteadyUnderline,
    SteadyBar,
}

/// Set the cursor shape.
pub fn set_cursor_shape(w: &mut impl Write, shape: CursorShape) -> io::Result<()> {
    let code = match shape {
        CursorShape::Default => 0,
        CursorShape::SteadyBlock => 2,
        CursorShape::SteadyUnderline => 4,
        CursorShape::SteadyBar => 6,
    };
    write!(w, "\x1b[{code} q")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Reset every SGR attribute (SGR 0). Callers tracking style state must
/// invalidate it afterwards.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

/// Enter the alternate screen (DEC 1049).
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Leave the alternate screen and restore the original content.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

/// Begin synchronized output (DEC 2026). Terminals without support ignore it.
#[inline]
pub fn begin_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026h")
}

/// End synchronized output.
#[inline]
pub fn end_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026l")
}

// ─── Color ───────────────────────────────────────────────────────────────────

/// Set the foreground color. Standard and bright colors use the compact
/// 30–37 / 90–97 codes, the rest the 256-color form.
pub fn fg(w: &mut impl Write, color: Color) -> io::Result<()> {
    match color {
        Color::Default => w.write_all(b"\x1b[39m"),
        Color::Ansi(idx) if idx < 8 => write!(w, "\x1b[{}m", 30 + u16::from(idx)),
        Color::Ansi(idx) if idx < 16 => write!(w, "\x1b[{}m", 82 + u16::from(idx)),
        Color::Ansi(idx) => write!(w, "\x1b[38;5;{idx}m"),
    }
}

/// Set the background color (40–47, 100–107, 48;5;N).
pub fn bg(w: &mut impl Write, color: Color) -> io::Result<()> {
    match color {
        Color::Default => w.write_all(b"\x1b[49m"),
        Color::Ansi(idx) if idx < 8 => write!(w, "\x1b[{}m", 40 + u16::from(idx)),
        Color::Ansi(idx) if idx < 16 => write!(w, "\x1b[{}m", 92 + u16::from(idx)),
        Color::Ansi(idx) => write!(w, "\x1b[48;5;{idx}m"),
    }
}

/// Emit the SGR codes for `attr` as one CSI sequence. No-op when empty.
pub fn attrs(w: &mut impl Write, attr: Attr) -> io::Result<()> {
    if attr.is_empty() {
        return Ok(());
    }

    let codes: Vec<&str> = [
        (Attr::BOLD, "1"),
        (Attr::DIM, "2"),
        (Attr::UNDERLINE, "4"),
        (Attr::INVERSE, "7"),
    ]
    .iter()
    .filter(|(flag, _)| attr.contains(*flag))
    .map(|(_, code)| *code)
    .collect();

    write!(w, "\x1b[{}m", codes.join(";"))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
