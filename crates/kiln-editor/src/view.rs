//! View: paints an [`Editor`] into a kiln-term [`FrameBuffer`].
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │    1 |int main(void) {               │  text area, h - 2 rows
//! │    2 |    return 0;                  │  (6-column gutter when
//! │    3 |}                              │   line numbers are on)
//! │      |                               │
//! ├──────────────────────────────────────┤
//! │ main.c - 3 lines [NORMAL]   c | 1,1  │  status bar (inverse)
//! ├──────────────────────────────────────┤
//! │ 42 bytes written to disk             │  message / command line
//! └──────────────────────────────────────┘
//! ```
//!
//! Rows are drawn from their render bytes, one cell per byte, coloured by
//! highlight tag. The view only reads the editor, apart from asking it to
//! [`scroll`](Editor::scroll) for the current window size.

use kiln_term::cell::{Attr, Cell};
use kiln_term::color::Color;
use kiln_term::frame::FrameBuffer;

use crate::editor::{Editor, Prompt, StatusLine};
use crate::highlight::Tag;
use crate::mode::Mode;
use crate::row::Row;

/// Width of the line-number gutter: `%4d ` plus the `|` separator.
pub const GUTTER_WIDTH: u16 = 6;

/// Longest file name shown in the status bar.
const STATUS_NAME_MAX: usize = 20;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Gutter width for this editor: 0 when numbers are off or the buffer is
/// empty.
#[must_use]
pub fn gutter_width(editor: &Editor) -> u16 {
    if editor.options().number && !editor.buffer().is_empty() {
        GUTTER_WIDTH
    } else {
        0
    }
}

/// Foreground colour for a highlight tag.
#[must_use]
pub const fn tag_color(tag: Tag) -> Color {
    match tag {
        Tag::Default => Color::Default,
        Tag::Comment => Color::BLUE,
        Tag::Keyword | Tag::Operator => Color::MAGENTA,
        Tag::Type | Tag::String => Color::GREEN,
        Tag::Control | Tag::Boolean => Color::YELLOW,
        Tag::Number => Color::CYAN,
        Tag::Match => Color::RED,
    }
}

/// The welcome line shown in an empty buffer.
#[must_use]
pub fn welcome() -> String {
    format!("kiln editor -- version {}", env!("CARGO_PKG_VERSION"))
}

/// Left and right halves of the status bar.
#[must_use]
pub fn status_text(status: &StatusLine) -> (String, String) {
    let name: String = status
        .name
        .as_deref()
        .unwrap_or("[No Name]")
        .chars()
        .take(STATUS_NAME_MAX)
        .collect();
    let modified = if status.dirty { " (modified)" } else { "" };
    let left = format!(
        "{name}{modified} - {} lines [{}]",
        status.rows,
        status.mode.display_name()
    );
    let right = format!(
        "{} | {},{}",
        status.filetype.unwrap_or("no ft"),
        status.line,
        status.col
    );
    (left, right)
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Screen cell for one render byte. Control bytes show as inverse `^X`
/// letters, the C1 range and DEL as an inverse `?`.
fn byte_cell(b: u8, fg: Color) -> Cell {
    match b {
        0x00..=0x1F => Cell::styled(char::from(b'@' + b), Color::Default, Color::Default, Attr::INVERSE),
        0x7F..=0x9F => Cell::styled('?', Color::Default, Color::Default, Attr::INVERSE),
        _ => Cell::styled(char::from(b), fg, Color::Default, Attr::empty()),
    }
}

// ---------------------------------------------------------------------------
// Render
// ---------------------------------------------------------------------------

/// Paint the whole editor into `frame` and return where the hardware
/// cursor belongs, if it is on screen.
pub fn render(editor: &mut Editor, frame: &mut FrameBuffer) -> Option<(u16, u16)> {
    let width = frame.width();
    let height = frame.height();
    let text_rows = height.saturating_sub(2);
    let gutter = gutter_width(editor).min(width);
    let text_cols = width - gutter;

    editor.scroll(usize::from(text_rows), usize::from(text_cols));

    for y in 0..text_rows {
        draw_text_row(editor, frame, y, gutter, text_rows);
    }
    if height >= 2 {
        draw_status_bar(frame, &editor.status_line(), text_rows);
    }
    if height >= 1 {
        if let Some(at) = draw_message_line(editor, frame, height - 1) {
            return Some(at);
        }
    }

    let cursor = editor.cursor();
    let y = cursor.row.checked_sub(editor.row_offset())?;
    let x = editor.rx().checked_sub(editor.col_offset())?;
    if y >= usize::from(text_rows) || x >= usize::from(text_cols) {
        return None;
    }
    Some((gutter + to_u16(x), to_u16(y)))
}

fn draw_text_row(editor: &Editor, frame: &mut FrameBuffer, y: u16, gutter: u16, text_rows: u16) {
    let buffer = editor.buffer();
    let filerow = usize::from(y) + editor.row_offset();

    if gutter > 0 {
        if filerow < buffer.len() {
            let num = format!("{:4} ", filerow + 1);
            frame.paint_text(0, y, &num, Color::BLACK, Color::WHITE, Attr::empty());
        }
        frame.set(gutter - 1, y, Cell::new('|'));
    }

    match buffer.row(filerow) {
        Some(row) => draw_row_bytes(frame, row, y, gutter, editor.col_offset()),
        None if buffer.is_empty() && y == text_rows / 3 => {
            draw_welcome(frame, y, gutter, editor.options().number);
        }
        None if !editor.options().number => frame.set(0, y, Cell::new('~')),
        None => {}
    }
}

fn draw_row_bytes(frame: &mut FrameBuffer, row: &Row, y: u16, gutter: u16, col_offset: usize) {
    let cols = usize::from(frame.width() - gutter);
    let visible = row
        .render()
        .iter()
        .zip(row.highlight())
        .skip(col_offset)
        .take(cols);
    for (x, (&b, &tag)) in (gutter..).zip(visible) {
        frame.set(x, y, byte_cell(b, tag_color(tag)));
    }
}

fn draw_welcome(frame: &mut FrameBuffer, y: u16, gutter: u16, numbers: bool) {
    let cols = usize::from(frame.width() - gutter);
    let text = welcome();
    let len = text.len().min(cols);
    let padding = (cols - len) / 2;
    if padding > 0 && !numbers {
        frame.set(0, y, Cell::new('~'));
    }
    frame.paint_text(
        gutter + to_u16(padding),
        y,
        &text[..len],
        Color::Default,
        Color::Default,
        Attr::empty(),
    );
}

fn draw_status_bar(frame: &mut FrameBuffer, status: &StatusLine, y: u16) {
    let width = frame.width();
    let bar = Cell::styled(' ', Color::Default, Color::Default, Attr::INVERSE);
    frame.fill_row(y, bar);

    let (left, right) = status_text(status);
    let right_start = width.saturating_sub(to_u16(right.len()));
    let left: String = left.chars().take(usize::from(right_start)).collect();

    frame.paint_text(0, y, &left, Color::Default, Color::Default, Attr::INVERSE);
    frame.paint_text(right_start, y, &right, Color::Default, Color::Default, Attr::INVERSE);
}

/// The bottom line. Returns the cursor position when the prompt or the
/// command line owns the cursor.
fn draw_message_line(editor: &Editor, frame: &mut FrameBuffer, y: u16) -> Option<(u16, u16)> {
    if let Some(prompt) = editor.prompt() {
        let text = format!("{}{}", Prompt::LABEL, prompt.input());
        let end = frame.paint_text(0, y, &text, Color::Default, Color::Default, Attr::empty());
        return Some((end.min(frame.width().saturating_sub(1)), y));
    }
    if editor.mode() == Mode::Command {
        let text = format!(":{}", editor.command_line().input());
        let end = frame.paint_text(0, y, &text, Color::Default, Color::Default, Attr::empty());
        return Some((end.min(frame.width().saturating_sub(1)), y));
    }
    if let Some(msg) = editor.message() {
        let fg = if editor.message_is_error() {
            Color::RED
        } else {
            Color::YELLOW
        };
        frame.paint_text(0, y, msg, fg, Color::Default, Attr::empty());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use kiln_term::input::{KeyCode, KeyEvent};
    use pretty_assertions::assert_eq;

    fn editor_with_file(name: &str, text: &str) -> Editor {
        let mut e = Editor::with_storage(Box::new(MemoryStorage::with_file(name, text)));
        e.open(name);
        e
    }

    fn keys(editor: &mut Editor, text: &str) {
        for ch in text.chars() {
            editor.handle_key(&KeyEvent::plain(KeyCode::Char(ch)));
        }
    }

    fn paint(editor: &mut Editor, w: u16, h: u16) -> (FrameBuffer, Option<(u16, u16)>) {
        let mut frame = FrameBuffer::new(w, h);
        let cursor = render(editor, &mut frame);
        (frame, cursor)
    }

    // -- text area --

    #[test]
    fn gutter_numbers_rows() {
        let mut e = editor_with_file("a.txt", "hello\nworld");
        let (frame, cursor) = paint(&mut e, 20, 6);
        assert_eq!(frame.row_text(0), "   1 |hello         ");
        assert_eq!(frame.row_text(1), "   2 |world         ");
        assert_eq!(frame.row_text(2), "     |              ");
        assert_eq!(frame.get(0, 0).map(|c| c.bg), Some(Color::WHITE));
        assert_eq!(cursor, Some((6, 0)));
    }

    #[test]
    fn tildes_without_numbers() {
        let mut e = editor_with_file("a.txt", "x");
        keys(&mut e, ":set nonu");
        e.handle_key(&KeyEvent::plain(KeyCode::Enter));
        let (frame, cursor) = paint(&mut e, 10, 5);
        assert_eq!(frame.row_text(0), "x         ");
        assert_eq!(frame.row_text(1), "~         ");
        assert_eq!(cursor, Some((0, 0)));
    }

    #[test]
    fn welcome_banner_in_empty_buffer() {
        let mut e = Editor::with_storage(Box::new(MemoryStorage::default()));
        let (frame, _) = paint(&mut e, 60, 11);
        // Nine text rows, banner on row 3, no gutter for an empty buffer.
        let row = frame.row_text(3);
        assert!(row.contains(&welcome()), "{row:?}");
        assert!(row.starts_with(' '));
        assert_eq!(frame.row_text(0).trim(), "");
    }

    #[test]
    fn tags_become_colours() {
        let mut e = editor_with_file("a.c", "int x = 1; // hi");
        let (frame, _) = paint(&mut e, 30, 4);
        let fg = |x: u16| frame.get(x, 0).map(|c| c.fg);
        // Text starts after the six-column gutter.
        assert_eq!(fg(6), Some(Color::GREEN));
        assert_eq!(fg(10), Some(Color::Default));
        assert_eq!(fg(12), Some(Color::MAGENTA));
        assert_eq!(fg(14), Some(Color::CYAN));
        assert_eq!(fg(17), Some(Color::BLUE));
    }

    #[test]
    fn control_bytes_drawn_inverse() {
        let mut e = editor_with_file("a.txt", "a\x01b");
        let (frame, _) = paint(&mut e, 12, 4);
        let cell = frame.get(7, 0).copied();
        assert_eq!(cell.map(|c| c.ch), Some('A'));
        assert_eq!(cell.map(|c| c.attrs), Some(Attr::INVERSE));
    }

    #[test]
    fn tab_moves_cursor_in_render_columns() {
        let mut e = editor_with_file("a.txt", "\tx");
        e.handle_key(&KeyEvent::plain(KeyCode::End));
        let (frame, cursor) = paint(&mut e, 30, 4);
        assert_eq!(frame.row_text(0).trim_end(), "   1 |        x");
        assert_eq!(cursor, Some((6 + 9, 0)));
    }

    #[test]
    fn horizontal_scroll_shifts_row() {
        let mut e = editor_with_file("a.txt", "abcdefghijklmnop");
        e.handle_key(&KeyEvent::plain(KeyCode::End));
        let (frame, cursor) = paint(&mut e, 16, 4);
        // Ten text columns; the cursor sits one past 'p'.
        assert_eq!(e.col_offset(), 7);
        assert_eq!(frame.row_text(0), "   1 |hijklmnop ");
        assert_eq!(cursor, Some((15, 0)));
    }

    // -- status and message lines --

    #[test]
    fn status_bar_text() {
        let mut e = editor_with_file("main.c", "int x;\n");
        keys(&mut e, "x");
        let (left, right) = status_text(&e.status_line());
        assert_eq!(left, "main.c (modified) - 1 lines [NORMAL]");
        assert_eq!(right, "c | 1,1");
    }

    #[test]
    fn status_bar_truncates_name_and_is_inverse() {
        let mut e = editor_with_file("a_rather_long_file_name.txt", "x");
        let (frame, _) = paint(&mut e, 60, 4);
        let row = frame.row_text(2);
        assert!(row.starts_with("a_rather_long_file_n - 1 lines [NORMAL]"), "{row:?}");
        assert!(row.ends_with("no ft | 1,1"), "{row:?}");
        assert!(frame.row(2).is_some_and(|r| r.iter().all(|c| c.attrs == Attr::INVERSE)));
    }

    #[test]
    fn command_line_takes_cursor() {
        let mut e = editor_with_file("a.txt", "x");
        keys(&mut e, ":wq");
        let (frame, cursor) = paint(&mut e, 20, 4);
        assert_eq!(frame.row_text(3).trim_end(), ":wq");
        assert_eq!(cursor, Some((3, 3)));
    }

    #[test]
    fn prompt_takes_cursor() {
        let mut e = Editor::with_storage(Box::new(MemoryStorage::default()));
        keys(&mut e, "iz");
        e.handle_key(&KeyEvent::plain(KeyCode::Escape));
        e.handle_key(&KeyEvent::new(
            KeyCode::Char('s'),
            kiln_term::input::Modifiers::CTRL,
        ));
        keys(&mut e, "f.c");
        let (frame, cursor) = paint(&mut e, 30, 4);
        assert_eq!(frame.row_text(3).trim_end(), "Save as: f.c");
        assert_eq!(cursor, Some((12, 3)));
    }

    #[test]
    fn error_message_is_red() {
        let mut e = editor_with_file("a.txt", "x");
        keys(&mut e, ":nope");
        e.handle_key(&KeyEvent::plain(KeyCode::Enter));
        let (frame, _) = paint(&mut e, 30, 4);
        assert_eq!(frame.row_text(3).trim_end(), "Unknown command: nope");
        assert_eq!(frame.get(0, 3).map(|c| c.fg), Some(Color::RED));
    }

    #[test]
    fn tag_colours() {
        assert_eq!(tag_color(Tag::Default), Color::Default);
        assert_eq!(tag_color(Tag::Match), Color::RED);
        assert_eq!(tag_color(Tag::Boolean), Color::YELLOW);
        assert_eq!(tag_color(Tag::Operator), Color::MAGENTA);
    }

    #[test]
    fn tiny_frames_do_not_panic() {
        let mut e = editor_with_file("a.txt", "hello");
        for (w, h) in [(0, 0), (1, 1), (3, 2), (6, 3), (2, 5)] {
            let _ = paint(&mut e, w, h);
        }
    }
}
