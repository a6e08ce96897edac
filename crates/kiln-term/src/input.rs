// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into key events. Covered encodings:
//
// - Printable ASCII and UTF-8 multi-byte characters
// - Control bytes (Ctrl+letter, Enter, Tab, Backspace)
// - CSI sequences for arrows, Home/End, and the `~` editing keys
// - SS3 sequences (arrows and Home/End in application cursor mode)
// - Alt+key (ESC followed by a printable byte)
//
// The parser keeps a small byte buffer because a sequence can be split
// across two `read()` calls. There is no timer: a lone ESC left at the
// end of a chunk is taken to be the Escape key, since terminals write an
// escape sequence in one piece.

use bitflags::bitflags;

// ─── Event Types ─────────────────────────────────────────────────────────────

/// A parsed input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
}

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[inline]
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// An unmodified key.
    #[inline]
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty())
    }

    /// True for Ctrl + `ch` with no other modifier.
    #[inline]
    #[must_use]
    pub fn is_ctrl(&self, ch: char) -> bool {
        self.code == KeyCode::Char(ch) && self.modifiers == Modifiers::CTRL
    }
}

/// Which key was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags! {
    /// Modifier keys held during a key press.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
    }
}

// ─── Parser ──────────────────────────────────────────────────────────────────

/// Incremental input parser.
///
/// ```
/// use kiln_term::input::{Event, KeyCode, KeyEvent, Parser};
///
/// let mut parser = Parser::new();
/// let events = parser.advance(b"i\x1b[A");
/// assert_eq!(events, vec![
///     Event::Key(KeyEvent::plain(KeyCode::Char('i'))),
///     Event::Key(KeyEvent::plain(KeyCode::Up)),
/// ]);
/// ```
#[derive(Debug, Default)]
pub struct Parser {
    buf: Vec<u8>,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(32),
        }
    }

    /// Feed one chunk of bytes and return every complete event in it.
    ///
    /// An incomplete escape sequence stays buffered for the next call,
    /// except a lone trailing ESC, which is reported as Escape.
    pub fn advance(&mut self, data: &[u8]) -> Vec<Event> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match parse_one(&self.buf[pos..]) {
                Parsed::Event(event, consumed) => {
                    events.push(event);
                    pos += consumed;
                }
                Parsed::Skip(n) => pos += n,
                Parsed::Incomplete => {
                    if self.buf.len() - pos == 1 && self.buf[pos] == 0x1B {
                        events.push(key(KeyCode::Escape, Modifiers::empty()));
                        pos += 1;
                    }
                    break;
                }
            }
        }

        self.buf.drain(..pos);
        events
    }
}

enum Parsed {
    Event(Event, usize),
    Incomplete,
    Skip(usize),
}

const fn key(code: KeyCode, modifiers: Modifiers) -> Event {
    Event::Key(KeyEvent { code, modifiers })
}

/// Map a Ctrl+letter byte (0x01..=0x1A) to its letter.
const fn ctrl_letter(b: u8) -> char {
    (b + b'a' - 1) as char
}

fn parse_one(buf: &[u8]) -> Parsed {
    let Some(&first) = buf.first() else {
        return Parsed::Skip(0);
    };

    match first {
        0x1B => parse_escape(buf),
        0x00 => Parsed::Event(key(KeyCode::Char('@'), Modifiers::CTRL), 1),
        0x09 => Parsed::Event(key(KeyCode::Tab, Modifiers::empty()), 1),
        0x0A | 0x0D => Parsed::Event(key(KeyCode::Enter, Modifiers::empty()), 1),
        0x08 | 0x7F => Parsed::Event(key(KeyCode::Backspace, Modifiers::empty()), 1),
        b @ 0x01..=0x1A => Parsed::Event(key(KeyCode::Char(ctrl_letter(b)), Modifiers::CTRL), 1),
        b @ 0x20..=0x7E => Parsed::Event(key(KeyCode::Char(char::from(b)), Modifiers::empty()), 1),
        0xC0..=0xFF => parse_utf8(buf),
        _ => Parsed::Skip(1),
    }
}

fn parse_escape(buf: &[u8]) -> Parsed {
    let Some(&second) = buf.get(1) else {
        return Parsed::Incomplete;
    };

    match second {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        0x1B => Parsed::Event(key(KeyCode::Escape, Modifiers::ALT), 2),
        b @ 0x20..=0x7E => Parsed::Event(key(KeyCode::Char(char::from(b)), Modifiers::ALT), 2),
        _ => Parsed::Event(key(KeyCode::Escape, Modifiers::empty()), 1),
    }
}

fn parse_csi(buf: &[u8]) -> Parsed {
    // Parameter and intermediate bytes run until a final byte in 0x40..=0x7E.
    let mut end = 2;
    loop {
        let Some(&b) = buf.get(end) else {
            return Parsed::Incomplete;
        };
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }

    let consumed = end + 1;
    let params = parse_params(&buf[2..end]);
    let modifiers = params.get(1).map_or(Modifiers::empty(), |&m| decode_modifiers(m));

    let code = match buf[end] {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'~' => match params.first().copied().unwrap_or(0) {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            _ => return Parsed::Skip(consumed),
        },
        _ => return Parsed::Skip(consumed),
    };

    Parsed::Event(key(code, modifiers), consumed)
}

fn parse_ss3(buf: &[u8]) -> Parsed {
    let Some(&b) = buf.get(2) else {
        return Parsed::Incomplete;
    };

    let code = match b {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        _ => return Parsed::Skip(3),
    };
    Parsed::Event(key(code, Modifiers::empty()), 3)
}

fn parse_utf8(buf: &[u8]) -> Parsed {
    let expected = match buf[0] {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return Parsed::Skip(1),
    };
    if buf.len() < expected {
        return Parsed::Incomplete;
    }

    std::str::from_utf8(&buf[..expected])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Parsed::Skip(1), |ch| {
            Parsed::Event(key(KeyCode::Char(ch), Modifiers::empty()), expected)
        })
}

/// Semicolon-separated decimal parameters. Empty fields read as 0.
fn parse_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, &d| acc.saturating_mul(10).saturating_add(u16::from(d - b'0')))
        })
        .collect()
}

/// xterm modifier parameter: value - 1 is a bitmask of shift/alt/ctrl.
fn decode_modifiers(param: u16) -> Modifiers {
    let bits = param.saturating_sub(1);
    let mut m = Modifiers::empty();
    if bits & 1 != 0 {
        m |= Modifiers::SHIFT;
    }
    if bits & 2 != 0 {
        m |= Modifiers::ALT;
    }
    if bits & 4 != 0 {
        m |= Modifiers::CTRL;
    }
    m
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(data: &[u8]) -> Vec<Event> {
        Parser::new().advance(data)
    }

    fn one(data: &[u8]) -> KeyEvent {
        let events = parse(data);
        assert_eq!(events.len(), 1, "expected one event from {data:?}");
        let Event::Key(k) = events[0];
        k
    }

    // -- plain bytes --

    #[test]
    fn printable_ascii() {
        assert_eq!(one(b"x"), KeyEvent::plain(KeyCode::Char('x')));
        assert_eq!(one(b":"), KeyEvent::plain(KeyCode::Char(':')));
    }

    #[test]
    fn control_keys() {
        assert_eq!(one(b"\r"), KeyEvent::plain(KeyCode::Enter));
        assert_eq!(one(b"\n"), KeyEvent::plain(KeyCode::Enter));
        assert_eq!(one(b"\t"), KeyEvent::plain(KeyCode::Tab));
        assert_eq!(one(b"\x7f"), KeyEvent::plain(KeyCode::Backspace));
    }

    #[test]
    fn ctrl_letters() {
        assert!(one(b"\x11").is_ctrl('q'));
        assert!(one(b"\x13").is_ctrl('s'));
        assert!(!one(b"q").is_ctrl('q'));
    }

    #[test]
    fn utf8_character() {
        assert_eq!(one("é".as_bytes()), KeyEvent::plain(KeyCode::Char('é')));
    }

    #[test]
    fn utf8_split_across_chunks() {
        let bytes = "日".as_bytes();
        let mut p = Parser::new();
        assert!(p.advance(&bytes[..1]).is_empty());
        assert_eq!(
            p.advance(&bytes[1..]),
            vec![Event::Key(KeyEvent::plain(KeyCode::Char('日')))]
        );
    }

    // -- escape sequences --

    #[test]
    fn lone_escape_at_chunk_end() {
        let mut p = Parser::new();
        assert_eq!(p.advance(b"\x1b"), vec![Event::Key(KeyEvent::plain(KeyCode::Escape))]);
        assert_eq!(p.advance(b"a"), vec![Event::Key(KeyEvent::plain(KeyCode::Char('a')))]);
    }

    #[test]
    fn csi_arrows() {
        assert_eq!(one(b"\x1b[A").code, KeyCode::Up);
        assert_eq!(one(b"\x1b[B").code, KeyCode::Down);
        assert_eq!(one(b"\x1b[C").code, KeyCode::Right);
        assert_eq!(one(b"\x1b[D").code, KeyCode::Left);
    }

    #[test]
    fn ss3_arrows() {
        assert_eq!(one(b"\x1bOA").code, KeyCode::Up);
        assert_eq!(one(b"\x1bOH").code, KeyCode::Home);
    }

    #[test]
    fn tilde_keys() {
        assert_eq!(one(b"\x1b[3~").code, KeyCode::Delete);
        assert_eq!(one(b"\x1b[1~").code, KeyCode::Home);
        assert_eq!(one(b"\x1b[4~").code, KeyCode::End);
        assert_eq!(one(b"\x1b[5~").code, KeyCode::PageUp);
        assert_eq!(one(b"\x1b[6~").code, KeyCode::PageDown);
    }

    #[test]
    fn modified_arrow() {
        let k = one(b"\x1b[1;5C");
        assert_eq!(k.code, KeyCode::Right);
        assert_eq!(k.modifiers, Modifiers::CTRL);
    }

    #[test]
    fn alt_key() {
        assert_eq!(one(b"\x1bx"), KeyEvent::new(KeyCode::Char('x'), Modifiers::ALT));
    }

    #[test]
    fn csi_split_across_chunks() {
        let mut p = Parser::new();
        assert!(p.advance(b"\x1b[").is_empty());
        assert_eq!(p.advance(b"D"), vec![Event::Key(KeyEvent::plain(KeyCode::Left))]);
    }

    #[test]
    fn unknown_csi_is_skipped() {
        let events = parse(b"\x1b[99Xa");
        assert_eq!(events, vec![Event::Key(KeyEvent::plain(KeyCode::Char('a')))]);
    }

    #[test]
    fn mixed_stream() {
        let events = parse(b"ab\x1bi");
        assert_eq!(events.len(), 3);
        assert_eq!(events[2], Event::Key(KeyEvent::new(KeyCode::Char('i'), Modifiers::ALT)));
    }
}
