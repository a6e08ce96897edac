// SPDX-License-Identifier: MIT
//
// Cell — one character position on screen.
//
// A cell is a character plus its foreground, background and attributes.
// The renderer diffs whole rows of cells, so equality must be cheap: the
// struct is `Copy` and compares field by field.

use crate::color::Color;

bitflags::bitflags! {
    /// Text attributes, mapped one-to-one to SGR parameters.
    ///
    /// ```
    /// use kiln_term::cell::Attr;
    ///
    /// let style = Attr::BOLD | Attr::INVERSE;
    /// assert!(style.contains(Attr::INVERSE));
    /// assert!(!style.contains(Attr::UNDERLINE));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1.
        const BOLD      = 1 << 0;
        /// SGR 2.
        const DIM       = 1 << 1;
        /// SGR 4.
        const UNDERLINE = 1 << 2;
        /// SGR 7 — swap foreground and background.
        const INVERSE   = 1 << 3;
    }
}

/// A single terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
    pub attrs: Attr,
}

impl Cell {
    /// A blank cell: space, default colors, no attributes.
    pub const EMPTY: Self = Self {
        ch: ' ',
        fg: Color::Default,
        bg: Color::Default,
        attrs: Attr::empty(),
    };

    /// A cell with default styling.
    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            ch,
            fg: Color::Default,
            bg: Color::Default,
            attrs: Attr::empty(),
        }
    }

    /// A cell with explicit styling.
    #[inline]
    #[must_use]
    pub const fn styled(ch: char, fg: Color, bg: Color, attrs: Attr) -> Self {
        Self { ch, fg, bg, attrs }
    }

    /// True if this cell renders identically to [`Cell::EMPTY`].
    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cell_is_space() {
        assert_eq!(Cell::EMPTY.ch, ' ');
        assert!(Cell::EMPTY.is_empty());
        assert!(Cell::default().is_empty());
    }

    #[test]
    fn new_cell_has_default_style() {
        let cell = Cell::new('x');
        assert_eq!(cell.ch, 'x');
        assert_eq!((cell.fg, cell.bg, cell.attrs), (Color::Default, Color::Default, Attr::empty()));
        assert!(!cell.is_empty());
    }

    #[test]
    fn styled_cell_differs_in_style() {
        let cell = Cell::styled('x', Color::RED, Color::Default, Attr::BOLD);
        assert_ne!(cell, Cell::new('x'));
        assert_eq!(cell.ch, 'x');
    }

    #[test]
    fn attr_combination() {
        let a = Attr::BOLD | Attr::DIM;
        assert!(a.contains(Attr::BOLD));
        assert!(a.contains(Attr::DIM));
        assert!(!a.contains(Attr::INVERSE));
    }
}
