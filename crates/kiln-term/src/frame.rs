// SPDX-License-Identifier: MIT
//
// FrameBuffer — the grid of cells a frame is painted into.
//
// The editor view paints text rows, the status bar and the message line
// here; the diff renderer compares consecutive frames and writes only
// what changed.
//
// Storage is a flat row-major `Vec<Cell>`, so a whole row is one
// contiguous slice and row equality is a single slice compare.
//
// Wide characters take two columns: the first cell holds the character,
// the second is a continuation cell whose `ch` is NUL. Zero-width
// characters are dropped; the view never produces them from byte text.

use unicode_width::UnicodeWidthChar;

use crate::cell::{Attr, Cell};
use crate::color::Color;

/// Marker stored in the second column of a wide character.
pub const CONTINUATION: char = '\0';

/// A 2D buffer of terminal cells.
///
/// ```
/// use kiln_term::frame::FrameBuffer;
/// use kiln_term::cell::Cell;
///
/// let mut frame = FrameBuffer::new(80, 24);
/// frame.set(5, 3, Cell::new('X'));
/// assert_eq!(frame.get(5, 3).map(|c| c.ch), Some('X'));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// A buffer filled with [`Cell::EMPTY`].
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; usize::from(width) * usize::from(height)],
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// The cell at `(x, y)`, or `None` out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Overwrite the cell at `(x, y)`. Out-of-bounds writes are ignored.
    #[inline]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    /// One row as a contiguous slice.
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y >= self.height {
            return None;
        }
        let start = usize::from(y) * usize::from(self.width);
        Some(&self.cells[start..start + usize::from(self.width)])
    }

    /// Reset every cell to [`Cell::EMPTY`].
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Fill row `y` with `cell`.
    pub fn fill_row(&mut self, y: u16, cell: Cell) {
        if y >= self.height {
            return;
        }
        let start = usize::from(y) * usize::from(self.width);
        self.cells[start..start + usize::from(self.width)].fill(cell);
    }

    /// Resize, discarding content.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(usize::from(width) * usize::from(height), Cell::EMPTY);
    }

    /// Paint `text` starting at `(x, y)` with one style, clipped at the
    /// right edge. Returns the column just past the last painted cell.
    ///
    /// A wide character that would straddle the right edge is not painted.
    pub fn paint_text(
        &mut self,
        x: u16,
        y: u16,
        text: &str,
        fg: Color,
        bg: Color,
        attrs: Attr,
    ) -> u16 {
        let mut col = x;
        for ch in text.chars() {
            col = self.paint_char(col, y, ch, fg, bg, attrs);
            if col >= self.width {
                break;
            }
        }
        col
    }

    /// Paint one character at `(x, y)`. Returns the next column.
    pub fn paint_char(&mut self, x: u16, y: u16, ch: char, fg: Color, bg: Color, attrs: Attr) -> u16 {
        let width = u16::try_from(ch.width().unwrap_or(0)).unwrap_or(0);
        if width == 0 || x.saturating_add(width) > self.width || y >= self.height {
            return x.saturating_add(width);
        }
        self.set(x, y, Cell::styled(ch, fg, bg, attrs));
        if width == 2 {
            self.set(x + 1, y, Cell::styled(CONTINUATION, fg, bg, attrs));
        }
        x + width
    }

    /// Copy `other` into `self`, reusing the allocation.
    pub fn copy_from(&mut self, other: &Self) {
        self.width = other.width;
        self.height = other.height;
        self.cells.clone_from(&other.cells);
    }

    /// The characters of row `y` as a string, continuation cells skipped.
    /// Mostly useful in tests.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        self.row(y)
            .map(|row| {
                row.iter()
                    .filter(|c| c.ch != CONTINUATION)
                    .map(|c| c.ch)
                    .collect()
            })
            .unwrap_or_default()
    }
}
