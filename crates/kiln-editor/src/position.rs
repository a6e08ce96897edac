//! Cursor positions.
//!
//! Both coordinates are 0-indexed. `col` is a byte offset into a row's raw
//! text: the model is one byte per column, so raw column, byte index and
//! character index coincide. Tabs are the only thing that make render
//! columns differ, see [`Row::cx_to_rx`](crate::row::Row::cx_to_rx).

use std::fmt;

/// A position in a buffer: (row, column), both 0-indexed.
///
/// `col == row length` is the "one past the end" position used when
/// appending. `row == buffer length` is the empty line after the last row.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const ZERO: Self = Self { row: 0, col: 0 };

    #[inline]
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.row, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-indexed for the status bar.
        write!(f, "{},{}", self.row + 1, self.col + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_row_major() {
        assert!(Position::new(0, 9) < Position::new(1, 0));
        assert!(Position::new(2, 1) < Position::new(2, 3));
    }

    #[test]
    fn display_is_one_based() {
        assert_eq!(Position::new(0, 0).to_string(), "1,1");
        assert_eq!(Position::new(4, 11).to_string(), "5,12");
    }

    #[test]
    fn debug_is_compact() {
        assert_eq!(format!("{:?}", Position::new(3, 7)), "Pos(3:7)");
    }
}
