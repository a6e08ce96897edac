//! Text buffer: an ordered list of [`Row`]s plus file metadata.
//!
//! Every mutation of the text goes through a `Buffer` method. Each one
//! validates its indices (out-of-range calls are no-ops), bumps the dirty
//! counter, commits the touched row, and then runs the comment cascade so
//! every row's tags agree with the block-comment state flowing into it.
//!
//! # Cascade
//!
//! A row's tags depend on whether the previous row ended inside a block
//! comment. Each row remembers the state it was tagged with (`carried_in`).
//! After an edit at row `n`, rows from `n + 1` on are visited in order and
//! retagged while their `carried_in` disagrees with the previous row's
//! `open_comment`. The first row that already agrees ends the walk, so a
//! typical edit touches one row.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{EditorError, Result};
use crate::position::Position;
use crate::row::Row;
use crate::storage::Storage;
use crate::syntax::{self, Syntax};

#[derive(Debug, Default)]
pub struct Buffer {
    rows: Vec<Row>,
    dirty: usize,
    path: Option<PathBuf>,
    syntax: Option<&'static Syntax>,
}

impl Buffer {
    /// An empty, unnamed buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer holding `text`, split on `\n`. Not dirty. Mostly for tests.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let mut buf = Self::new();
        buf.rows = crate::storage::split_lines(text.as_bytes())
            .iter()
            .map(|line| Row::new(line, None, false))
            .collect();
        buf
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[inline]
    #[must_use]
    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Length of row `at`, or 0 past the end.
    #[must_use]
    pub fn row_len(&self, at: usize) -> usize {
        self.rows.get(at).map_or(0, Row::len)
    }

    /// Mutations since the last load or save.
    #[inline]
    #[must_use]
    pub const fn dirty(&self) -> usize {
        self.dirty
    }

    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty > 0
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The file name part of the path, for display.
    #[must_use]
    pub fn file_name(&self) -> Option<String> {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
    }

    #[inline]
    #[must_use]
    pub const fn syntax(&self) -> Option<&'static Syntax> {
        self.syntax
    }

    /// The raw text of every row joined with `\n`. Mostly for tests.
    #[must_use]
    pub fn contents(&self) -> String {
        self.rows
            .iter()
            .map(|r| String::from_utf8_lossy(r.raw()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    // -----------------------------------------------------------------------
    // Row operations
    // -----------------------------------------------------------------------

    /// Insert a new row holding `text` before row `at`. `at == len`
    /// appends; anything larger is ignored.
    pub fn insert_row(&mut self, at: usize, text: &[u8]) {
        if at > self.rows.len() {
            return;
        }
        let row = Row::new(text, self.syntax, self.incoming(at));
        self.rows.insert(at, row);
        self.dirty += 1;
        self.cascade(at + 1);
    }

    /// Remove row `at`.
    pub fn delete_row(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }
        self.rows.remove(at);
        self.dirty += 1;
        self.retag_range(at);
    }

    /// Insert byte `ch` into row `row` at `col`, clamped to the row length.
    pub fn insert_char(&mut self, row: usize, col: usize, ch: u8) {
        self.edit_row(row, |raw| {
            let col = col.min(raw.len());
            raw.insert(col, ch);
        });
    }

    /// Delete the byte before `(row, col)` and return where the cursor
    /// goes. At column 0 the row is joined onto the previous one and the
    /// result is the old end of that row. Nothing happens at (0, 0) or
    /// past the last row.
    pub fn delete_char(&mut self, row: usize, col: usize) -> Option<Position> {
        if row >= self.rows.len() {
            return None;
        }
        let col = col.min(self.rows[row].len());
        if col == 0 {
            if row == 0 {
                return None;
            }
            let joined_at = self.rows[row - 1].len();
            let tail = self.rows[row].raw().to_vec();
            self.edit_row_quiet(row - 1, |raw| raw.extend_from_slice(&tail));
            self.delete_row(row);
            return Some(Position::new(row - 1, joined_at));
        }
        self.edit_row(row, |raw| {
            raw.remove(col - 1);
        });
        Some(Position::new(row, col - 1))
    }

    /// Delete the byte under `(row, col)`. Returns whether anything changed.
    pub fn delete_char_at(&mut self, row: usize, col: usize) -> bool {
        if col >= self.row_len(row) {
            return false;
        }
        self.edit_row(row, |raw| {
            raw.remove(col);
        });
        true
    }

    /// Break row `row` at `col` and return the start of the new row.
    ///
    /// At column 0 an empty row is inserted above. At or past the end of
    /// the buffer an empty row is appended.
    pub fn split_row(&mut self, row: usize, col: usize) -> Position {
        if row >= self.rows.len() {
            let at = self.rows.len();
            self.insert_row(at, b"");
            return Position::new(at + 1, 0);
        }
        let col = col.min(self.rows[row].len());
        if col == 0 {
            self.insert_row(row, b"");
        } else {
            let tail = self.edit_row_quiet(row, |raw| raw.split_off(col));
            self.insert_row(row + 1, &tail);
        }
        Position::new(row + 1, 0)
    }

    /// Append `text` to the end of row `row`.
    pub fn append_string(&mut self, row: usize, text: &[u8]) {
        self.edit_row(row, |raw| raw.extend_from_slice(text));
    }

    // -----------------------------------------------------------------------
    // Highlighting
    // -----------------------------------------------------------------------

    /// Retag row `start` unconditionally, then cascade forward until a row
    /// is already consistent with the one above it.
    ///
    /// This is the public entry to the forward pass. Row removal and joins
    /// run through it; edits that have just recommitted their own row start
    /// the pass one row further down.
    pub fn retag_range(&mut self, start: usize) {
        if start >= self.rows.len() {
            return;
        }
        let incoming = self.incoming(start);
        self.rows[start].retag(self.syntax, incoming);
        self.cascade(start + 1);
    }

    /// Retag every row from the top.
    pub fn retag_all(&mut self) {
        let mut incoming = false;
        for row in &mut self.rows {
            incoming = row.retag(self.syntax, incoming);
        }
    }

    /// Comment state flowing into row `at`.
    fn incoming(&self, at: usize) -> bool {
        at.checked_sub(1)
            .and_then(|prev| self.rows.get(prev))
            .is_some_and(Row::open_comment)
    }

    /// The forward pass behind [`Buffer::retag_range`]: walk from `start`,
    /// retagging rows whose `carried_in` is stale. Stops at the first row
    /// that is already consistent.
    fn cascade(&mut self, start: usize) {
        let mut at = start;
        while at < self.rows.len() {
            let incoming = self.incoming(at);
            if self.rows[at].carried_in() == incoming {
                break;
            }
            self.rows[at].retag(self.syntax, incoming);
            at += 1;
        }
        if at > start {
            debug!(target: "kiln::highlight", start, rows = at - start, "comment cascade");
        }
    }

    fn edit_row<R>(&mut self, row: usize, f: impl FnOnce(&mut Vec<u8>) -> R) -> Option<R> {
        if row >= self.rows.len() {
            return None;
        }
        let out = self.edit_row_quiet(row, f);
        self.cascade(row + 1);
        Some(out)
    }

    /// Edit without running the cascade; the caller runs it afterwards.
    fn edit_row_quiet<R>(&mut self, row: usize, f: impl FnOnce(&mut Vec<u8>) -> R) -> R {
        let incoming = self.incoming(row);
        self.dirty += 1;
        self.rows[row].edit(self.syntax, incoming, f)
    }

    // -----------------------------------------------------------------------
    // Files
    // -----------------------------------------------------------------------

    /// Name the buffer, pick the syntax for the new name, and retag.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.syntax = syntax::select(&name);
        debug!(
            target: "kiln::syntax",
            path = %path.display(),
            syntax = self.syntax.map_or("none", |s| s.name),
            "selected syntax"
        );
        self.path = Some(path);
        self.retag_all();
    }

    /// Replace the contents with the file at `path`. On failure the
    /// buffer is left exactly as it was.
    ///
    /// # Errors
    ///
    /// [`EditorError::Open`] if the storage can't read the file.
    pub fn load(&mut self, storage: &dyn Storage, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let lines = storage.read_lines(&path).map_err(|source| {
            warn!(target: "kiln::file", path = %path.display(), error = %source, "open failed");
            EditorError::Open {
                path: path.clone(),
                source,
            }
        })?;

        self.rows = lines.iter().map(|line| Row::new(line, None, false)).collect();
        self.set_path(path);
        self.dirty = 0;
        info!(target: "kiln::file", rows = self.rows.len(), "loaded");
        Ok(())
    }

    /// Write every row to the buffer's path. Returns the byte count.
    ///
    /// # Errors
    ///
    /// [`EditorError::NoPath`] for an unnamed buffer, [`EditorError::Save`]
    /// if the storage fails. The buffer stays dirty on failure.
    pub fn save(&mut self, storage: &mut dyn Storage) -> Result<usize> {
        let path = self.path.clone().ok_or(EditorError::NoPath)?;
        let lines: Vec<&[u8]> = self.rows.iter().map(Row::raw).collect();
        let written = storage.write_lines(&path, &lines).map_err(|source| {
            warn!(target: "kiln::file", path = %path.display(), error = %source, "save failed");
            EditorError::Save {
                path: path.clone(),
                source,
            }
        })?;
        self.dirty = 0;
        info!(target: "kiln::file", path = %path.display(), bytes = written, "saved");
        Ok(written)
    }

    /// Rename the buffer to `path`, then save.
    ///
    /// # Errors
    ///
    /// See [`save`](Self::save).
    pub fn save_as(&mut self, storage: &mut dyn Storage, path: impl Into<PathBuf>) -> Result<usize> {
        self.set_path(path);
        self.save(storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::Tag;
    use crate::storage::MemoryStorage;
    use pretty_assertions::assert_eq;

    /// A buffer with C highlighting and the given lines.
    fn c_buffer(lines: &[&str]) -> Buffer {
        let mut buf = Buffer::new();
        buf.set_path("test.c");
        for (i, line) in lines.iter().enumerate() {
            buf.insert_row(i, line.as_bytes());
        }
        buf
    }

    fn open_flags(buf: &Buffer) -> Vec<bool> {
        buf.rows().iter().map(Row::open_comment).collect()
    }

    fn all_comment(row: &Row) -> bool {
        row.highlight().iter().all(|&t| t == Tag::Comment)
    }

    /// Every row's tags match a fresh top-down retag.
    fn assert_consistent(buf: &Buffer) {
        let mut incoming = false;
        for (i, row) in buf.rows().iter().enumerate() {
            let fresh = Row::new(row.raw(), buf.syntax(), incoming);
            assert_eq!(row.highlight(), fresh.highlight(), "row {i} tags");
            assert_eq!(row.open_comment(), fresh.open_comment(), "row {i} open");
            incoming = fresh.open_comment();
        }
    }

    // -- row operations --

    #[test]
    fn insert_row_bounds() {
        let mut buf = Buffer::new();
        buf.insert_row(1, b"nope");
        assert!(buf.is_empty());
        assert!(!buf.is_dirty());
        buf.insert_row(0, b"b");
        buf.insert_row(0, b"a");
        buf.insert_row(2, b"c");
        assert_eq!(buf.contents(), "a\nb\nc");
        assert_eq!(buf.dirty(), 3);
    }

    #[test]
    fn delete_row_bounds() {
        let mut buf = Buffer::from_text("a\nb");
        buf.delete_row(5);
        assert!(!buf.is_dirty());
        buf.delete_row(0);
        assert_eq!(buf.contents(), "b");
        assert!(buf.is_dirty());
    }

    #[test]
    fn insert_char_clamps_column() {
        let mut buf = Buffer::from_text("ab");
        buf.insert_char(0, 99, b'c');
        buf.insert_char(0, 0, b'_');
        assert_eq!(buf.contents(), "_abc");
        buf.insert_char(3, 0, b'x');
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn delete_char_within_row() {
        let mut buf = Buffer::from_text("abc");
        assert_eq!(buf.delete_char(0, 2), Some(Position::new(0, 1)));
        assert_eq!(buf.contents(), "ac");
    }

    #[test]
    fn delete_char_at_origin_is_noop() {
        let mut buf = Buffer::from_text("abc");
        assert_eq!(buf.delete_char(0, 0), None);
        assert_eq!(buf.delete_char(4, 1), None);
        assert!(!buf.is_dirty());
    }

    #[test]
    fn delete_char_joins_rows() {
        let mut buf = Buffer::from_text("hello\nworld\nend");
        let pos = buf.delete_char(1, 0);
        assert_eq!(pos, Some(Position::new(0, 5)));
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.contents(), "helloworld\nend");
    }

    #[test]
    fn join_inside_comment_stays_consistent() {
        let mut buf = c_buffer(&["/* a", "b", "c */", "int d;"]);
        let before = buf.dirty();
        assert_eq!(buf.delete_char(1, 0), Some(Position::new(0, 4)));
        assert_eq!(buf.contents(), "/* ab\nc */\nint d;");
        assert_eq!(buf.dirty(), before + 2);
        assert_eq!(open_flags(&buf), vec![true, false, false]);
        assert_eq!(buf.row(2).unwrap().highlight()[0], Tag::Type);
        assert_consistent(&buf);
    }

    #[test]
    fn join_that_closes_comment_reverts_rows_below() {
        let mut buf = c_buffer(&["/* a", "*/", "int d;"]);
        assert_eq!(open_flags(&buf), vec![true, false, false]);
        buf.delete_char(1, 0);
        assert_eq!(buf.contents(), "/* a*/\nint d;");
        assert_eq!(open_flags(&buf), vec![false, false]);
        assert_eq!(buf.row(1).unwrap().highlight()[0], Tag::Type);
        assert_consistent(&buf);
    }

    #[test]
    fn delete_char_at_cursor() {
        let mut buf = Buffer::from_text("abc");
        assert!(buf.delete_char_at(0, 1));
        assert_eq!(buf.contents(), "ac");
        assert!(!buf.delete_char_at(0, 2));
        assert!(!buf.delete_char_at(1, 0));
    }

    #[test]
    fn split_row_middle() {
        let mut buf = Buffer::from_text("abcd");
        assert_eq!(buf.split_row(0, 2), Position::new(1, 0));
        assert_eq!(buf.contents(), "ab\ncd");
    }

    #[test]
    fn split_row_at_start_inserts_above() {
        let mut buf = Buffer::from_text("abcd");
        assert_eq!(buf.split_row(0, 0), Position::new(1, 0));
        assert_eq!(buf.contents(), "\nabcd");
    }

    #[test]
    fn split_row_at_end() {
        let mut buf = Buffer::from_text("ab");
        assert_eq!(buf.split_row(0, 2), Position::new(1, 0));
        assert_eq!(buf.contents(), "ab\n");
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn split_past_last_row_appends() {
        let mut buf = Buffer::new();
        assert_eq!(buf.split_row(0, 0), Position::new(1, 0));
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn append_string_extends_row() {
        let mut buf = Buffer::from_text("ab");
        buf.append_string(0, b"cd");
        buf.append_string(7, b"zz");
        assert_eq!(buf.contents(), "abcd");
    }

    // -- cascade --

    #[test]
    fn opening_comment_cascades_down() {
        let mut buf = c_buffer(&["a", "b", "c", "d", "e", "f"]);
        assert_eq!(open_flags(&buf), vec![false; 6]);

        buf.insert_char(0, 0, b'*');
        buf.insert_char(0, 0, b'/');
        assert_eq!(buf.row(0).unwrap().raw(), b"/*a");
        assert_eq!(open_flags(&buf), vec![true; 6]);
        assert!(buf.rows().iter().all(all_comment));
        assert_consistent(&buf);
    }

    #[test]
    fn removing_comment_start_reverses_cascade() {
        let mut buf = c_buffer(&["/*a", "b", "c", "d", "e", "f"]);
        assert_eq!(open_flags(&buf), vec![true; 6]);

        buf.delete_char(0, 1);
        assert_eq!(buf.row(0).unwrap().raw(), b"*a");
        assert_eq!(open_flags(&buf), vec![false; 6]);
        assert!(!buf.rows().iter().skip(1).any(all_comment));
        assert_consistent(&buf);
    }

    #[test]
    fn closing_comment_stops_cascade() {
        let mut buf = c_buffer(&["/*", "x", "y */", "int z;"]);
        assert_eq!(open_flags(&buf), vec![true, true, false, false]);
        assert_eq!(buf.row(3).unwrap().highlight()[0], Tag::Type);

        buf.delete_row(0);
        assert_eq!(open_flags(&buf), vec![false, false, false]);
        assert_eq!(buf.row(2).unwrap().highlight()[0], Tag::Type);
        assert_consistent(&buf);
    }

    #[test]
    fn edits_in_any_order_stay_consistent() {
        let mut buf = c_buffer(&["int a;", "x */", "b", "/* c", "d"]);
        buf.insert_row(1, b"/*");
        assert_consistent(&buf);
        buf.split_row(2, 1);
        assert_consistent(&buf);
        buf.delete_char(4, 0);
        assert_consistent(&buf);
        buf.delete_row(1);
        assert_consistent(&buf);
        buf.append_string(0, b" /* tail");
        assert_consistent(&buf);
    }

    #[test]
    fn retag_range_is_forced_on_first_row() {
        let mut buf = c_buffer(&["int x;"]);
        let before = buf.row(0).unwrap().clone();
        buf.retag_range(0);
        assert_eq!(buf.row(0).unwrap(), &before);
        buf.retag_range(10);
    }

    #[test]
    fn set_path_switches_syntax_and_retags() {
        let mut buf = Buffer::from_text("int x; // set x");
        assert!(buf.syntax().is_none());
        assert!(buf.row(0).unwrap().highlight().iter().all(|&t| t == Tag::Default));

        buf.set_path("x.c");
        assert_eq!(buf.syntax().map(|s| s.name), Some("c"));
        let tags = buf.row(0).unwrap().highlight();
        assert_eq!(&tags[..3], &[Tag::Type; 3]);
        assert!(tags[7..].iter().all(|&t| t == Tag::Comment));

        buf.set_path("x.txt");
        assert!(buf.syntax().is_none());
        assert!(buf.row(0).unwrap().highlight().iter().all(|&t| t == Tag::Default));
    }

    // -- files --

    #[test]
    fn load_selects_syntax_and_clears_dirty() {
        let storage = MemoryStorage::with_file("a.c", "/* x\ny */\nint z;\n");
        let mut buf = Buffer::new();
        buf.insert_row(0, b"old");
        buf.load(&storage, "a.c").unwrap();
        assert_eq!(buf.contents(), "/* x\ny */\nint z;");
        assert!(!buf.is_dirty());
        assert_eq!(buf.syntax().map(|s| s.name), Some("c"));
        assert_eq!(open_flags(&buf), vec![true, false, false]);
        assert_consistent(&buf);
    }

    #[test]
    fn failed_load_leaves_buffer_unchanged() {
        let storage = MemoryStorage::default();
        let mut buf = Buffer::from_text("keep");
        buf.insert_char(0, 0, b'!');
        let err = buf.load(&storage, "missing.c").unwrap_err();
        assert!(matches!(err, EditorError::Open { .. }));
        assert_eq!(buf.contents(), "!keep");
        assert!(buf.path().is_none());
        assert!(buf.is_dirty());
    }

    #[test]
    fn load_then_save_reproduces_lines() {
        let text = "#include <stdio.h>\n\nint main(void) {\n\treturn 0;\n}\n";
        let mut storage = MemoryStorage::with_file("m.c", text);
        let mut buf = Buffer::new();
        buf.load(&storage, "m.c").unwrap();
        storage.files.clear();
        let written = buf.save(&mut storage).unwrap();
        assert_eq!(written, text.len());
        assert_eq!(storage.contents("m.c").as_deref(), Some(text));
    }

    #[test]
    fn save_without_path() {
        let mut storage = MemoryStorage::default();
        let mut buf = Buffer::from_text("x");
        assert!(matches!(buf.save(&mut storage), Err(EditorError::NoPath)));
    }

    #[test]
    fn failed_save_keeps_dirty() {
        let mut storage = MemoryStorage {
            fail_writes: true,
            ..MemoryStorage::default()
        };
        let mut buf = Buffer::new();
        buf.set_path("f.c");
        buf.insert_row(0, b"x");
        assert!(matches!(buf.save(&mut storage), Err(EditorError::Save { .. })));
        assert!(buf.is_dirty());
    }

    #[test]
    fn save_as_renames_and_clears_dirty() {
        let mut storage = MemoryStorage::default();
        let mut buf = Buffer::from_text("fn main() {}");
        buf.insert_char(0, 0, b' ');
        let n = buf.save_as(&mut storage, "main.rs").unwrap();
        assert_eq!(n, 14);
        assert!(!buf.is_dirty());
        assert_eq!(buf.file_name().as_deref(), Some("main.rs"));
        assert_eq!(buf.syntax().map(|s| s.name), Some("rust"));
    }

    #[test]
    fn file_round_trip_on_disk() {
        use crate::storage::FsStorage;
        let path = std::env::temp_dir().join("kiln_buffer_round_trip.c");
        let mut fs = FsStorage;
        let mut buf = Buffer::new();
        buf.insert_row(0, b"int a;");
        buf.insert_row(1, b"\tb();");
        buf.save_as(&mut fs, &path).unwrap();

        let mut again = Buffer::new();
        again.load(&fs, &path).unwrap();
        assert_eq!(again.contents(), "int a;\n\tb();");
        let _ = std::fs::remove_file(&path);
    }
}
