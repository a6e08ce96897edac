//! A single line of text.
//!
//! A [`Row`] keeps three views of the same line in lockstep:
//!
//! - `raw`: the editable bytes, without the line terminator
//! - `render`: `raw` with tabs expanded to the next multiple of [`TAB_STOP`]
//! - `highlight`: one [`Tag`] per render byte
//!
//! plus the block-comment state the row was tagged with (`carried_in`) and
//! the state it hands to the next row (`open_comment`).
//!
//! The only way to change `raw` is [`Row::edit`], which re-renders and
//! re-tags before returning, so no caller can see a row whose render or
//! tags are stale.

use crate::highlight::{self, Tag};
use crate::syntax::Syntax;

/// Tab width used for rendering.
pub const TAB_STOP: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    raw: Vec<u8>,
    render: Vec<u8>,
    highlight: Vec<Tag>,
    open_comment: bool,
    carried_in: bool,
}

impl Row {
    /// Build a committed row from `text`.
    #[must_use]
    pub fn new(text: &[u8], syntax: Option<&Syntax>, carried_in: bool) -> Self {
        let mut row = Self {
            raw: text.to_vec(),
            ..Self::default()
        };
        row.commit(syntax, carried_in);
        row
    }

    #[inline]
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    #[inline]
    #[must_use]
    pub fn render(&self) -> &[u8] {
        &self.render
    }

    #[inline]
    #[must_use]
    pub fn highlight(&self) -> &[Tag] {
        &self.highlight
    }

    /// Does this row end inside an unterminated block comment?
    #[inline]
    #[must_use]
    pub const fn open_comment(&self) -> bool {
        self.open_comment
    }

    /// The comment state this row was last tagged with.
    #[inline]
    #[must_use]
    pub const fn carried_in(&self) -> bool {
        self.carried_in
    }

    /// Length of `raw` in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Mutate `raw` through `f`, then re-render and re-tag.
    pub fn edit<R>(
        &mut self,
        syntax: Option<&Syntax>,
        carried_in: bool,
        f: impl FnOnce(&mut Vec<u8>) -> R,
    ) -> R {
        let out = f(&mut self.raw);
        self.commit(syntax, carried_in);
        out
    }

    /// Recompute `highlight` from `render` and return the new
    /// `open_comment`. Calling it twice with the same inputs changes nothing.
    pub fn retag(&mut self, syntax: Option<&Syntax>, carried_in: bool) -> bool {
        self.carried_in = carried_in;
        self.open_comment = highlight::tag_line(&self.render, syntax, carried_in, &mut self.highlight);
        self.open_comment
    }

    fn commit(&mut self, syntax: Option<&Syntax>, carried_in: bool) {
        self.render_from_raw();
        self.retag(syntax, carried_in);
    }

    fn render_from_raw(&mut self) {
        self.render.clear();
        for &b in &self.raw {
            if b == b'\t' {
                self.render.push(b' ');
                while self.render.len() % TAB_STOP != 0 {
                    self.render.push(b' ');
                }
            } else {
                self.render.push(b);
            }
        }
    }

    /// Render column of raw column `cx`. Columns past the end count as
    /// one render column each.
    #[must_use]
    pub fn cx_to_rx(&self, cx: usize) -> usize {
        let mut rx = 0;
        for &b in self.raw.iter().take(cx) {
            if b == b'\t' {
                rx += TAB_STOP - 1 - (rx % TAB_STOP);
            }
            rx += 1;
        }
        rx + cx.saturating_sub(self.raw.len())
    }

    /// Raw column that covers render column `rx`. Past the end of the row
    /// the result is the row length.
    #[must_use]
    pub fn rx_to_cx(&self, rx: usize) -> usize {
        let mut cur = 0;
        for (cx, &b) in self.raw.iter().enumerate() {
            if b == b'\t' {
                cur += TAB_STOP - 1 - (cur % TAB_STOP);
            }
            cur += 1;
            if cur > rx {
                return cx;
            }
        }
        self.raw.len()
    }
}
