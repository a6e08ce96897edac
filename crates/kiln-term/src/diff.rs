// SPDX-License-Identifier: MIT
//
// Differential renderer.
//
// Each frame is compared against the previous one and only changed cells
// are written. Unchanged rows are skipped with one slice comparison. The
// first frame, and any frame after a resize, is a full redraw.
//
// Output is accumulated in a byte buffer and flushed with a single write,
// wrapped in synchronized-output markers so the terminal never shows a
// half-drawn frame.

use std::io::{self, Write};

use crate::ansi;
use crate::cell::{Attr, Cell};
use crate::color::Color;
use crate::frame::{CONTINUATION, FrameBuffer};

// ─── CellWriter ──────────────────────────────────────────────────────────────

/// Emits one cell at a time, remembering the cursor position and style
/// it last produced so redundant escapes are skipped.
#[allow(clippy::struct_field_names)]
#[derive(Debug)]
struct CellWriter {
    last_x: i32,
    last_y: i32,
    last_fg: Option<Color>,
    last_bg: Option<Color>,
    last_attrs: Attr,
}

impl CellWriter {
    const fn new() -> Self {
        Self {
            last_x: -1,
            last_y: -1,
            last_fg: None,
            last_bg: None,
            last_attrs: Attr::empty(),
        }
    }

    fn render_cell(&mut self, out: &mut Vec<u8>, x: u16, y: u16, cell: &Cell) {
        let xi = i32::from(x);
        let yi = i32::from(y);

        if cell.ch == CONTINUATION && self.last_y == yi && self.last_x == xi - 1 {
            // The wide character before us already covered this column.
            self.last_x = xi;
            return;
        }

        if yi != self.last_y || xi != self.last_x + 1 {
            ansi::cursor_to(out, x, y).ok();
        }

        self.apply_style(out, cell);

        let ch = if cell.ch == CONTINUATION { ' ' } else { cell.ch };
        let mut utf8 = [0u8; 4];
        out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());

        self.last_x = xi;
        self.last_y = yi;
    }

    fn apply_style(&mut self, out: &mut Vec<u8>, cell: &Cell) {
        if cell.attrs != self.last_attrs {
            if !self.last_attrs.is_empty() {
                // SGR 0 also clears colors.
                ansi::reset(out).ok();
                self.last_fg = None;
                self.last_bg = None;
            }
            self.last_attrs = cell.attrs;
            ansi::attrs(out, cell.attrs).ok();
        }

        if self.last_fg != Some(cell.fg) {
            ansi::fg(out, cell.fg).ok();
            self.last_fg = Some(cell.fg);
        }

        if self.last_bg != Some(cell.bg) {
            ansi::bg(out, cell.bg).ok();
            self.last_bg = Some(cell.bg);
        }
    }
}

// ─── DiffRenderer ────────────────────────────────────────────────────────────

/// Counts from one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    pub cells_rendered: usize,
    pub cells_skipped: usize,
}

/// Differential renderer. Keeps the previous frame for comparison.
///
/// ```no_run
/// use kiln_term::diff::DiffRenderer;
/// use kiln_term::frame::FrameBuffer;
///
/// let mut renderer = DiffRenderer::new();
/// let frame = FrameBuffer::new(80, 24);
/// renderer.render(&frame);
/// renderer.flush().unwrap();
/// ```
#[derive(Debug)]
pub struct DiffRenderer {
    output: Vec<u8>,
    previous: Option<FrameBuffer>,
}

impl DiffRenderer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            output: Vec::new(),
            previous: None,
        }
    }

    /// Forget the previous frame so the next render redraws everything.
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    /// Diff `current` against the previous frame and queue the output.
    pub fn render(&mut self, current: &FrameBuffer) -> RenderStats {
        self.output.clear();
        let mut writer = CellWriter::new();
        let mut stats = RenderStats::default();

        let (width, height) = (current.width(), current.height());
        if width == 0 || height == 0 {
            self.store(current);
            return stats;
        }

        ansi::begin_sync(&mut self.output).ok();

        let previous = self
            .previous
            .as_ref()
            .filter(|prev| prev.width() == width && prev.height() == height);

        if previous.is_none() {
            ansi::reset(&mut self.output).ok();
            ansi::clear_screen(&mut self.output).ok();
        }

        for y in 0..height {
            let Some(row) = current.row(y) else { break };
            let prev_row = previous.and_then(|p| p.row(y));

            if prev_row == Some(row) {
                stats.cells_skipped += row.len();
                continue;
            }

            for (x, cell) in (0..width).zip(row) {
                let unchanged = prev_row.is_some_and(|p| p[usize::from(x)] == *cell);
                if unchanged {
                    stats.cells_skipped += 1;
                } else {
                    writer.render_cell(&mut self.output, x, y, cell);
                    stats.cells_rendered += 1;
                }
            }
        }

        ansi::reset(&mut self.output).ok();
        ansi::end_sync(&mut self.output).ok();

        self.store(current);
        stats
    }

    fn store(&mut self, current: &FrameBuffer) {
        match &mut self.previous {
            Some(prev) => prev.copy_from(current),
            None => self.previous = Some(current.clone()),
        }
    }

    /// Bytes queued by the last render.
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        &self.output
    }

    /// Write queued output to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush(&mut self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.flush_to(&mut lock)
    }

    /// Write queued output to `w` and clear the queue.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if self.output.is_empty() {
            return Ok(());
        }
        w.write_all(&self.output)?;
        w.flush()?;
        self.output.clear();
        Ok(())
    }
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(r: &DiffRenderer) -> String {
        String::from_utf8_lossy(r.output_bytes()).into_owned()
    }

    #[test]
    fn first_render_is_full() {
        let mut r = DiffRenderer::new();
        let frame = FrameBuffer::new(3, 2);
        let stats = r.render(&frame);
        assert_eq!(stats.cells_rendered, 6);
        assert_eq!(stats.cells_skipped, 0);
        assert!(text(&r).contains("\x1b[2J"));
    }

    #[test]
    fn identical_frame_renders_nothing() {
        let mut r = DiffRenderer::new();
        let frame = FrameBuffer::new(3, 2);
        r.render(&frame);
        let stats = r.render(&frame);
        assert_eq!(stats.cells_rendered, 0);
        assert_eq!(stats.cells_skipped, 6);
        assert!(!text(&r).contains("\x1b[2J"));
    }

    #[test]
    fn single_change_positions_cursor() {
        let mut r = DiffRenderer::new();
        let mut frame = FrameBuffer::new(4, 2);
        r.render(&frame);
        frame.set(2, 1, Cell::new('z'));
        let stats = r.render(&frame);
        assert_eq!(stats.cells_rendered, 1);
        let out = text(&r);
        assert!(out.contains("\x1b[2;3H"));
        assert!(out.contains('z'));
    }

    #[test]
    fn sequential_cells_skip_cursor_moves() {
        let mut r = DiffRenderer::new();
        let mut frame = FrameBuffer::new(4, 1);
        r.render(&frame);
        frame.paint_text(0, 0, "ab", Color::Default, Color::Default, Attr::empty());
        r.render(&frame);
        assert_eq!(text(&r).matches('H').count(), 1);
    }

    #[test]
    fn resize_forces_full_redraw() {
        let mut r = DiffRenderer::new();
        r.render(&FrameBuffer::new(2, 2));
        let stats = r.render(&FrameBuffer::new(3, 2));
        assert_eq!(stats.cells_rendered, 6);
        assert!(text(&r).contains("\x1b[2J"));
    }

    #[test]
    fn invalidate_forces_full_redraw() {
        let mut r = DiffRenderer::new();
        let frame = FrameBuffer::new(2, 1);
        r.render(&frame);
        r.invalidate();
        assert_eq!(r.render(&frame).cells_rendered, 2);
    }

    #[test]
    fn style_change_emits_sgr() {
        let mut r = DiffRenderer::new();
        let mut frame = FrameBuffer::new(2, 1);
        r.render(&frame);
        frame.set(0, 0, Cell::styled('k', Color::MAGENTA, Color::Default, Attr::INVERSE));
        r.render(&frame);
        let out = text(&r);
        assert!(out.contains("\x1b[7m"));
        assert!(out.contains("\x1b[35m"));
    }

    #[test]
    fn flush_to_drains_output() {
        let mut r = DiffRenderer::new();
        r.render(&FrameBuffer::new(1, 1));
        let mut sink = Vec::new();
        r.flush_to(&mut sink).unwrap();
        assert!(!sink.is_empty());
        assert!(r.output_bytes().is_empty());
    }
}
