// SPDX-License-Identifier: MIT
//
// kiln-term — Terminal backend for kiln.
//
// Raw-mode terminal control, a byte-level key parser, and a small
// differential renderer. Direct ANSI escape sequences over termios; no
// TUI framework in between. The editor core paints a FrameBuffer, the
// DiffRenderer turns it into the minimal escape stream for the terminal.

pub mod ansi;
pub mod cell;
pub mod color;
pub mod diff;
pub mod event_loop;
pub mod frame;
pub mod input;
pub mod terminal;
