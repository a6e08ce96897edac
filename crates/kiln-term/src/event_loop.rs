// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop: read stdin, parse, dispatch, repaint.
//
// The loop is single-threaded and blocking. Each iteration blocks in
// read(2) until the user types, feeds the bytes to the parser, hands every
// event to the application, and repaints through the diff renderer. One
// keypress is fully handled before the next read.
//
// Resize arrives as SIGWINCH. The handler only sets an atomic flag and is
// installed without SA_RESTART, so a blocked read returns EINTR and the
// loop picks up the new size immediately.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::ansi::{self, CursorShape};
use crate::diff::DiffRenderer;
use crate::frame::FrameBuffer;
use crate::input::{Event, Parser};
use crate::terminal::{Size, Terminal};

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = 0;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {}

/// One blocking read from stdin. `Interrupted` is passed through so the
/// caller can look at the resize flag.
#[cfg(unix)]
fn read_stdin(buf: &mut [u8]) -> io::Result<usize> {
    let n = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), buf.len()) };
    usize::try_from(n).map_err(|_| io::Error::last_os_error())
}

#[cfg(not(unix))]
fn read_stdin(buf: &mut [u8]) -> io::Result<usize> {
    use std::io::Read;
    io::stdin().read(buf)
}

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application wants after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// Application interface for the event loop.
///
/// Per input chunk the loop calls [`on_event`](App::on_event) for each
/// event, [`on_resize`](App::on_resize) if the terminal changed size, then
/// [`paint`](App::paint) and [`cursor`](App::cursor).
pub trait App {
    /// Handle one input event. Return [`Action::Quit`] to stop the loop.
    fn on_event(&mut self, _event: &Event) -> Action {
        Action::Continue
    }

    /// The terminal was resized. The frame is already the new size.
    fn on_resize(&mut self, _size: Size) {}

    /// Paint the whole screen. The frame has been cleared.
    fn paint(&mut self, frame: &mut FrameBuffer);

    /// Where to show the hardware cursor after painting, or `None` to hide it.
    fn cursor(&self) -> Option<(u16, u16, CursorShape)> {
        None
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// Owns the terminal, parser and renderer.
///
/// ```no_run
/// use kiln_term::event_loop::{Action, App, EventLoop};
/// use kiln_term::frame::FrameBuffer;
/// use kiln_term::input::{Event, KeyCode};
///
/// struct Quitter;
///
/// impl App for Quitter {
///     fn on_event(&mut self, event: &Event) -> Action {
///         let Event::Key(key) = event;
///         if key.code == KeyCode::Char('q') { Action::Quit } else { Action::Continue }
///     }
///
///     fn paint(&mut self, _frame: &mut FrameBuffer) {}
/// }
///
/// EventLoop::new().run(&mut Quitter)?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Default)]
pub struct EventLoop {
    terminal: Terminal,
    parser: Parser,
    renderer: DiffRenderer,
}

impl EventLoop {
    #[must_use]
    pub fn new() -> Self {
        Self {
            terminal: Terminal::new(),
            parser: Parser::new(),
            renderer: DiffRenderer::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Run until the application returns [`Action::Quit`] or stdin closes.
    /// The terminal is restored on every exit path.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup, reading, or rendering fails.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        install_sigwinch_handler();

        let result = self.run_inner(app);
        self.terminal.leave()?;
        result
    }

    fn run_inner(&mut self, app: &mut impl App) -> io::Result<()> {
        let size = self.terminal.size();
        let mut frame = FrameBuffer::new(size.cols, size.rows);
        app.on_resize(size);
        self.present(app, &mut frame)?;

        let mut buf = [0u8; 1024];
        loop {
            match read_stdin(&mut buf) {
                Ok(0) => return Ok(()),
                Ok(n) => {
                    if self.dispatch(app, &buf[..n]) == Action::Quit {
                        return Ok(());
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }

            if SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
                let size = self.terminal.refresh_size();
                frame.resize(size.cols, size.rows);
                self.renderer.invalidate();
                app.on_resize(size);
            }

            self.present(app, &mut frame)?;
        }
    }

    /// Parse one chunk of input and hand each event to `app`. Stops at the
    /// first event that asks to quit.
    pub fn dispatch(&mut self, app: &mut impl App, bytes: &[u8]) -> Action {
        for event in self.parser.advance(bytes) {
            if app.on_event(&event) == Action::Quit {
                return Action::Quit;
            }
        }
        Action::Continue
    }

    fn present(&mut self, app: &mut impl App, frame: &mut FrameBuffer) -> io::Result<()> {
        frame.clear();
        app.paint(frame);
        self.renderer.render(frame);
        self.renderer.flush()?;

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        if let Some((x, y, shape)) = app.cursor() {
            ansi::cursor_to(&mut lock, x, y)?;
            ansi::set_cursor_shape(&mut lock, shape)?;
            ansi::cursor_show(&mut lock)?;
        } else {
            ansi::cursor_hide(&mut lock)?;
        }
        lock.flush()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{KeyCode, KeyEvent};

    #[derive(Default)]
    struct Recorder {
        keys: Vec<KeyEvent>,
    }

    impl App for Recorder {
        fn on_event(&mut self, event: &Event) -> Action {
            let Event::Key(key) = event;
            self.keys.push(*key);
            if key.code == KeyCode::Char('q') {
                Action::Quit
            } else {
                Action::Continue
            }
        }

        fn paint(&mut self, _frame: &mut FrameBuffer) {}
    }

    #[test]
    fn dispatch_delivers_events_in_order() {
        let mut lp = EventLoop::new();
        let mut app = Recorder::default();
        assert_eq!(lp.dispatch(&mut app, b"ab"), Action::Continue);
        assert_eq!(
            app.keys,
            vec![
                KeyEvent::plain(KeyCode::Char('a')),
                KeyEvent::plain(KeyCode::Char('b')),
            ]
        );
    }

    #[test]
    fn dispatch_stops_at_quit() {
        let mut lp = EventLoop::new();
        let mut app = Recorder::default();
        assert_eq!(lp.dispatch(&mut app, b"xqy"), Action::Quit);
        assert_eq!(app.keys.len(), 2);
    }

    #[test]
    fn sigwinch_flag_swap() {
        SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
        assert!(SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed));
        assert!(!SIGWINCH_RECEIVED.load(Ordering::Relaxed));
    }

    #[test]
    fn app_defaults() {
        struct Minimal;
        impl App for Minimal {
            fn paint(&mut self, _frame: &mut FrameBuffer) {}
        }
        let mut app = Minimal;
        let key = Event::Key(KeyEvent::plain(KeyCode::Enter));
        assert_eq!(app.on_event(&key), Action::Continue);
        assert!(app.cursor().is_none());
        app.on_resize(Size::FALLBACK);
    }
}
