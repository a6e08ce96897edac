// SPDX-License-Identifier: MIT
//
// kiln — a small modal terminal text editor.
//
// This binary wires the two crates together:
//
//   kiln-term   → raw mode, key parsing, frame buffer, diff renderer, event loop
//   kiln-editor → rows, highlighting, the NORMAL / INSERT / COMMAND controller
//
// `Kiln` implements kiln-term's App trait on top of an Editor. Each keypress
// flows through:
//
//   stdin → parser → on_event → Editor::handle_key → buffer mutation + retag
//   paint → view::render → framebuffer → diff renderer → terminal
//
// Logging is off unless KILN_LOG holds an EnvFilter directive string. The log
// goes to a file because stdout belongs to the terminal while we run.

use std::env;
use std::path::PathBuf;
use std::sync::Once;

use anyhow::{Context, Result, bail};
use kiln_editor::editor::Editor;
use kiln_editor::view;
use kiln_term::ansi::CursorShape;
use kiln_term::event_loop::{Action, App, EventLoop};
use kiln_term::frame::FrameBuffer;
use kiln_term::input::Event;
use kiln_term::terminal::{self, Size};
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "kiln.log";

const USAGE: &str = "usage: kiln [--version] [FILE]";

// ─── App ────────────────────────────────────────────────────────────────────

/// The editor plus the cursor position computed by the last paint.
struct Kiln {
    editor: Editor,
    cursor_screen: Option<(u16, u16)>,
}

impl Kiln {
    const fn new(editor: Editor) -> Self {
        Self {
            editor,
            cursor_screen: None,
        }
    }
}

impl App for Kiln {
    fn on_event(&mut self, event: &Event) -> Action {
        let Event::Key(key) = event;
        self.editor.handle_key(key)
    }

    fn on_resize(&mut self, size: Size) {
        debug!(target: "kiln::term", cols = size.cols, rows = size.rows, "resize");
    }

    fn paint(&mut self, frame: &mut FrameBuffer) {
        self.cursor_screen = view::render(&mut self.editor, frame);
    }

    fn cursor(&self) -> Option<(u16, u16, CursorShape)> {
        let (x, y) = self.cursor_screen?;
        Some((x, y, self.editor.mode().cursor_shape()))
    }
}

// ─── Arguments ──────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum Invocation {
    Version,
    Help,
    Edit(Option<PathBuf>),
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Invocation> {
    let mut path = None;
    for arg in args {
        match arg.as_str() {
            "-V" | "--version" => return Ok(Invocation::Version),
            "-h" | "--help" => return Ok(Invocation::Help),
            flag if flag.starts_with('-') && flag.len() > 1 => {
                bail!("unknown option '{flag}'\n{USAGE}");
            }
            _ if path.is_some() => bail!("only one file can be edited\n{USAGE}"),
            _ => path = Some(PathBuf::from(&arg)),
        }
    }
    Ok(Invocation::Edit(path))
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// Where the log file goes: `KILN_LOG_DIR`, else the temp dir.
fn log_dir(override_dir: Option<std::ffi::OsString>) -> PathBuf {
    override_dir.map_or_else(env::temp_dir, PathBuf::from)
}

/// Start file logging if `KILN_LOG` is set. The guard must live until exit
/// or buffered lines are lost.
fn init_logging() -> Option<WorkerGuard> {
    let directives = env::var("KILN_LOG").ok()?;
    let appender = tracing_appender::rolling::never(log_dir(env::var_os("KILN_LOG_DIR")), LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directives))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;
    Some(guard)
}

/// Log panics. Installed after the terminal's restore hook, so it runs
/// first and the message is written before the screen is torn down.
fn install_logging_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            error!(target: "kiln::panic", %info, "panic");
            previous(info);
        }));
    });
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let path = match parse_args(env::args().skip(1))? {
        Invocation::Version => {
            println!("kiln {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Invocation::Help => {
            println!("{USAGE}");
            return Ok(());
        }
        Invocation::Edit(path) => path,
    };

    if !terminal::is_tty() {
        bail!("kiln needs an interactive terminal");
    }

    let _log_guard = init_logging();
    terminal::install_panic_hook();
    install_logging_panic_hook();

    let mut editor = Editor::new();
    if let Some(path) = path {
        editor.open(path);
    }
    info!(
        target: "kiln::startup",
        file = ?editor.buffer().path(),
        rows = editor.buffer().len(),
        "starting"
    );

    let mut app = Kiln::new(editor);
    EventLoop::new()
        .run(&mut app)
        .context("terminal I/O failed")?;

    info!(target: "kiln::startup", "exit");
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────────────
