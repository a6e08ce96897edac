//! # kiln-editor — Editor core for kiln
//!
//! The text model, the highlighter and the modal controller:
//!
//! - **[`row`]** — one line: raw bytes, tab-expanded render, highlight tags
//! - **[`buffer`]** — ordered rows with every editing operation and file I/O
//! - **[`highlight`]** — the per-row lexer and the [`Tag`](highlight::Tag) enum
//! - **[`syntax`]** — the static table of language descriptors
//! - **[`editor`]** — the NORMAL / INSERT / COMMAND key state machine
//! - **[`view`]** — paints an [`Editor`](editor::Editor) into a kiln-term frame
//!
//! Supporting modules: [`position`], [`mode`], [`command`], [`options`],
//! [`storage`] and [`error`].

pub mod buffer;
pub mod command;
pub mod editor;
pub mod error;
pub mod highlight;
pub mod mode;
pub mod options;
pub mod position;
pub mod row;
pub mod storage;
pub mod syntax;
pub mod view;
