//! Errors surfaced by buffer file I/O.
//!
//! Bounds problems never show up here: out-of-range edits are no-ops. What
//! remains are the conditions the controller turns into status messages.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    /// Loading a file failed.
    #[error("Cannot open file")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing a file failed.
    #[error("Cannot save file")]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// `save` was called on a buffer that has no file name.
    #[error("No file name")]
    NoPath,
}

impl EditorError {
    /// True if the underlying I/O error is "file not found".
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Open { source, .. } | Self::Save { source, .. } => {
                source.kind() == io::ErrorKind::NotFound
            }
            Self::NoPath => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, EditorError>;
