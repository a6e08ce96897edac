//! File access as a capability.
//!
//! The buffer never touches the filesystem directly. It asks a [`Storage`]
//! for a file's lines and hands it lines to write, which keeps the text
//! model testable without disk I/O and keeps the line-splitting rules in
//! one place.

use std::fs;
use std::io;
use std::path::Path;

/// Read and write a file as a sequence of lines.
pub trait Storage {
    /// The file's lines with every trailing `\n` and `\r` removed.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file can't be read.
    fn read_lines(&self, path: &Path) -> io::Result<Vec<Vec<u8>>>;

    /// Replace the file with `lines`, each followed by `\n`. Returns the
    /// number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file can't be written.
    fn write_lines(&mut self, path: &Path, lines: &[&[u8]]) -> io::Result<usize>;
}

/// Split file contents into lines the way [`Storage::read_lines`] promises.
///
/// A trailing newline does not produce an extra empty line.
#[must_use]
pub fn split_lines(bytes: &[u8]) -> Vec<Vec<u8>> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    body.split(|&b| b == b'\n')
        .map(|line| {
            let end = line
                .iter()
                .rposition(|&b| b != b'\r' && b != b'\n')
                .map_or(0, |i| i + 1);
            line[..end].to_vec()
        })
        .collect()
}

/// Join lines back into file contents, one `\n` after each.
#[must_use]
pub fn join_lines(lines: &[&[u8]]) -> Vec<u8> {
    let total = lines.iter().map(|l| l.len() + 1).sum();
    let mut out = Vec::with_capacity(total);
    for line in lines {
        out.extend_from_slice(line);
        out.push(b'\n');
    }
    out
}

/// The real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStorage;

impl Storage for FsStorage {
    fn read_lines(&self, path: &Path) -> io::Result<Vec<Vec<u8>>> {
        fs::read(path).map(|bytes| split_lines(&bytes))
    }

    fn write_lines(&mut self, path: &Path, lines: &[&[u8]]) -> io::Result<usize> {
        let bytes = join_lines(lines);
        fs::write(path, &bytes)?;
        Ok(bytes.len())
    }
}

/// In-memory storage with switchable failures.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStorage {
    pub files: std::collections::HashMap<std::path::PathBuf, Vec<u8>>,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn with_file(path: &str, contents: &str) -> Self {
        let mut storage = Self::default();
        storage.files.insert(path.into(), contents.as_bytes().to_vec());
        storage
    }

    pub fn contents(&self, path: &str) -> Option<String> {
        self.files
            .get(Path::new(path))
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }
}

#[cfg(test)]
impl Storage for MemoryStorage {
    fn read_lines(&self, path: &Path) -> io::Result<Vec<Vec<u8>>> {
        if self.fail_reads {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        self.files
            .get(path)
            .map(|bytes| split_lines(bytes))
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    fn write_lines(&mut self, path: &Path, lines: &[&[u8]]) -> io::Result<usize> {
        if self.fail_writes {
            return Err(io::Error::other("write failed"));
        }
        let bytes = join_lines(lines);
        let len = bytes.len();
        self.files.insert(path.to_path_buf(), bytes);
        Ok(len)
    }
}

/// Shared handle, so a test can hand storage to an editor and still look
/// at what was written.
#[cfg(test)]
impl Storage for std::rc::Rc<std::cell::RefCell<MemoryStorage>> {
    fn read_lines(&self, path: &Path) -> io::Result<Vec<Vec<u8>>> {
        self.borrow().read_lines(path)
    }

    fn write_lines(&mut self, path: &Path, lines: &[&[u8]]) -> io::Result<usize> {
        self.borrow_mut().write_lines(path, lines)
    }
}
