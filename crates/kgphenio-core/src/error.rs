//! Error taxonomy shared by every pipeline stage.

use std::io;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error on {}{}: {source}", .path.display(), line_suffix(.line))]
    Io {
        path: PathBuf,
        line: Option<usize>,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    MalformedRow(#[from] MalformedRowError),
    #[error(transparent)]
    ItemNotFound(#[from] ItemNotFoundError),
    #[error("conversion with `{program}` failed ({}): {stderr}", status_text(.status))]
    Conversion {
        program: String,
        status: Option<i32>,
        stderr: String,
    },
    #[error("failed to unpack {}: {message}", .path.display())]
    Archive { path: PathBuf, message: String },
}

impl Error {
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            line: None,
            source,
        }
    }

    pub fn io_at(path: impl AsRef<Path>, line: usize, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            line: Some(line),
            source,
        }
    }
}

/// A row whose field count disagrees with its header (or with the columns a
/// rule needs).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed row{}{}: expected {expected} fields, found {found}: {content:?}",
    path_suffix(.path), line_suffix(.line))]
pub struct MalformedRowError {
    pub path: Option<PathBuf>,
    pub line: Option<usize>,
    pub expected: usize,
    pub found: usize,
    pub content: String,
}

impl MalformedRowError {
    pub fn new(expected: usize, found: usize, content: impl Into<String>) -> Self {
        Self {
            path: None,
            line: None,
            expected,
            found,
            content: content.into(),
        }
    }

    /// Attach the file and 1-based line number the row came from.
    pub fn at(mut self, path: impl AsRef<Path>, line: usize) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self.line = Some(line);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no non-empty value for any of [{}]", .keys.join(", "))]
pub struct ItemNotFoundError {
    pub keys: Vec<String>,
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(n) => format!(" (line {n})"),
        None => String::new(),
    }
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" in {}", p.display()),
        None => String::new(),
    }
}

fn status_text(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {code}"),
        None => "no exit status".to_string(),
    }
}
