use kgphenio_core::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Sequential byte-line reader that remembers where it is for error reporting.
///
/// Lines are raw bytes: tables are not required to be valid UTF-8.
pub(crate) struct LineReader {
    path: PathBuf,
    inner: BufReader<File>,
    line_no: usize,
    buf: Vec<u8>,
}

impl LineReader {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            inner: BufReader::new(file),
            line_no: 0,
            buf: Vec::new(),
        })
    }

    /// Next line with its terminator, and its 1-based number.
    pub(crate) fn next_line(&mut self) -> Result<Option<(usize, &[u8])>> {
        self.buf.clear();
        let read = self
            .inner
            .read_until(b'\n', &mut self.buf)
            .map_err(|e| Error::io_at(&self.path, self.line_no + 1, e))?;
        if read == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        Ok(Some((self.line_no, &self.buf)))
    }
}

pub(crate) fn strip_terminator(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|b| !matches!(b, b'\n' | b'\r'))
        .map_or(0, |i| i + 1);
    &line[..end]
}

pub(crate) fn columns(line: &[u8]) -> Vec<&[u8]> {
    strip_terminator(line).split(|b| *b == b'\t').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminators_are_stripped() {
        assert_eq!(strip_terminator(b"a\tb\r\n"), b"a\tb");
        assert_eq!(strip_terminator(b"\r\n"), b"");
        assert_eq!(strip_terminator(b"x"), b"x");
    }

    #[test]
    fn columns_split_on_tabs() {
        let cols = columns(b"e1\tX:1\t\xe9\n");
        assert_eq!(cols, vec![&b"e1"[..], &b"X:1"[..], &b"\xe9"[..]]);
    }
}
