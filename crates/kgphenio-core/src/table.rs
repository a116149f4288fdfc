//! Writing KGX node/edge rows.

use crate::error::MalformedRowError;
use std::io::{self, Write};

#[derive(Debug, thiserror::Error)]
pub enum WriteRowError {
    #[error(transparent)]
    Malformed(#[from] MalformedRowError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Write `data` as one `separator`-joined line.
///
/// Nothing is written when `data` and `header` differ in length.
pub fn write_row<W, H, D>(
    writer: &mut W,
    header: &[H],
    data: &[D],
    separator: char,
) -> Result<(), WriteRowError>
where
    W: Write + ?Sized,
    H: AsRef<str>,
    D: AsRef<str>,
{
    if header.len() != data.len() {
        let content = data
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(&separator.to_string());
        return Err(MalformedRowError::new(header.len(), data.len(), content).into());
    }

    let mut line = String::new();
    for (i, field) in data.iter().enumerate() {
        if i > 0 {
            line.push(separator);
        }
        line.push_str(field.as_ref());
    }
    line.push('\n');
    writer.write_all(line.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_tab_joined_line() {
        let mut out = Vec::new();
        write_row(&mut out, &["id", "name"], &["HP:1", "Abnormality"], '\t').expect("write");
        write_row(&mut out, &["id", "name"], &["HP:2", ""], '\t').expect("write");
        assert_eq!(String::from_utf8(out).unwrap(), "HP:1\tAbnormality\nHP:2\t\n");
    }

    #[test]
    fn length_mismatch_writes_nothing() {
        let mut out = Vec::new();
        let err = write_row(&mut out, &["id", "name", "iri"], &["HP:1"], '\t').unwrap_err();
        match err {
            WriteRowError::Malformed(m) => assert_eq!((m.expected, m.found), (3, 1)),
            other => panic!("unexpected error: {other}"),
        }
        assert!(out.is_empty());
    }
}
