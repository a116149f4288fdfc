//! Delimited header/row parsing.
//!
//! KGX tables and the auxiliary mapping files are plain delimited text: one
//! record per line, no embedded newlines, optional `"` quoting that carries no
//! meaning beyond decoration. Parsing strips every quote character and zips
//! values with the header positionally.

use crate::error::MalformedRowError;
use serde::{Deserialize, Serialize};

pub const TAB: char = '\t';

/// What to do when a row's field count differs from what is expected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowPolicy {
    /// Zip what lines up, log the mismatch, keep going.
    #[default]
    Lenient,
    /// Abort with `MalformedRowError`.
    Strict,
}

/// Ordered header→value pairs for one row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMapping {
    entries: Vec<(String, String)>,
}

impl HeaderMapping {
    pub fn from_pairs(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }

    /// Value for `key`. With duplicate header names the last column wins.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn unquote(field: &str) -> String {
    field.replace('"', "")
}

/// Split a header line into field names. Blank input yields no fields.
pub fn parse_header(line: &str, separator: char) -> Vec<String> {
    let line = line.trim();
    if line.is_empty() {
        return Vec::new();
    }
    line.split(separator).map(unquote).collect()
}

/// Split a data line and pair its values with `header` by position.
pub fn parse_row(
    line: &str,
    header: &[String],
    separator: char,
    policy: RowPolicy,
) -> Result<HeaderMapping, MalformedRowError> {
    let trimmed = line.trim();
    let values: Vec<String> = if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split(separator).map(unquote).collect()
    };

    if values.len() != header.len() {
        match policy {
            RowPolicy::Strict => {
                return Err(MalformedRowError::new(header.len(), values.len(), trimmed));
            }
            RowPolicy::Lenient => {
                tracing::debug!(
                    expected = header.len(),
                    found = values.len(),
                    row = trimmed,
                    "row length differs from header; zipping leniently"
                );
            }
        }
    }

    Ok(data_to_mapping(header, values))
}

/// Zip keys with values; the shorter side decides the length.
pub fn data_to_mapping<K: AsRef<str>>(keys: &[K], values: Vec<String>) -> HeaderMapping {
    HeaderMapping::from_pairs(
        keys.iter()
            .map(|k| k.as_ref().to_string())
            .zip(values)
            .collect(),
    )
}
