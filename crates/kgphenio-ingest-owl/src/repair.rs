//! Line-level repair of OWL/XML sources before conversion.
//!
//! Large merged ontologies occasionally carry empty annotation elements
//! (`<rdfs:comment></rdfs:comment>` and friends) that break the OWL→JSON
//! conversion. Dropping them loses no nodes or edges, so they are removed
//! line by line; every other byte is copied through unchanged.

use kgphenio_core::{Error, Result, StagedFile};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    /// Lines dropped when they equal one of these after trimming whitespace.
    pub known_bad_lines: Vec<String>,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            known_bad_lines: [
                "<oboInOwl:hasNarrowSynonym></oboInOwl:hasNarrowSynonym>",
                "<oboInOwl:hasBroadSynonym></oboInOwl:hasBroadSynonym>",
                "<oboInOwl:hasExactSynonym></oboInOwl:hasExactSynonym>",
                "<oboInOwl:hasRelatedSynonym></oboInOwl:hasRelatedSynonym>",
                "<oboInOwl:hasDbXref></oboInOwl:hasDbXref>",
                "<rdfs:comment></rdfs:comment>",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    pub lines_read: usize,
    pub lines_dropped: usize,
}

/// Drop known-bad lines from `path`, replacing the file in place.
pub fn repair_markup(path: impl AsRef<Path>, config: &RepairConfig) -> Result<RepairReport> {
    let path = path.as_ref();
    // A blank pattern would otherwise swallow every blank line.
    let bad: HashSet<&[u8]> = config
        .known_bad_lines
        .iter()
        .map(|l| l.trim().as_bytes())
        .filter(|l| !l.is_empty())
        .collect();

    let mut report = RepairReport::default();
    let staged = {
        let input = File::open(path).map_err(|e| Error::io(path, e))?;
        let mut reader = BufReader::new(input);
        let mut staged = StagedFile::create(path)?;
        let mut line = Vec::new();
        loop {
            line.clear();
            let read = reader
                .read_until(b'\n', &mut line)
                .map_err(|e| Error::io_at(path, report.lines_read + 1, e))?;
            if read == 0 {
                break;
            }
            report.lines_read += 1;

            let content = line.trim_ascii();
            if bad.contains(content) {
                tracing::debug!(
                    path = %path.display(),
                    line = report.lines_read,
                    content = %String::from_utf8_lossy(content),
                    "dropping malformed line"
                );
                report.lines_dropped += 1;
                continue;
            }
            staged.write_all(&line)?;
        }
        staged
    };
    staged.commit()?;

    tracing::info!(
        path = %path.display(),
        lines_read = report.lines_read,
        lines_dropped = report.lines_dropped,
        "repaired markup"
    );
    Ok(report)
}
