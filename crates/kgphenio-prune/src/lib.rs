//! Obsolete-term pruning for KGX TSV graphs.
//!
//! Given a node table and an edge table, removes every node that is retired
//! and every edge that touches one. A node is retired when:
//!
//! 1. its name (column 2) starts with "obsolete", case-insensitively, or
//! 2. it is the subject (column 1) of an edge whose relation (column 5) is the
//!    "term replaced by" predicate, or whose object (column 3) is the
//!    "obsolete class" marker.
//!
//! The second rule is only visible from the edge table, so the node table is
//! streamed twice:
//!
//! ```text
//!   nodes ──pass 1──► seed set (names)
//!   edges ──pass 2──► drop touching edges, grow set (edge rules) ──► edges.tmp
//!   nodes ──pass 3──► drop ids in the final set ──────────────────► nodes.tmp
//!   rename nodes.tmp → nodes, edges.tmp → edges
//! ```
//!
//! Edges are judged once, in file order. An edge whose endpoint is only
//! retired by a *later* edge stays in the output; the deriving edge itself is
//! always dropped.
//!
//! Rows are handled as raw bytes, so tables need not be valid UTF-8. An empty
//! identifier never enters the obsolete set.
//!
//! Memory is bounded by the obsolete set; no table is held in memory.

mod config;
mod reader;

pub use config::{ObsoleteVocabulary, PruneOptions};

use ahash::AHashSet;
use kgphenio_core::{commit_all, MalformedRowError, Result, RowPolicy, StagedFile};
use reader::{columns, strip_terminator, LineReader};
use serde::Serialize;
use std::borrow::Cow;
use std::path::Path;

const NODE_ID: usize = 0;
const NODE_NAME: usize = 2;
const EDGE_SUBJECT: usize = 1;
const EDGE_OBJECT: usize = 3;
const EDGE_RELATION: usize = 5;

/// Identifiers found to be obsolete during one pruning run.
#[derive(Debug, Clone, Default)]
pub struct ObsoleteSet {
    ids: AHashSet<Vec<u8>>,
    by_name: usize,
    by_edge: usize,
}

impl ObsoleteSet {
    pub fn contains(&self, id: impl AsRef<[u8]>) -> bool {
        self.ids.contains(id.as_ref())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of ids flagged by the name rule.
    pub fn by_name(&self) -> usize {
        self.by_name
    }

    /// Number of ids flagged only by an edge.
    pub fn by_edge(&self) -> usize {
        self.by_edge
    }

    /// Ids as text; bytes that are not UTF-8 are shown as U+FFFD.
    pub fn iter(&self) -> impl Iterator<Item = Cow<'_, str>> {
        self.ids.iter().map(|id| String::from_utf8_lossy(id))
    }

    fn insert(&mut self, id: &[u8]) -> bool {
        !id.is_empty() && self.ids.insert(id.to_vec())
    }

    fn insert_by_name(&mut self, id: &[u8]) {
        if self.insert(id) {
            self.by_name += 1;
        }
    }

    fn insert_by_edge(&mut self, id: &[u8]) {
        if self.insert(id) {
            self.by_edge += 1;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    pub nodes_read: usize,
    pub nodes_kept: usize,
    pub edges_read: usize,
    pub edges_kept: usize,
    pub obsolete_by_name: usize,
    pub obsolete_by_edge: usize,
    /// Rows too short for a rule, tolerated under `RowPolicy::Lenient`.
    pub short_rows: usize,
}

impl PruneReport {
    pub fn nodes_removed(&self) -> usize {
        self.nodes_read - self.nodes_kept
    }

    pub fn edges_removed(&self) -> usize {
        self.edges_read - self.edges_kept
    }
}

/// Prune obsolete nodes and their edges, replacing both files in place.
///
/// Both cleaned tables are fully written before either original is replaced,
/// and the two are swapped in together with [`commit_all`]; any error leaves
/// the originals as they were.
pub fn prune_obsolete(
    node_path: impl AsRef<Path>,
    edge_path: impl AsRef<Path>,
    options: &PruneOptions,
) -> Result<PruneReport> {
    let node_path = node_path.as_ref();
    let edge_path = edge_path.as_ref();
    let _span = tracing::info_span!(
        "prune_obsolete",
        nodes = %node_path.display(),
        edges = %edge_path.display()
    )
    .entered();

    let mut report = PruneReport::default();
    let mut obsolete = ObsoleteSet::default();

    seed_from_nodes(node_path, options, &mut obsolete, &mut report)?;
    tracing::debug!(seeded = obsolete.len(), "name rule applied");

    let mut edges_out = StagedFile::create(edge_path)?;
    filter_edges(
        edge_path,
        options,
        &mut obsolete,
        Some(&mut edges_out),
        &mut report,
    )?;

    let mut nodes_out = StagedFile::create(node_path)?;
    filter_nodes(node_path, &obsolete, &mut nodes_out, &mut report)?;

    commit_all(vec![edges_out, nodes_out])?;

    report.obsolete_by_name = obsolete.by_name();
    report.obsolete_by_edge = obsolete.by_edge();
    tracing::info!(
        nodes_removed = report.nodes_removed(),
        edges_removed = report.edges_removed(),
        obsolete_by_name = report.obsolete_by_name,
        obsolete_by_edge = report.obsolete_by_edge,
        "pruned obsolete terms"
    );
    Ok(report)
}

/// Run the name and edge rules without writing anything.
pub fn scan_obsolete(
    node_path: impl AsRef<Path>,
    edge_path: impl AsRef<Path>,
    options: &PruneOptions,
) -> Result<ObsoleteSet> {
    let mut report = PruneReport::default();
    let mut obsolete = ObsoleteSet::default();
    seed_from_nodes(node_path.as_ref(), options, &mut obsolete, &mut report)?;
    filter_edges(edge_path.as_ref(), options, &mut obsolete, None, &mut report)?;
    Ok(obsolete)
}

fn is_blank(line: &[u8]) -> bool {
    strip_terminator(line).is_empty()
}

/// Enforce the row policy for a row that needs `needed` columns.
fn check_width(
    cols: &[&[u8]],
    needed: usize,
    line: &[u8],
    path: &Path,
    line_no: usize,
    policy: RowPolicy,
    report: &mut PruneReport,
) -> Result<()> {
    if cols.len() >= needed {
        return Ok(());
    }
    let content = String::from_utf8_lossy(strip_terminator(line));
    let err = MalformedRowError::new(needed, cols.len(), content).at(path, line_no);
    match policy {
        RowPolicy::Strict => Err(err.into()),
        RowPolicy::Lenient => {
            tracing::warn!(error = %err, "short row; missing columns read as empty");
            report.short_rows += 1;
            Ok(())
        }
    }
}

fn col<'a>(cols: &[&'a [u8]], index: usize) -> &'a [u8] {
    cols.get(index).copied().unwrap_or(b"")
}

fn seed_from_nodes(
    node_path: &Path,
    options: &PruneOptions,
    obsolete: &mut ObsoleteSet,
    report: &mut PruneReport,
) -> Result<()> {
    let mut reader = LineReader::open(node_path)?;
    while let Some((line_no, line)) = reader.next_line()? {
        if is_blank(line) {
            continue;
        }
        let cols = columns(line);
        check_width(
            &cols,
            NODE_NAME + 1,
            line,
            node_path,
            line_no,
            options.row_policy,
            report,
        )?;
        if options.vocabulary.name_is_obsolete(col(&cols, NODE_NAME)) {
            obsolete.insert_by_name(col(&cols, NODE_ID));
        }
    }
    Ok(())
}

fn filter_edges(
    edge_path: &Path,
    options: &PruneOptions,
    obsolete: &mut ObsoleteSet,
    mut out: Option<&mut StagedFile>,
    report: &mut PruneReport,
) -> Result<()> {
    let mut reader = LineReader::open(edge_path)?;
    while let Some((line_no, line)) = reader.next_line()? {
        if is_blank(line) {
            if let Some(out) = out.as_deref_mut() {
                out.write_all_at(line, line_no)?;
            }
            continue;
        }
        report.edges_read += 1;

        let cols = columns(line);
        check_width(
            &cols,
            EDGE_RELATION + 1,
            line,
            edge_path,
            line_no,
            options.row_policy,
            report,
        )?;
        let subject = col(&cols, EDGE_SUBJECT);
        let object = col(&cols, EDGE_OBJECT);

        if obsolete.contains(subject) || obsolete.contains(object) {
            continue;
        }
        if options
            .vocabulary
            .edge_retires_subject(col(&cols, EDGE_RELATION), object)
        {
            obsolete.insert_by_edge(subject);
            continue;
        }

        report.edges_kept += 1;
        if let Some(out) = out.as_deref_mut() {
            out.write_all_at(line, line_no)?;
        }
    }
    Ok(())
}

fn filter_nodes(
    node_path: &Path,
    obsolete: &ObsoleteSet,
    out: &mut StagedFile,
    report: &mut PruneReport,
) -> Result<()> {
    let mut reader = LineReader::open(node_path)?;
    while let Some((line_no, line)) = reader.next_line()? {
        if is_blank(line) {
            out.write_all_at(line, line_no)?;
            continue;
        }
        report.nodes_read += 1;
        let id = col(&columns(line), NODE_ID);
        if obsolete.contains(id) {
            continue;
        }
        report.nodes_kept += 1;
        out.write_all_at(line, line_no)?;
    }
    Ok(())
}
