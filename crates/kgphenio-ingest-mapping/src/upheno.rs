//! uPheno cross-species phenotype mappings → KGX TSV.
//!
//! Input rows pair two phenotype IRIs (`p1`, `p2`) with their labels
//! (`label_x`, `label_y`). Pairs where both sides fall in the desired
//! ontologies become two `biolink:PhenotypicFeature` nodes and one
//! `biolink:same_as` edge.

use kgphenio_core::{
    curie_from_iri, curie_prefix, first_non_empty, parse_header, parse_row, write_row, Category,
    Error, HeaderMapping, Result, RowPolicy, StagedFile, WriteRowError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

pub const NODE_HEADER: [&str; 5] = ["id", "category", "name", "iri", "provided_by"];
pub const EDGE_HEADER: [&str; 7] = [
    "id",
    "subject",
    "predicate",
    "object",
    "category",
    "relation",
    "provided_by",
];

const SAME_AS: &str = "biolink:same_as";
const EXACT_MATCH: &str = "skos:exactMatch";
const ASSOCIATION: &str = "biolink:Association";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UphenoMappingConfig {
    pub left_iri_keys: Vec<String>,
    pub right_iri_keys: Vec<String>,
    pub left_label_keys: Vec<String>,
    pub right_label_keys: Vec<String>,
    /// CURIE prefixes both sides must carry for a pair to be kept.
    pub desired_prefixes: Vec<String>,
    pub separator: char,
    pub row_policy: RowPolicy,
    pub provided_by: String,
}

impl Default for UphenoMappingConfig {
    fn default() -> Self {
        let keys = |k: &str| vec![k.to_string()];
        Self {
            left_iri_keys: keys("p1"),
            right_iri_keys: keys("p2"),
            left_label_keys: keys("label_x"),
            right_label_keys: keys("label_y"),
            desired_prefixes: vec!["MP".to_string(), "HP".to_string()],
            separator: '\t',
            row_policy: RowPolicy::Lenient,
            provided_by: "upheno_mapping_all".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MappingReport {
    pub nodes: PathBuf,
    pub edges: PathBuf,
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub nodes_written: usize,
    pub edges_written: usize,
}

struct Phenotype<'a> {
    id: String,
    iri: &'a str,
    name: &'a str,
}

fn phenotype<'a>(
    row: &'a HeaderMapping,
    iri_keys: &[String],
    label_keys: &[String],
) -> Result<Phenotype<'a>> {
    let iri = first_non_empty(row, iri_keys)?;
    // Labels are optional in KGX; a missing one becomes an empty name.
    let name = first_non_empty(row, label_keys).unwrap_or("");
    Ok(Phenotype {
        id: curie_from_iri(iri),
        iri,
        name,
    })
}

fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = prefix.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

struct TableWriter {
    out: StagedFile,
    buf: Vec<u8>,
}

impl TableWriter {
    fn create(path: &Path, header: &[&str]) -> Result<Self> {
        let mut writer = Self {
            out: StagedFile::create(path)?,
            buf: Vec::new(),
        };
        writer.row(header, header)?;
        Ok(writer)
    }

    fn row(&mut self, header: &[&str], data: &[&str]) -> Result<()> {
        self.buf.clear();
        write_row(&mut self.buf, header, data, '\t').map_err(|e| match e {
            WriteRowError::Malformed(m) => Error::MalformedRow(m),
            WriteRowError::Io(io) => Error::io(self.out.target(), io),
        })?;
        self.out.write_all(&self.buf)
    }
}

/// Convert a mapping table into `<prefix>_nodes.tsv` / `<prefix>_edges.tsv`.
pub fn transform_upheno_mapping(
    input: &Path,
    output_prefix: &Path,
    config: &UphenoMappingConfig,
) -> Result<MappingReport> {
    let mut report = MappingReport {
        nodes: with_suffix(output_prefix, "_nodes.tsv"),
        edges: with_suffix(output_prefix, "_edges.tsv"),
        ..MappingReport::default()
    };
    let desired: HashSet<&str> = config.desired_prefixes.iter().map(String::as_str).collect();

    let (nodes, edges) = {
        let reader = BufReader::new(File::open(input).map_err(|e| Error::io(input, e))?);
        let mut nodes = TableWriter::create(&report.nodes, &NODE_HEADER)?;
        let mut edges = TableWriter::create(&report.edges, &EDGE_HEADER)?;
        let mut seen: HashSet<String> = HashSet::new();
        let mut header: Option<Vec<String>> = None;

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.map_err(|e| Error::io_at(input, line_no, e))?;
            let Some(fields) = header.as_deref() else {
                header = Some(parse_header(&line, config.separator));
                continue;
            };
            if line.trim().is_empty() {
                continue;
            }
            report.rows_read += 1;

            let row = parse_row(&line, fields, config.separator, config.row_policy)
                .map_err(|e| e.at(input, line_no))?;
            let left = phenotype(&row, &config.left_iri_keys, &config.left_label_keys)?;
            let right = phenotype(&row, &config.right_iri_keys, &config.right_label_keys)?;

            if !desired.contains(curie_prefix(&left.id)) || !desired.contains(curie_prefix(&right.id)) {
                report.rows_skipped += 1;
                continue;
            }

            for p in [&left, &right] {
                if seen.insert(p.id.clone()) {
                    nodes.row(
                        &NODE_HEADER,
                        &[
                            p.id.as_str(),
                            Category::PhenotypicFeature.as_str(),
                            p.name,
                            p.iri,
                            config.provided_by.as_str(),
                        ],
                    )?;
                    report.nodes_written += 1;
                }
            }

            let edge_id = format!("uuid:{}", uuid::Uuid::new_v4());
            edges.row(
                &EDGE_HEADER,
                &[
                    edge_id.as_str(),
                    left.id.as_str(),
                    SAME_AS,
                    right.id.as_str(),
                    ASSOCIATION,
                    EXACT_MATCH,
                    config.provided_by.as_str(),
                ],
            )?;
            report.edges_written += 1;
        }
        (nodes, edges)
    };

    nodes.out.commit()?;
    edges.out.commit()?;
    tracing::info!(
        input = %input.display(),
        rows = report.rows_read,
        skipped = report.rows_skipped,
        nodes = report.nodes_written,
        edges = report.edges_written,
        "transformed uPheno mappings"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const OBO: &str = "http://purl.obolibrary.org/obo/";

    fn mapping_file(dir: &Path, rows: &[(&str, &str, &str, &str)]) -> PathBuf {
        let path = dir.join("upheno_mapping_all.tsv");
        let mut text = "p1\tp2\tlabel_x\tlabel_y\n".to_string();
        for (p1, p2, lx, ly) in rows {
            text.push_str(&format!("{OBO}{p1}\t{OBO}{p2}\t{lx}\t{ly}\n"));
        }
        fs::write(&path, text).unwrap();
        path
    }

    fn rows(path: &Path) -> Vec<Vec<String>> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .skip(1)
            .map(|l| l.split('\t').map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn keeps_mouse_human_pairs_only() {
        let dir = tempdir().unwrap();
        let input = mapping_file(
            dir.path(),
            &[
                ("MP_0000001", "HP_0000118", "mammalian phenotype", "Phenotypic abnormality"),
                ("ZP_0000001", "HP_0000118", "zebrafish", "Phenotypic abnormality"),
                ("MP_0000002", "HP_0000118", "other", "Phenotypic abnormality"),
            ],
        );
        let report =
            transform_upheno_mapping(&input, &dir.path().join("upheno"), &UphenoMappingConfig::default())
                .unwrap();

        assert_eq!(report.rows_read, 3);
        assert_eq!(report.rows_skipped, 1);
        assert_eq!(report.nodes_written, 3);
        assert_eq!(report.edges_written, 2);

        let nodes = rows(&report.nodes);
        assert_eq!(nodes[0][0], "MP:0000001");
        assert_eq!(nodes[0][1], "biolink:PhenotypicFeature");
        assert_eq!(nodes[0][2], "mammalian phenotype");
        assert_eq!(nodes[1][0], "HP:0000118");

        let edges = rows(&report.edges);
        assert!(edges[0][0].starts_with("uuid:"));
        assert_eq!(&edges[0][1..6], &["MP:0000001", SAME_AS, "HP:0000118", ASSOCIATION, EXACT_MATCH]);
        assert_ne!(edges[0][0], edges[1][0]);
    }

    #[test]
    fn missing_iri_is_item_not_found() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("m.tsv");
        fs::write(&input, "p1\tp2\tlabel_x\tlabel_y\n\t\"\"\tx\ty\n").unwrap();
        let prefix = dir.path().join("out");

        let err = transform_upheno_mapping(&input, &prefix, &UphenoMappingConfig::default()).unwrap_err();

        assert!(matches!(err, Error::ItemNotFound(_)));
        assert!(!with_suffix(&prefix, "_nodes.tsv").exists());
    }

    #[test]
    fn strict_rows_report_line_numbers() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("m.tsv");
        fs::write(&input, "p1\tp2\tlabel_x\tlabel_y\nonly\ttwo\n").unwrap();
        let config = UphenoMappingConfig {
            row_policy: RowPolicy::Strict,
            ..UphenoMappingConfig::default()
        };

        let err = transform_upheno_mapping(&input, &dir.path().join("out"), &config).unwrap_err();
        match err {
            Error::MalformedRow(m) => assert_eq!(m.line, Some(2)),
            other => panic!("unexpected error: {other}"),
        }
    }
}
