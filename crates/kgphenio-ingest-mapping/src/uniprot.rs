//! UniProt entry name → accession lookup built from an idmapping dump.
//!
//! The dump (`<ORGANISM>_idmapping.dat.gz`) has three tab-separated columns:
//! accession, id type, value. Column 2 is treated as the name.

use flate2::read::GzDecoder;
use kgphenio_core::{Error, MalformedRowError, Result, RowPolicy};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct UniprotNameMap {
    name_to_id: HashMap<String, String>,
}

impl UniprotNameMap {
    pub fn from_idmapping_gz(path: &Path, policy: RowPolicy) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        Self::from_reader(GzDecoder::new(file), path, policy)
    }

    /// `source` is only used to label errors.
    pub fn from_reader<R: Read>(reader: R, source: &Path, policy: RowPolicy) -> Result<Self> {
        tracing::info!(source = %source.display(), "building UniProt name to id map");
        let mut name_to_id = HashMap::new();
        for (idx, line) in BufReader::new(reader).lines().enumerate() {
            let line_no = idx + 1;
            let line = line.map_err(|e| Error::io_at(source, line_no, e))?;
            let items: Vec<&str> = line.trim().split('\t').collect();
            if items.len() < 3 {
                let err = MalformedRowError::new(3, items.len(), line.trim()).at(source, line_no);
                match policy {
                    RowPolicy::Strict => return Err(err.into()),
                    RowPolicy::Lenient => {
                        tracing::debug!(error = %err, "skipping idmapping row");
                        continue;
                    }
                }
            }
            name_to_id.insert(items[2].to_string(), items[0].to_string());
        }
        Ok(Self { name_to_id })
    }

    pub fn name_to_id(&self, name: &str) -> Option<&str> {
        self.name_to_id.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.name_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name_to_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::tempdir;

    const DUMP: &str = "P63151\tUniProtKB-ID\t2ABA_HUMAN\nP63151\tGene_Name\tPPP2R2A\nQ00005\tUniProtKB-ID\t2ABB_HUMAN\n";

    #[test]
    fn maps_names_from_gzipped_dump() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("HUMAN_9606_idmapping.dat.gz");
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        enc.write_all(DUMP.as_bytes()).unwrap();
        enc.finish().unwrap();

        let map = UniprotNameMap::from_idmapping_gz(&path, RowPolicy::Strict).unwrap();

        assert_eq!(map.len(), 3);
        assert_eq!(map.name_to_id("2ABA_HUMAN"), Some("P63151"));
        assert_eq!(map.name_to_id("PPP2R2A"), Some("P63151"));
        assert_eq!(map.name_to_id("NOPE_HUMAN"), None);
    }

    #[test]
    fn short_rows_follow_policy() {
        let text = format!("{DUMP}broken\trow\n");
        let lenient =
            UniprotNameMap::from_reader(text.as_bytes(), Path::new("mem"), RowPolicy::Lenient).unwrap();
        assert_eq!(lenient.len(), 3);

        let err = UniprotNameMap::from_reader(text.as_bytes(), Path::new("mem"), RowPolicy::Strict)
            .unwrap_err();
        match err {
            Error::MalformedRow(m) => assert_eq!(m.line, Some(4)),
            other => panic!("unexpected error: {other}"),
        }
    }
}
