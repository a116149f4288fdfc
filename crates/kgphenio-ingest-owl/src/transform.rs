//! Per-source OWL transform: unpack → repair → convert → prune.

use crate::archive::extract_tar_gz;
use crate::convert::{ConvertedGraph, Converter, RobotKgxConverter};
use crate::repair::{repair_markup, RepairConfig, RepairReport};
use kgphenio_core::{Error, Result};
use kgphenio_prune::{prune_obsolete, PruneOptions, PruneReport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwlTransformConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Source name → OWL file name inside `input_dir`.
    pub sources: BTreeMap<String, String>,
    pub repair: RepairConfig,
    pub prune: PruneOptions,
}

impl Default for OwlTransformConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data/raw"),
            output_dir: PathBuf::from("data/transformed"),
            sources: BTreeMap::from([("phenio".to_string(), "phenio.owl".to_string())]),
            repair: RepairConfig::default(),
            prune: PruneOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformReport {
    pub source: String,
    pub repair: RepairReport,
    pub graph: ConvertedGraph,
    pub prune: PruneReport,
}

pub struct OwlTransform<C: Converter = RobotKgxConverter> {
    config: OwlTransformConfig,
    converter: C,
}

impl<C: Converter> OwlTransform<C> {
    pub fn new(config: OwlTransformConfig, converter: C) -> Self {
        Self { config, converter }
    }

    pub fn config(&self) -> &OwlTransformConfig {
        &self.config
    }

    /// Transform one file from `input_dir`, or every configured source.
    ///
    /// A single file's source name is its file name up to the first `.`.
    pub fn run(&self, data_file: Option<&str>) -> Result<Vec<TransformReport>> {
        match data_file {
            Some(file) => {
                let name = file.split('.').next().unwrap_or(file);
                let path = self.config.input_dir.join(file);
                Ok(vec![self.parse(name, &path)?])
            }
            None => self
                .config
                .sources
                .iter()
                .map(|(name, file)| self.parse(name, &self.config.input_dir.join(file)))
                .collect(),
        }
    }

    /// Produce a pruned `<output_dir>/<name>_{nodes,edges}.tsv` from one OWL file.
    pub fn parse(&self, name: &str, data_file: &Path) -> Result<TransformReport> {
        let _span = tracing::info_span!("owl_transform", source = name).entered();

        self.ensure_unpacked(data_file)?;
        let repair = repair_markup(data_file, &self.config.repair)?;

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| Error::io(&self.config.output_dir, e))?;
        let graph = self
            .converter
            .convert(data_file, &self.config.output_dir.join(name))?;

        let prune = prune_obsolete(&graph.nodes, &graph.edges, &self.config.prune)?;
        Ok(TransformReport {
            source: name.to_string(),
            repair,
            graph,
            prune,
        })
    }

    fn ensure_unpacked(&self, data_file: &Path) -> Result<()> {
        if data_file.exists() {
            tracing::info!(path = %data_file.display(), "found ontology");
            return Ok(());
        }
        let mut archive: OsString = data_file.as_os_str().to_owned();
        archive.push(".tar.gz");
        let archive = PathBuf::from(archive);
        if archive.exists() {
            tracing::info!(archive = %archive.display(), "decompressing ontology");
            extract_tar_gz(&archive, &self.config.input_dir)?;
        }
        if data_file.exists() {
            Ok(())
        } else {
            Err(Error::io(
                data_file,
                io::Error::new(io::ErrorKind::NotFound, "ontology file not found"),
            ))
        }
    }
}
