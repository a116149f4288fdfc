//! Pipeline configuration, loaded once at startup from optional JSON.

use anyhow::{Context, Result};
use kgphenio_ingest_mapping::UphenoMappingConfig;
use kgphenio_ingest_owl::{OwlTransformConfig, RepairConfig, RobotConfig};
use kgphenio_prune::PruneOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Every tunable of the pipeline. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub sources: BTreeMap<String, String>,
    pub repair: RepairConfig,
    pub prune: PruneOptions,
    pub robot: RobotConfig,
    pub upheno: UphenoMappingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let owl = OwlTransformConfig::default();
        Self {
            input_dir: owl.input_dir,
            output_dir: owl.output_dir,
            sources: owl.sources,
            repair: owl.repair,
            prune: owl.prune,
            robot: RobotConfig::default(),
            upheno: UphenoMappingConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn owl_transform(&self) -> OwlTransformConfig {
        OwlTransformConfig {
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            sources: self.sources.clone(),
            repair: self.repair.clone(),
            prune: self.prune.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgphenio_core::RowPolicy;
    use tempfile::tempdir;

    #[test]
    fn missing_file_means_defaults() {
        let config = PipelineConfig::load(None).unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.sources.get("phenio").map(String::as_str), Some("phenio.owl"));
        assert_eq!(config.repair.known_bad_lines.len(), 6);
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        fs::write(
            &path,
            r#"{
                "prune": {
                    "vocabulary": { "term_replaced_by": "ex:replacedBy" },
                    "row_policy": "strict"
                },
                "robot": { "java_args": "-Xmx4g" }
            }"#,
        )
        .unwrap();

        let config = PipelineConfig::load(Some(&path)).unwrap();

        assert_eq!(config.prune.vocabulary.term_replaced_by, "ex:replacedBy");
        assert_eq!(config.prune.vocabulary.obsolete_class, "OIO:ObsoleteClass");
        assert_eq!(config.prune.row_policy, RowPolicy::Strict);
        assert_eq!(config.robot.java_args, "-Xmx4g");
        assert_eq!(config.robot.kgx_program, PathBuf::from("kgx"));
        assert_eq!(config.input_dir, PathBuf::from("data/raw"));
    }

    #[test]
    fn bad_json_names_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let err = PipelineConfig::load(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("broken.json"));
    }
}
