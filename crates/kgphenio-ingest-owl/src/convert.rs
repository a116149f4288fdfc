//! OWL → KGX TSV conversion through external tools.
//!
//! ROBOT turns the repaired OWL into OBO Graphs JSON, then KGX streams the
//! JSON into `<prefix>_nodes.tsv` / `<prefix>_edges.tsv`. Both are separate
//! processes; this module only builds their command lines, supplies their
//! environment, and checks their exit status and outputs.

use kgphenio_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Tool locations and JVM settings for the conversion step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub robot_program: PathBuf,
    /// Exported to ROBOT as `ROBOT_JAVA_ARGS`.
    pub java_args: String,
    pub kgx_program: PathBuf,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            robot_program: PathBuf::from("robot"),
            java_args: "-Xmx12g -XX:+UseG1GC".to_string(),
            kgx_program: PathBuf::from("kgx"),
        }
    }
}

/// Node and edge tables produced for one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertedGraph {
    pub nodes: PathBuf,
    pub edges: PathBuf,
}

impl ConvertedGraph {
    /// KGX naming: `<prefix>_nodes.tsv` and `<prefix>_edges.tsv`.
    pub fn for_prefix(prefix: &Path) -> Self {
        let with_suffix = |suffix: &str| {
            let mut s: OsString = prefix.as_os_str().to_owned();
            s.push(suffix);
            PathBuf::from(s)
        };
        Self {
            nodes: with_suffix("_nodes.tsv"),
            edges: with_suffix("_edges.tsv"),
        }
    }
}

pub trait Converter {
    fn convert(&self, input: &Path, output_prefix: &Path) -> Result<ConvertedGraph>;
}

#[derive(Debug, Clone, Default)]
pub struct RobotKgxConverter {
    config: RobotConfig,
}

impl RobotKgxConverter {
    pub fn new(config: RobotConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    fn robot_convert(&self, input: &Path, output: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.config.robot_program);
        cmd.arg("convert")
            .arg("--input")
            .arg(input)
            .arg("--output")
            .arg(output)
            .env("ROBOT_JAVA_ARGS", &self.config.java_args);
        run_tool(&mut cmd)
    }

    fn kgx_transform(&self, input: &Path, output_prefix: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.config.kgx_program);
        cmd.args(["transform", "--input-format", "obojson", "--output"])
            .arg(output_prefix)
            .args(["--output-format", "tsv", "--stream"])
            .arg(input);
        run_tool(&mut cmd)
    }
}

impl Converter for RobotKgxConverter {
    fn convert(&self, input: &Path, output_prefix: &Path) -> Result<ConvertedGraph> {
        let json = input.with_extension("json");
        tracing::info!(input = %input.display(), json = %json.display(), "converting OWL with ROBOT");
        self.robot_convert(input, &json)?;

        tracing::info!(prefix = %output_prefix.display(), "transforming OBO Graphs JSON with KGX");
        self.kgx_transform(&json, output_prefix)?;

        let graph = ConvertedGraph::for_prefix(output_prefix);
        for table in [&graph.nodes, &graph.edges] {
            if !table.exists() {
                return Err(Error::Conversion {
                    program: self.config.kgx_program.display().to_string(),
                    status: Some(0),
                    stderr: format!("expected output {} was not written", table.display()),
                });
            }
        }
        Ok(graph)
    }
}

/// Run an external tool to completion; non-zero exit is a conversion error.
fn run_tool(cmd: &mut Command) -> Result<()> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    tracing::debug!(command = ?cmd, "running external tool");
    let output = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|e| Error::Conversion {
            program: program.clone(),
            status: None,
            stderr: format!("failed to start: {e}"),
        })?;
    if !output.status.success() {
        return Err(Error::Conversion {
            program,
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}
