//! KG-Phenio CLI
//!
//! Command-line entrypoints for the ontology sanitization pipeline:
//! - Repairing raw OWL sources (`repair`)
//! - Converting OWL to KGX TSV via ROBOT + KGX (`convert`)
//! - Pruning obsolete nodes and edges from KGX TSV (`prune`)
//! - Running the whole per-source sequence (`transform`)
//! - Turning uPheno mapping tables into KGX TSV (`map-upheno`)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use kgphenio_ingest_owl::{
    repair_markup, Converter, OwlTransform, RobotKgxConverter, TransformReport,
};
use kgphenio_prune::{prune_obsolete, scan_obsolete, PruneReport};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;

use config::PipelineConfig;

#[derive(Parser)]
#[command(name = "kgphenio")]
#[command(
    author,
    version,
    about = "KG-Phenio: clean ontology graphs for knowledge-graph merging"
)]
struct Cli {
    /// JSON pipeline configuration (defaults apply to anything omitted).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` wins when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop known-malformed empty elements from an OWL file, in place.
    Repair {
        /// OWL/XML file to repair
        input: PathBuf,
    },

    /// Remove obsolete nodes and every edge touching them, in place.
    Prune {
        /// KGX node table (TSV)
        #[arg(long)]
        nodes: PathBuf,
        /// KGX edge table (TSV)
        #[arg(long)]
        edges: PathBuf,
        /// Only report the obsolete set; leave both files alone.
        #[arg(long)]
        dry_run: bool,
    },

    /// Convert an OWL file to `<prefix>_nodes.tsv` / `<prefix>_edges.tsv`.
    Convert {
        input: PathBuf,
        #[arg(long)]
        out_prefix: PathBuf,
    },

    /// Unpack, repair, convert and prune configured sources.
    Transform {
        /// Directory holding raw sources (overrides config)
        #[arg(short, long)]
        input_dir: Option<PathBuf>,
        /// Directory for KGX output (overrides config)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Only these configured sources (default: all)
        #[arg(short, long)]
        sources: Vec<String>,
        /// A single file in the input directory instead of configured sources
        #[arg(long, conflicts_with = "sources")]
        data_file: Option<String>,
    },

    /// Turn a uPheno mapping table into KGX TSV.
    MapUpheno {
        input: PathBuf,
        #[arg(long)]
        out_prefix: PathBuf,
    },

    /// Print the effective configuration as JSON.
    PrintConfig,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = PipelineConfig::load(cli.config.as_deref())?;
    tracing::debug!(path = ?cli.config, "loaded pipeline configuration");

    match cli.command {
        Commands::Repair { input } => cmd_repair(&input, &config),
        Commands::Prune {
            nodes,
            edges,
            dry_run,
        } => cmd_prune(&nodes, &edges, dry_run, &config),
        Commands::Convert { input, out_prefix } => cmd_convert(&input, &out_prefix, &config),
        Commands::Transform {
            input_dir,
            output_dir,
            sources,
            data_file,
        } => cmd_transform(input_dir, output_dir, &sources, data_file.as_deref(), config),
        Commands::MapUpheno { input, out_prefix } => cmd_map_upheno(&input, &out_prefix, &config),
        Commands::PrintConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn cmd_repair(input: &PathBuf, config: &PipelineConfig) -> Result<()> {
    println!("{} {}", "Repairing".green().bold(), input.display());
    let report = repair_markup(input, &config.repair)
        .with_context(|| format!("failed to repair {}", input.display()))?;
    println!(
        "  {} {} of {} lines dropped",
        "→".yellow(),
        report.lines_dropped,
        report.lines_read
    );
    Ok(())
}

fn print_prune_report(report: &PruneReport) {
    println!(
        "  {} nodes: {} read, {} removed",
        "→".yellow(),
        report.nodes_read,
        report.nodes_removed()
    );
    println!(
        "  {} edges: {} read, {} removed",
        "→".yellow(),
        report.edges_read,
        report.edges_removed()
    );
    println!(
        "  {} obsolete: {} by name, {} by edge",
        "→".yellow(),
        report.obsolete_by_name,
        report.obsolete_by_edge
    );
    if report.short_rows > 0 {
        println!(
            "  {} {} short rows kept as-is",
            "warning:".yellow().bold(),
            report.short_rows
        );
    }
}

fn cmd_prune(nodes: &PathBuf, edges: &PathBuf, dry_run: bool, config: &PipelineConfig) -> Result<()> {
    let context = || {
        format!(
            "failed to remove obsoletes from {} and {}",
            nodes.display(),
            edges.display()
        )
    };

    if dry_run {
        let obsolete = scan_obsolete(nodes, edges, &config.prune).with_context(context)?;
        let mut ids: Vec<_> = obsolete.iter().collect();
        ids.sort_unstable();
        for id in ids {
            println!("{id}");
        }
        eprintln!(
            "{} {} obsolete ({} by name, {} by edge)",
            "info:".yellow().bold(),
            obsolete.len(),
            obsolete.by_name(),
            obsolete.by_edge()
        );
        return Ok(());
    }

    println!("{} {} / {}", "Pruning".green().bold(), nodes.display(), edges.display());
    let report = prune_obsolete(nodes, edges, &config.prune).with_context(context)?;
    print_prune_report(&report);
    Ok(())
}

fn cmd_convert(input: &PathBuf, out_prefix: &PathBuf, config: &PipelineConfig) -> Result<()> {
    println!("{} {}", "Converting".green().bold(), input.display());
    let converter = RobotKgxConverter::new(config.robot.clone());
    let graph = converter
        .convert(input, out_prefix)
        .with_context(|| format!("failed to convert {}", input.display()))?;
    eprintln!("{} {}", "wrote".green().bold(), graph.nodes.display().to_string().bold());
    eprintln!("{} {}", "wrote".green().bold(), graph.edges.display().to_string().bold());
    Ok(())
}

fn cmd_transform(
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    sources: &[String],
    data_file: Option<&str>,
    config: PipelineConfig,
) -> Result<()> {
    let mut owl = config.owl_transform();
    if let Some(dir) = input_dir {
        owl.input_dir = dir;
    }
    if let Some(dir) = output_dir {
        owl.output_dir = dir;
    }
    if !sources.is_empty() {
        for name in sources {
            anyhow::ensure!(
                owl.sources.contains_key(name),
                "unknown source `{name}` (configured: {})",
                owl.sources.keys().cloned().collect::<Vec<_>>().join(", ")
            );
        }
        owl.sources.retain(|name, _| sources.contains(name));
    }

    let transform = OwlTransform::new(owl, RobotKgxConverter::new(config.robot));
    let reports = transform.run(data_file).context("transform failed")?;
    for report in &reports {
        print_transform_report(report);
    }
    Ok(())
}

fn print_transform_report(report: &TransformReport) {
    println!("{} {}", "Transformed".green().bold(), report.source.bold());
    println!(
        "  {} repair: {} of {} lines dropped",
        "→".yellow(),
        report.repair.lines_dropped,
        report.repair.lines_read
    );
    print_prune_report(&report.prune);
    eprintln!("{} {}", "wrote".green().bold(), report.graph.nodes.display().to_string().bold());
    eprintln!("{} {}", "wrote".green().bold(), report.graph.edges.display().to_string().bold());
}

fn cmd_map_upheno(input: &PathBuf, out_prefix: &PathBuf, config: &PipelineConfig) -> Result<()> {
    println!("{} uPheno mappings {}", "Ingesting".green().bold(), input.display());
    let report = kgphenio_ingest_mapping::transform_upheno_mapping(input, out_prefix, &config.upheno)
        .with_context(|| format!("failed to transform {}", input.display()))?;
    println!(
        "  {} {} rows, {} skipped, {} nodes, {} edges",
        "→".yellow(),
        report.rows_read,
        report.rows_skipped,
        report.nodes_written,
        report.edges_written
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_transform_flags() {
        let cli = Cli::try_parse_from([
            "kgphenio", "transform", "-i", "raw", "-o", "out", "-s", "phenio", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Transform {
                input_dir,
                output_dir,
                sources,
                data_file,
            } => {
                assert_eq!(input_dir, Some(PathBuf::from("raw")));
                assert_eq!(output_dir, Some(PathBuf::from("out")));
                assert_eq!(sources, vec!["phenio".to_string()]);
                assert_eq!(data_file, None);
            }
            _ => panic!("expected transform"),
        }
    }

    #[test]
    fn unknown_source_is_rejected() {
        let err = cmd_transform(None, None, &["nope".to_string()], None, PipelineConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("unknown source `nope`"));
    }
}
