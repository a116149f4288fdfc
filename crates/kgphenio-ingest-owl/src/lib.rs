//! OWL source handling for KG-Phenio (boundary adapter).
//!
//! The ontology itself is never parsed here. This crate prepares the raw
//! artifact and hands it to external tooling:
//!
//! - [`archive`]: unpack `.tar.gz` / `.zip` / `.gz` downloads
//! - [`repair`]: drop known-malformed empty elements, in place
//! - [`convert`]: ROBOT + KGX conversion to KGX TSV behind the [`Converter`] trait
//! - [`transform`]: the per-source sequence, ending in obsolete pruning

pub mod archive;
pub mod convert;
pub mod repair;
pub mod transform;

pub use archive::{extract_tar_gz, ungzip_to_dir, unzip_to_dir};
pub use convert::{ConvertedGraph, Converter, RobotConfig, RobotKgxConverter};
pub use repair::{repair_markup, RepairConfig, RepairReport};
pub use transform::{OwlTransform, OwlTransformConfig, TransformReport};
