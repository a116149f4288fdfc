//! Tabular mapping ingestion for KG-Phenio.
//!
//! - [`upheno`]: cross-species phenotype mappings → KGX nodes/edges
//! - [`uniprot`]: UniProt entry name → accession lookup

pub mod uniprot;
pub mod upheno;

pub use uniprot::UniprotNameMap;
pub use upheno::{transform_upheno_mapping, MappingReport, UphenoMappingConfig};
