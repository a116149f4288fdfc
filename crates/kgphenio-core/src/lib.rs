//! Shared building blocks for the KG-Phenio pipeline.
//!
//! - [`fields`]: delimited header/row parsing with a configurable row-length policy
//! - [`lookup`]: first non-empty value among prioritized keys
//! - [`ids`]: CURIE prefixes, category guessing, UniProtKB isoform collapsing
//! - [`table`]: KGX row writing
//! - [`atomic`]: staged rewrites swapped in by rename
//! - [`error`]: the error taxonomy every stage reports through

pub mod atomic;
pub mod error;
pub mod fields;
pub mod ids;
pub mod lookup;
pub mod table;

pub use atomic::{commit_all, StagedFile};
pub use error::{Error, ItemNotFoundError, MalformedRowError, Result};
pub use fields::{parse_header, parse_row, HeaderMapping, RowPolicy, TAB};
pub use ids::{collapse_isoform, curie_from_iri, curie_prefix, guess_category, Category};
pub use lookup::{first_non_empty, FieldLookup};
pub use table::{write_row, WriteRowError};
