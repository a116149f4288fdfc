//! Identifier normalization (CURIE prefixes, categories, UniProtKB isoforms).
//!
//! Category guessing is a stopgap: it only knows a handful of prefixes and
//! everything else becomes `biolink:NamedThing`.

use serde::{Deserialize, Serialize};
use std::fmt;

const UNIPROTKB_PREFIX: &str = "uniprotkb:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Protein,
    OntologyClass,
    PhenotypicFeature,
    NamedThing,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Protein => "biolink:Protein",
            Category::OntologyClass => "biolink:OntologyClass",
            Category::PhenotypicFeature => "biolink:PhenotypicFeature",
            Category::NamedThing => "biolink:NamedThing",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text before the first `:` (the whole identifier when there is none).
pub fn curie_prefix(identifier: &str) -> &str {
    identifier.split(':').next().unwrap_or(identifier)
}

pub fn guess_category(identifier: &str) -> Category {
    match curie_prefix(identifier) {
        "UniProtKB" | "ComplexPortal" => Category::Protein,
        "GO" => Category::OntologyClass,
        _ => Category::NamedThing,
    }
}

/// `UniProtKB:P63151-2` → `UniProtKB:P63151`. Other identifiers pass through.
pub fn collapse_isoform(identifier: &str) -> String {
    let is_uniprot = identifier
        .get(..UNIPROTKB_PREFIX.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(UNIPROTKB_PREFIX));
    if !is_uniprot {
        return identifier.to_string();
    }
    match identifier.rsplit_once('-') {
        Some((parent, suffix))
            if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) =>
        {
            parent.to_string()
        }
        _ => identifier.to_string(),
    }
}

/// `http://purl.obolibrary.org/obo/HP_0000118` → `HP:0000118`.
pub fn curie_from_iri(iri: &str) -> String {
    iri.rsplit('/').next().unwrap_or(iri).replace('_', ":")
}
