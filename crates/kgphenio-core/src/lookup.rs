//! Priority-keyed field lookup.

use crate::error::ItemNotFoundError;
use crate::fields::HeaderMapping;
use std::collections::{BTreeMap, HashMap};

/// Read-only string→string view used by [`first_non_empty`].
pub trait FieldLookup {
    fn field(&self, key: &str) -> Option<&str>;
}

impl FieldLookup for HeaderMapping {
    fn field(&self, key: &str) -> Option<&str> {
        self.get(key)
    }
}

impl<S: std::hash::BuildHasher> FieldLookup for HashMap<String, String, S> {
    fn field(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl FieldLookup for BTreeMap<String, String> {
    fn field(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

/// Value of the first key in `keys` that is present and non-empty.
///
/// An empty string is treated exactly like a missing key.
pub fn first_non_empty<'a, M, K>(mapping: &'a M, keys: &[K]) -> Result<&'a str, ItemNotFoundError>
where
    M: FieldLookup + ?Sized,
    K: AsRef<str>,
{
    keys.iter()
        .filter_map(|k| mapping.field(k.as_ref()))
        .find(|v| !v.is_empty())
        .ok_or_else(|| ItemNotFoundError {
            keys: keys.iter().map(|k| k.as_ref().to_string()).collect(),
        })
}
