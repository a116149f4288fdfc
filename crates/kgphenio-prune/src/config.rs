use kgphenio_core::RowPolicy;
use serde::{Deserialize, Serialize};

/// Vocabulary that marks a node as retired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObsoleteVocabulary {
    /// Predicate meaning "the subject has been superseded" (IAO "term replaced by").
    pub term_replaced_by: String,
    /// Object marker meaning "the subject is an obsolete class".
    pub obsolete_class: String,
    /// Case-insensitive node-name prefix. Empty disables the name rule.
    pub name_prefix: String,
}

impl Default for ObsoleteVocabulary {
    fn default() -> Self {
        Self {
            term_replaced_by: "IAO:0100001".to_string(),
            obsolete_class: "OIO:ObsoleteClass".to_string(),
            name_prefix: "obsolete".to_string(),
        }
    }
}

impl ObsoleteVocabulary {
    pub fn name_is_obsolete(&self, name: impl AsRef<[u8]>) -> bool {
        let prefix = self.name_prefix.as_bytes();
        !prefix.is_empty()
            && name
                .as_ref()
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    }

    /// Whether an edge marks its subject obsolete.
    pub fn edge_retires_subject(
        &self,
        predicate: impl AsRef<[u8]>,
        object: impl AsRef<[u8]>,
    ) -> bool {
        matches(predicate.as_ref(), &self.term_replaced_by)
            || matches(object.as_ref(), &self.obsolete_class)
    }
}

fn matches(value: &[u8], marker: &str) -> bool {
    !marker.is_empty() && value == marker.as_bytes()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PruneOptions {
    pub vocabulary: ObsoleteVocabulary,
    /// Applies to rows too short to hold the columns a rule reads.
    pub row_policy: RowPolicy,
}
