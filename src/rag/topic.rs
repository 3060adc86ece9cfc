//! Topic classification of source documents
//!
//! Every indexed file gets exactly one coarse label, derived from its name
//! and path. Rule order matters: risk markers are checked before audit
//! markers, so "27005-audit.pdf" is a risk document.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse label used to restrict retrieval by role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Risk,
    Audit,
    General,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Risk, Topic::Audit, Topic::General];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Risk => "risk",
            Topic::Audit => "audit",
            Topic::General => "general",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered marker rules; first hit wins
const RULES: &[(Topic, &[&str])] = &[
    (Topic::Risk, &["27005", "risque", "risk"]),
    (
        Topic::Audit,
        &["27001", "27002", "27000", "27032", "audit", "cobit"],
    ),
];

/// Classify a file by basename and full path (case-insensitive)
pub fn classify(basename: &str, path: &str) -> Topic {
    let basename = basename.to_lowercase();
    let path = path.to_lowercase();

    for (topic, markers) in RULES {
        if markers
            .iter()
            .any(|m| basename.contains(m) || path.contains(m))
        {
            return *topic;
        }
    }

    Topic::General
}
