//! The three diagram notations understood by Schematic.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::UnknownKeywordError;

/// A diagram notation.
///
/// Every [`NodeKind`](crate::NodeKind) and [`EdgeKind`](crate::EdgeKind)
/// belongs to exactly one notation. The validator selects its rule set by
/// notation and exporters use it to check their preconditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Notation {
    /// Business-process diagrams (events, tasks, gateways, pools, lanes).
    Process,
    /// Entity-relationship diagrams.
    EntityRelationship,
    /// Data-flow diagrams.
    DataFlow,
}

impl Notation {
    /// Returns the canonical keyword for this notation.
    pub fn as_str(self) -> &'static str {
        match self {
            Notation::Process => "process",
            Notation::EntityRelationship => "entity-relationship",
            Notation::DataFlow => "data-flow",
        }
    }
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Notation {
    type Err = UnknownKeywordError;

    /// Parses a notation name. Accepts the canonical keyword and the
    /// common short forms `bpmn`, `er`, `erd` and `dfd`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "process" | "bpmn" => Ok(Notation::Process),
            "entity-relationship" | "er" | "erd" => Ok(Notation::EntityRelationship),
            "data-flow" | "dataflow" | "dfd" => Ok(Notation::DataFlow),
            _ => Err(UnknownKeywordError::new("notation", s)),
        }
    }
}
