//! Error types for graph construction and keyword parsing.

use thiserror::Error;

/// Errors raised when a mutation would break a [`Graph`](crate::Graph) invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("duplicate node id `{0}`")]
    DuplicateNode(String),

    #[error("duplicate edge id `{0}`")]
    DuplicateEdge(String),

    #[error("edge `{edge}` references unknown node `{node}`")]
    UnknownEndpoint { edge: String, node: String },

    #[error("node `{0}` is not an entity")]
    NotAnEntity(String),

    #[error("entity `{entity}` has no attribute `{attribute}`")]
    UnknownAttribute { entity: String, attribute: String },

    #[error("entity `{entity}` already has an attribute `{attribute}`")]
    DuplicateAttribute { entity: String, attribute: String },
}

/// A keyword did not name any variant of the expected enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownKeywordError {
    kind: &'static str,
    value: String,
}

impl UnknownKeywordError {
    /// Create a new error for `value` while parsing a `kind` keyword.
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// What was being parsed, e.g. `"gateway kind"`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// The rejected input.
    pub fn value(&self) -> &str {
        &self.value
    }
}
