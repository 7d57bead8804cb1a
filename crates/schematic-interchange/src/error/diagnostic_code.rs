//! Diagnostic codes.
//!
//! Codes are organized by format:
//! - `E0xx` / `W0xx` - Process XML
//! - `E1xx` / `W1xx` - SQL DDL
//! - `E2xx` / `W2xx` - JSON package

use std::fmt;

/// Codes for categorizing import diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    // =========================================================================
    // Process XML (E0xx / W0xx)
    // =========================================================================
    /// The document is not well-formed XML.
    E001,

    /// The document has no `definitions` root or no `process` element.
    E002,

    /// An element was skipped because it has no canonical mapping.
    W001,

    /// A flow references a node that does not exist.
    W002,

    /// An element id is used more than once.
    W003,

    /// A diagram-interchange shape has unreadable bounds.
    W004,

    /// A reference that cannot be represented, e.g. a lane in two pools.
    W005,

    // =========================================================================
    // SQL DDL (E1xx / W1xx)
    // =========================================================================
    /// Unterminated string literal.
    E100,

    /// Unterminated quoted identifier.
    E101,

    /// Unterminated block comment.
    E102,

    /// Unexpected character.
    E103,

    /// A `CREATE TABLE` statement does not match the grammar.
    E110,

    /// An `ALTER TABLE ... FOREIGN KEY` statement does not match the grammar.
    E111,

    /// A statement kind that is not imported.
    W101,

    /// A constraint that has no canonical mapping (e.g. `CHECK`).
    W102,

    /// A foreign key references a table that is not defined.
    W103,

    /// A table is defined more than once.
    W104,

    /// A foreign key references a column that cannot be resolved.
    W105,

    /// A table or relationship clashes with an element already in the graph.
    W106,

    // =========================================================================
    // JSON package (E2xx / W2xx)
    // =========================================================================
    /// The document is not valid JSON.
    E200,

    /// A required field is missing or has the wrong type.
    E201,

    /// A `kind` or keyword value is not recognized.
    E202,

    /// A node or edge id is used more than once.
    E203,

    /// An edge endpoint names a node that does not exist.
    E204,

    /// The package format marker or version is not the one this build writes.
    W201,
}

impl DiagnosticCode {
    /// Short description used as a default label message.
    pub fn description(&self) -> &'static str {
        match self {
            Self::E001 => "malformed XML",
            Self::E002 => "missing process body",
            Self::W001 => "unsupported element",
            Self::W002 => "unknown flow endpoint",
            Self::W003 => "duplicate element id",
            Self::W004 => "invalid shape bounds",
            Self::W005 => "unrepresentable reference",
            Self::E100 => "unterminated string",
            Self::E101 => "unterminated identifier",
            Self::E102 => "unterminated comment",
            Self::E103 => "unexpected character",
            Self::E110 => "invalid table definition",
            Self::E111 => "invalid foreign key definition",
            Self::W101 => "unsupported statement",
            Self::W102 => "unsupported constraint",
            Self::W103 => "unknown referenced table",
            Self::W104 => "duplicate table",
            Self::W105 => "unresolved referenced column",
            Self::W106 => "conflicting graph element",
            Self::E200 => "invalid JSON",
            Self::E201 => "invalid package structure",
            Self::E202 => "unknown keyword",
            Self::E203 => "duplicate id",
            Self::E204 => "unknown edge endpoint",
            Self::W201 => "unexpected package version",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
