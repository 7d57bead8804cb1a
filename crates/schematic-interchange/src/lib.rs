//! Importers and exporters between Schematic graphs and foreign text formats.
//!
//! Three format pairs are supported:
//!
//! - [`Format::ProcessXml`] - the process-notation XML interchange dialect,
//!   including its diagram-interchange (shape position) section.
//! - [`Format::SqlDdl`] - `CREATE TABLE` scripts for the entity-relationship
//!   notation, in one of three [`Dialect`]s.
//! - [`Format::JsonPackage`] - the lossless JSON package.
//!
//! Importers return the graph together with warnings for constructs that were
//! skipped; input that does not parse at all fails with a
//! [`MalformedInputError`](error::MalformedInputError). Exporters check that
//! the graph fits the format before writing anything.
//!
//! # Example
//!
//! ```
//! use schematic_interchange::{Dialect, Format};
//!
//! let sql = "CREATE TABLE author (id INT PRIMARY KEY, name VARCHAR(80) NOT NULL);";
//! let imported = schematic_interchange::import(Format::SqlDdl, Some(Dialect::Mysql), sql).unwrap();
//! assert_eq!(imported.graph.nodes().len(), 1);
//!
//! let json = schematic_interchange::export(Format::JsonPackage, None, &imported.graph).unwrap();
//! assert!(json.contains("\"author\""));
//! ```

pub mod error;
pub mod json_package;
pub mod process_xml;
pub mod sql;

mod span;

pub use span::{Span, line_col, offset_of};
pub use sql::Dialect;

use std::{fmt, str::FromStr};

use log::{debug, info};

use schematic_core::{Graph, Notation, UnknownKeywordError};

use error::{Diagnostic, ExportError, MalformedInputError};

/// A foreign text format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    ProcessXml,
    SqlDdl,
    JsonPackage,
}

impl Format {
    /// Returns the canonical keyword for this format.
    pub fn as_str(self) -> &'static str {
        match self {
            Format::ProcessXml => "process-xml",
            Format::SqlDdl => "sql-ddl",
            Format::JsonPackage => "json-package",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = UnknownKeywordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "process-xml" | "bpmn" | "xml" => Ok(Format::ProcessXml),
            "sql-ddl" | "sql" | "ddl" => Ok(Format::SqlDdl),
            "json-package" | "json" => Ok(Format::JsonPackage),
            _ => Err(UnknownKeywordError::new("format", s)),
        }
    }
}

/// The result of a successful import.
#[derive(Debug, Clone)]
pub struct Imported {
    /// The imported graph.
    pub graph: Graph,
    /// The notation most imported nodes belong to.
    pub notation_guess: Option<Notation>,
    /// Constructs that were skipped, as warning diagnostics.
    pub warnings: Vec<Diagnostic>,
}

impl Imported {
    pub(crate) fn new(graph: Graph, warnings: Vec<Diagnostic>) -> Self {
        let notation_guess = graph.notation_guess();
        Self {
            graph,
            notation_guess,
            warnings,
        }
    }
}

/// Exporter settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    emit_indexes: bool,
    header: bool,
    pretty: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            emit_indexes: false,
            header: true,
            pretty: true,
        }
    }
}

impl ExportOptions {
    /// SQL: emit one `CREATE INDEX` per foreign-key column.
    pub fn with_emit_indexes(mut self, emit_indexes: bool) -> Self {
        self.emit_indexes = emit_indexes;
        self
    }

    /// SQL: emit the leading comment block.
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    /// JSON: indent the output.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn emit_indexes(&self) -> bool {
        self.emit_indexes
    }

    pub fn header(&self) -> bool {
        self.header
    }

    pub fn pretty(&self) -> bool {
        self.pretty
    }
}

/// Import `text` written in `format`.
///
/// # Arguments
///
/// * `format` - The format `text` is written in.
/// * `dialect` - SQL dialect; ignored by the other formats. Defaults to
///   [`Dialect::Postgresql`].
/// * `text` - The document.
///
/// # Errors
///
/// Returns [`MalformedInputError`] if `text` does not parse.
pub fn import(
    format: Format,
    dialect: Option<Dialect>,
    text: &str,
) -> Result<Imported, MalformedInputError> {
    info!(format:% = format, bytes = text.len(); "Importing");

    let imported = match format {
        Format::ProcessXml => process_xml::import(text),
        Format::SqlDdl => sql::import(text, dialect.unwrap_or_default()),
        Format::JsonPackage => json_package::import(text),
    }?;

    debug!(
        nodes = imported.graph.nodes().len(),
        edges = imported.graph.edges().len(),
        warnings = imported.warnings.len();
        "Import finished"
    );
    Ok(imported)
}

/// Export `graph` as `format` with default [`ExportOptions`].
///
/// # Errors
///
/// Returns [`ExportError::Precondition`] if the graph contains node or edge
/// kinds the format cannot represent.
pub fn export(
    format: Format,
    dialect: Option<Dialect>,
    graph: &Graph,
) -> Result<String, ExportError> {
    export_with(format, dialect, graph, &ExportOptions::default())
}

/// Export `graph` as `format`.
///
/// # Errors
///
/// Returns [`ExportError::Precondition`] if the graph contains node or edge
/// kinds the format cannot represent, and [`ExportError::Write`] if the
/// serializer fails.
pub fn export_with(
    format: Format,
    dialect: Option<Dialect>,
    graph: &Graph,
    options: &ExportOptions,
) -> Result<String, ExportError> {
    info!(
        format:% = format,
        nodes = graph.nodes().len(),
        edges = graph.edges().len();
        "Exporting"
    );

    match format {
        Format::ProcessXml => process_xml::export(graph),
        Format::SqlDdl => sql::export(graph, dialect.unwrap_or_default(), options),
        Format::JsonPackage => json_package::export(graph, options.pretty()),
    }
}
