//! Schematic - diagram interchange and validation.
//!
//! Imports process, entity-relationship and data-flow diagrams from
//! process XML, SQL table definitions and the JSON package, exports them
//! back, and checks them against the well-formedness rules of their
//! notation.

pub mod config;
pub mod validate;

mod error;

pub use schematic_core::{Edge, EdgeKind, Graph, Node, NodeKind, Notation, Severity};
pub use schematic_interchange::{Dialect, Format, Imported, error::Diagnostic};

pub use error::SchematicError;
pub use validate::{ElementType, Issue, ValidationResult, validate};

use log::{debug, info, trace};

use config::AppConfig;

/// Output of [`Engine::convert`].
#[derive(Debug, Clone)]
pub struct Converted {
    /// The document in the target format.
    pub output: String,
    /// The imported graph.
    pub graph: Graph,
    /// Constructs the importer skipped.
    pub warnings: Vec<Diagnostic>,
}

/// Entry point wiring configuration into the importers, exporters and
/// validator.
///
/// # Examples
///
/// ```rust
/// use schematic::{Engine, Format, config::AppConfig};
///
/// let engine = Engine::new(AppConfig::default());
///
/// let sql = "CREATE TABLE author (id INT PRIMARY KEY, name TEXT);";
/// let converted = engine
///     .convert(Format::SqlDdl, Format::JsonPackage, sql)
///     .expect("Failed to convert");
/// assert!(converted.output.contains("\"entity\""));
///
/// let result = engine.validate(&converted.graph, None);
/// assert!(result.is_valid());
/// ```
#[derive(Debug, Default)]
pub struct Engine {
    config: AppConfig,
}

impl Engine {
    /// Create a new engine with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Import dialect and per-format export settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Import `text` written in `format`, reading SQL in the configured
    /// import dialect.
    ///
    /// # Errors
    ///
    /// Returns [`SchematicError::Import`] if `text` does not parse.
    pub fn import(&self, format: Format, text: &str) -> Result<Imported, SchematicError> {
        self.import_with(format, self.config.import().dialect(), text)
    }

    /// Import `text` written in `format`, reading SQL in `dialect`.
    ///
    /// # Errors
    ///
    /// Returns [`SchematicError::Import`] if `text` does not parse.
    pub fn import_with(
        &self,
        format: Format,
        dialect: Dialect,
        text: &str,
    ) -> Result<Imported, SchematicError> {
        let imported = schematic_interchange::import(format, Some(dialect), text)
            .map_err(|err| SchematicError::new_import_error(err, text))?;

        for warning in &imported.warnings {
            debug!(format:% = format, warning:% = warning; "Skipped construct during import");
        }
        trace!(graph:? = imported.graph; "Imported graph");
        Ok(imported)
    }

    /// Export `graph` as `format`, writing SQL in the configured export
    /// dialect.
    ///
    /// # Errors
    ///
    /// Returns [`SchematicError::Export`] if the graph cannot be written as
    /// `format`.
    pub fn export(&self, format: Format, graph: &Graph) -> Result<String, SchematicError> {
        self.export_with(format, self.config.export().sql().dialect(), graph)
    }

    /// Export `graph` as `format`, writing SQL in `dialect`.
    ///
    /// # Errors
    ///
    /// Returns [`SchematicError::Export`] if the graph cannot be written as
    /// `format`.
    pub fn export_with(
        &self,
        format: Format,
        dialect: Dialect,
        graph: &Graph,
    ) -> Result<String, SchematicError> {
        let options = self.config.export().options();
        let output = schematic_interchange::export_with(format, Some(dialect), graph, &options)?;
        debug!(format:% = format, bytes = output.len(); "Exported graph");
        Ok(output)
    }

    /// Import `text` as `from` and export the result as `to`.
    ///
    /// # Errors
    ///
    /// Returns [`SchematicError::Import`] if `text` does not parse and
    /// [`SchematicError::Export`] if the graph cannot be written as `to`.
    pub fn convert(&self, from: Format, to: Format, text: &str) -> Result<Converted, SchematicError> {
        info!(from:% = from, to:% = to; "Converting");
        let imported = self.import(from, text)?;
        let output = self.export(to, &imported.graph)?;
        Ok(Converted {
            output,
            graph: imported.graph,
            warnings: imported.warnings,
        })
    }

    /// Validate `graph` against `notation`, or against the notation most of
    /// its nodes belong to. A graph with no nodes has no issues.
    pub fn validate(&self, graph: &Graph, notation: Option<Notation>) -> ValidationResult {
        match notation.or_else(|| graph.notation_guess()) {
            Some(notation) => validate(notation, graph.nodes(), graph.edges()),
            None => ValidationResult::default(),
        }
    }
}
