//! Configuration types for Schematic conversions.
//!
//! This module provides configuration structures that control how documents
//! are imported and exported. All types implement [`serde::Deserialize`] for
//! loading from external sources; every section and field is optional.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining import and export settings.
//! - [`ImportConfig`] - Settings applied when reading documents.
//! - [`ExportConfig`] - Per-format settings applied when writing documents.
//!
//! # Example
//!
//! ```
//! # use schematic::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.export().json().pretty());
//! assert!(config.export().sql().header());
//! ```

use serde::Deserialize;

use schematic_interchange::{Dialect, ExportOptions};

/// Top-level application configuration.
///
/// ```toml
/// [import]
/// dialect = "mysql"
///
/// [export.sql]
/// dialect = "postgresql"
/// emit_indexes = true
///
/// [export.json]
/// pretty = false
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Import configuration section.
    #[serde(default)]
    import: ImportConfig,

    /// Export configuration section.
    #[serde(default)]
    export: ExportConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(import: ImportConfig, export: ExportConfig) -> Self {
        Self { import, export }
    }

    /// Returns the import configuration.
    pub fn import(&self) -> &ImportConfig {
        &self.import
    }

    /// Returns the export configuration.
    pub fn export(&self) -> &ExportConfig {
        &self.export
    }
}

/// Settings applied when reading documents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportConfig {
    /// SQL dialect of imported scripts. Defaults to PostgreSQL.
    #[serde(default)]
    dialect: Dialect,
}

impl ImportConfig {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }
}

/// Per-format export settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    sql: SqlExportConfig,

    #[serde(default)]
    json: JsonExportConfig,
}

impl ExportConfig {
    pub fn new(sql: SqlExportConfig, json: JsonExportConfig) -> Self {
        Self { sql, json }
    }

    pub fn sql(&self) -> &SqlExportConfig {
        &self.sql
    }

    pub fn json(&self) -> &JsonExportConfig {
        &self.json
    }

    /// Folds both sections into the exporter settings.
    pub fn options(&self) -> ExportOptions {
        ExportOptions::default()
            .with_emit_indexes(self.sql.emit_indexes)
            .with_header(self.sql.header)
            .with_pretty(self.json.pretty)
    }
}

/// SQL script settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SqlExportConfig {
    /// Target dialect.
    #[serde(default)]
    dialect: Dialect,

    /// Emit a `CREATE INDEX` for every foreign-key column.
    #[serde(default)]
    emit_indexes: bool,

    /// Emit the leading comment block.
    #[serde(default = "enabled")]
    header: bool,
}

impl SqlExportConfig {
    pub fn new(dialect: Dialect, emit_indexes: bool, header: bool) -> Self {
        Self {
            dialect,
            emit_indexes,
            header,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn emit_indexes(&self) -> bool {
        self.emit_indexes
    }

    pub fn header(&self) -> bool {
        self.header
    }
}

impl Default for SqlExportConfig {
    fn default() -> Self {
        Self::new(Dialect::default(), false, true)
    }
}

/// JSON package settings.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonExportConfig {
    /// Indent the package.
    #[serde(default = "enabled")]
    pretty: bool,
}

impl JsonExportConfig {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn pretty(&self) -> bool {
        self.pretty
    }
}

impl Default for JsonExportConfig {
    fn default() -> Self {
        Self::new(true)
    }
}

fn enabled() -> bool {
    true
}
