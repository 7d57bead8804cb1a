//! Error types for Schematic operations.
//!
//! This module provides the main error type [`SchematicError`] which wraps
//! the importer and exporter failures of a conversion along with the I/O
//! and configuration failures of the surrounding application.

use std::io;

use thiserror::Error;

use schematic_interchange::error::{ExportError, MalformedInputError};

/// The main error type for Schematic operations.
///
/// # Diagnostic Variants
///
/// The `Import` variant keeps the source text next to the diagnostics so
/// callers can render labelled snippets.
#[derive(Debug, Error)]
pub enum SchematicError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("{err}")]
    Import { err: MalformedInputError, src: String },

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

impl SchematicError {
    /// Create a new `Import` error with the associated source text.
    pub fn new_import_error(err: MalformedInputError, src: impl Into<String>) -> Self {
        Self::Import {
            err,
            src: src.into(),
        }
    }
}
