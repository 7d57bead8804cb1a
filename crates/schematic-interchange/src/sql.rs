//! SQL table-definition scripts for the entity-relationship notation.
//!
//! # Pipeline
//!
//! ```text
//! script ──lexer──▶ tokens ──parser──▶ statements ──import──▶ Graph
//! Graph ──export──▶ script
//! ```
//!
//! The lexer reports every lexical error at once. Each statement is parsed
//! on its own, so one malformed `CREATE TABLE` does not hide errors in the
//! next one. Statements outside the supported subset are skipped with a
//! warning.

mod ast;
mod dialect;
mod export;
mod import;
mod lexer;
mod parser;
mod tokens;

pub use dialect::Dialect;

use schematic_core::Graph;

use crate::{
    ExportOptions, Imported,
    error::{ExportError, MalformedInputError},
};

/// Import a DDL script written in `dialect`.
///
/// # Errors
///
/// Returns [`MalformedInputError`] for lexical errors and for `CREATE TABLE`
/// or foreign-key `ALTER TABLE` statements that do not parse.
pub fn import(text: &str, dialect: Dialect) -> Result<Imported, MalformedInputError> {
    import::import(text, dialect)
}

/// Export an entity-relationship graph as a DDL script for `dialect`.
///
/// # Errors
///
/// Returns [`ExportError::Precondition`] if the graph holds nodes or edges
/// outside the entity-relationship notation.
pub fn export(
    graph: &Graph,
    dialect: Dialect,
    options: &ExportOptions,
) -> Result<String, ExportError> {
    export::export(graph, dialect, options)
}
