//! Error and diagnostic system for the Schematic importers and exporters.
//!
//! This module provides:
//! - Diagnostic codes for documentation and searchability
//! - Multiple labeled spans for rich error context
//! - A collector for phases that report several problems at once
//! - The two fatal error types: [`MalformedInputError`] for import and
//!   [`ExportError`] for export
//!
//! # Overview
//!
//! Importers describe every problem as a [`Diagnostic`]. Error-severity
//! diagnostics abort the import and are returned inside a
//! [`MalformedInputError`]; warning-severity diagnostics describe constructs
//! that were skipped and are returned next to the imported graph.
//!
//! # Example
//!
//! ```
//! # use schematic_interchange::error::{Diagnostic, DiagnosticCode};
//! # use schematic_interchange::Span;
//!
//! let diag = Diagnostic::warning("unsupported element `customThing` skipped")
//!     .with_code(DiagnosticCode::W001)
//!     .with_label(Span::new(120..140), "skipped")
//!     .with_help("only the process subset of the notation is imported");
//! ```

mod collector;
mod diagnostic;
mod diagnostic_code;
mod export_error;
mod label;
mod malformed_input;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use diagnostic_code::DiagnosticCode;
pub use export_error::ExportError;
pub use label::Label;
pub use malformed_input::MalformedInputError;
