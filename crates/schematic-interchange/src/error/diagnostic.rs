//! The core diagnostic type.
//!
//! A [`Diagnostic`] represents a single error or warning with an optional
//! code, labeled source spans, and help text.

use std::fmt;

use schematic_core::Severity;

use crate::{
    error::{DiagnosticCode, Label},
    span::Span,
};

/// A diagnostic message with source location information.
///
/// # Example
///
/// ```text
/// warning[W103]: foreign key `book.author_id` references unknown table `writer`
///   --> schema.sql:4:3
///    |
///  4 |   author_id INT REFERENCES writer(id),
///    |                            ^^^^^^ not defined in this script
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<DiagnosticCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use schematic_interchange::error::{Diagnostic, DiagnosticCode};
    /// # use schematic_interchange::Span;
    ///
    /// let diag = Diagnostic::error("unterminated string literal")
    ///     .with_code(DiagnosticCode::E100)
    ///     .with_label(Span::new(12..30), "string starts here")
    ///     .with_help("add a closing `'`");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the diagnostic code, if any.
    pub fn code(&self) -> Option<DiagnosticCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get all labels attached to this diagnostic.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Start offset of the first primary label.
    pub fn offset(&self) -> Option<usize> {
        self.labels
            .iter()
            .find(|label| label.is_primary())
            .map(|label| label.span().start())
    }

    /// Set the diagnostic code.
    pub fn with_code(mut self, code: DiagnosticCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E001]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{code}]")?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_error() {
        let diag = Diagnostic::error("test error");

        assert!(diag.severity().is_error());
        assert_eq!(diag.message(), "test error");
        assert!(diag.code().is_none());
        assert!(diag.labels().is_empty());
        assert!(diag.help().is_none());
        assert!(diag.offset().is_none());
    }

    #[test]
    fn test_diagnostic_builder() {
        let diag = Diagnostic::warning("duplicate table `user`")
            .with_code(DiagnosticCode::W104)
            .with_secondary_label(Span::new(0..10), "first defined here")
            .with_label(Span::new(40..50), "skipped")
            .with_help("rename or drop the second definition");

        assert!(diag.severity().is_warning());
        assert_eq!(diag.code(), Some(DiagnosticCode::W104));
        assert_eq!(diag.labels().len(), 2);
        assert_eq!(diag.offset(), Some(40));
        assert_eq!(diag.help(), Some("rename or drop the second definition"));
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::error("unexpected character").with_code(DiagnosticCode::E103);
        assert_eq!(diag.to_string(), "error[E103]: unexpected character");

        let diag = Diagnostic::warning("skipped");
        assert_eq!(diag.to_string(), "warning: skipped");
    }
}
