//! The fatal import error.

use std::fmt;

use crate::error::Diagnostic;

/// Input text that does not parse under the target format's grammar.
///
/// Wraps one or more error diagnostics. Nothing is imported when this error
/// is returned.
#[derive(Debug, Clone)]
pub struct MalformedInputError {
    diagnostics: Vec<Diagnostic>,
}

impl MalformedInputError {
    /// Create a new error from diagnostics.
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Get all diagnostics in this error.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Message of the first diagnostic.
    pub fn message(&self) -> &str {
        self.diagnostics
            .first()
            .map_or("malformed input", Diagnostic::message)
    }

    /// Byte offset of the first diagnostic, when the parser could locate it.
    pub fn offset(&self) -> Option<usize> {
        self.diagnostics.iter().find_map(Diagnostic::offset)
    }
}

impl fmt::Display for MalformedInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(first) = self.diagnostics.first() {
            write!(f, "{first}")?;
            if self.diagnostics.len() > 1 {
                write!(f, " (+{} more)", self.diagnostics.len() - 1)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for MalformedInputError {}

impl From<Diagnostic> for MalformedInputError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

impl From<Vec<Diagnostic>> for MalformedInputError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::DiagnosticCode, span::Span};

    #[test]
    fn test_from_diagnostic() {
        let err: MalformedInputError = Diagnostic::error("bad tag")
            .with_code(DiagnosticCode::E001)
            .with_label(Span::new(7..9), "here")
            .into();

        assert_eq!(err.diagnostics().len(), 1);
        assert_eq!(err.message(), "bad tag");
        assert_eq!(err.offset(), Some(7));
    }

    #[test]
    fn test_display_counts_extra() {
        let err = MalformedInputError::from(vec![
            Diagnostic::error("first"),
            Diagnostic::error("second"),
            Diagnostic::error("third"),
        ]);
        assert_eq!(err.to_string(), "error: first (+2 more)");
        assert_eq!(err.offset(), None);
    }
}
