//! Collector for accumulating diagnostics during an import phase.

use crate::error::{Diagnostic, MalformedInputError};

/// Accumulates diagnostics so a phase can report every problem at once
/// instead of stopping at the first one.
#[derive(Debug, Default)]
pub(crate) struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub(crate) fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Finish collection.
    ///
    /// - If any error was emitted, returns a [`MalformedInputError`] holding
    ///   only the error diagnostics.
    /// - Otherwise returns the (warning) diagnostics.
    pub(crate) fn finish(self) -> Result<Vec<Diagnostic>, MalformedInputError> {
        if self.has_errors {
            let errors: Vec<Diagnostic> = self
                .diagnostics
                .into_iter()
                .filter(|d| d.severity().is_error())
                .collect();
            Err(MalformedInputError::new(errors))
        } else {
            Ok(self.diagnostics)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_empty_is_ok() {
        let collector = DiagnosticCollector::new();
        assert!(collector.finish().unwrap().is_empty());
    }

    #[test]
    fn test_collector_warnings_are_returned() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::warning("one"));
        collector.emit(Diagnostic::warning("two"));

        let warnings = collector.finish().unwrap();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| !w.severity().is_error()));
    }

    #[test]
    fn test_collector_errors_drop_warnings() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::error("error 1"));
        collector.emit(Diagnostic::warning("warning 1"));
        collector.emit(Diagnostic::error("error 2"));

        let err = collector.finish().unwrap_err();
        assert_eq!(err.diagnostics().len(), 2);
        assert_eq!(err.diagnostics()[1].message(), "error 2");
    }
}
