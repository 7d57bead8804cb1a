//! The fatal export error.

use thiserror::Error;

/// Errors returned by exporters. Export is all-or-nothing: no text is
/// produced when an error is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// The graph contains elements the target format cannot represent.
    #[error("cannot export to {format}: {message}")]
    Precondition {
        format: &'static str,
        message: String,
    },

    /// The serializer failed.
    #[error("failed to write {format}: {message}")]
    Write {
        format: &'static str,
        message: String,
    },
}

impl ExportError {
    pub(crate) fn precondition(format: &'static str, message: impl Into<String>) -> Self {
        Self::Precondition {
            format,
            message: message.into(),
        }
    }

    pub(crate) fn write(format: &'static str, message: impl ToString) -> Self {
        Self::Write {
            format,
            message: message.to_string(),
        }
    }

    /// Returns `true` for precondition failures.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition { .. })
    }
}
