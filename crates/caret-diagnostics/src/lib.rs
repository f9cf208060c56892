//! Caret Diagnostics - problems reported by inspections.
//!
//! - `Diagnostic` - code, severity, message and labelled spans
//! - `span` - source spans, labels and line/column resolution
//! - `render` - terminal rendering with color support
//!
//! # Example
//!
//! ```rust
//! use caret_diagnostics::{Diagnostic, DiagnosticSeverity};
//! use caret_diagnostics::span::SourceSpan;
//!
//! let diagnostic = Diagnostic::warning("W0001", "Expected type 'int', got 'String' instead")
//!     .with_primary_span(SourceSpan::new("Main.java", 40, 46), "")
//!     .with_secondary_span(SourceSpan::new("Main.java", 20, 21), "parameter declared here");
//!
//! assert_eq!(diagnostic.severity, DiagnosticSeverity::Warning);
//! assert_eq!(diagnostic.primary_span().map(|s| s.start), Some(40));
//! ```

pub mod render;
pub mod span;

use span::{LabelStyle, MultiSpan, SourceSpan};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

impl DiagnosticSeverity {
    pub fn prefix(&self) -> &'static str {
        match self {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
        }
    }

    /// Marker drawn under a primary label
    pub fn underline_char(&self) -> char {
        match self {
            DiagnosticSeverity::Error => '^',
            DiagnosticSeverity::Warning => '~',
        }
    }
}

/// A problem found in source code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Identifier of the check that produced it (e.g. "W0001")
    pub code: Option<String>,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub spans: MultiSpan,
}

impl Diagnostic {
    pub fn new(
        severity: DiagnosticSeverity,
        code: impl Into<Option<String>>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            severity,
            message: message.into(),
            spans: MultiSpan::new(),
        }
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Warning, Some(code.into()), message)
    }

    pub fn with_primary_span(mut self, span: SourceSpan, message: impl Into<String>) -> Self {
        self.spans.push(span, message, LabelStyle::Primary);
        self
    }

    /// Points at a related location, such as the declaration involved.
    pub fn with_secondary_span(mut self, span: SourceSpan, message: impl Into<String>) -> Self {
        self.spans.push(span, message, LabelStyle::Secondary);
        self
    }

    pub fn primary_span(&self) -> Option<&SourceSpan> {
        self.spans.primary_span()
    }
}

pub type DiagnosticResult<T> = Result<T, DiagnosticError>;

/// Errors that can occur while rendering diagnostics.
#[derive(Debug, Error)]
pub enum DiagnosticError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("source file not found: {0}")]
    SourceNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_warning() {
        let diag = Diagnostic::warning("W0001", "type mismatch");
        assert_eq!(diag.severity.prefix(), "warning");
        assert_eq!(diag.code, Some("W0001".to_string()));
        assert!(diag.primary_span().is_none());
    }

    #[test]
    fn test_secondary_span_does_not_become_primary() {
        let diag = Diagnostic::warning("W0001", "type mismatch")
            .with_secondary_span(SourceSpan::new("A.java", 50, 60), "parameter declared here")
            .with_primary_span(SourceSpan::new("A.java", 10, 20), "");
        assert_eq!(diag.primary_span().map(|s| s.start), Some(10));
        assert_eq!(diag.spans.labels().len(), 2);
    }
}
