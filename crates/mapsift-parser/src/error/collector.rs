//! Collector for accumulating diagnostics while reading a document.

use crate::error::{Diagnostic, ParseError};

/// Accumulates diagnostics so a single pass can report every problem.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Returns true if an error has been emitted
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Consume the collector, returning everything emitted so far.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Finish collection.
    ///
    /// - If there are errors, returns `Err(ParseError)` with all diagnostics.
    /// - Otherwise returns the warnings.
    pub fn finish(self) -> Result<Vec<Diagnostic>, ParseError> {
        if self.has_errors {
            Err(ParseError::new(self.diagnostics))
        } else {
            Ok(self.diagnostics)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_new_finish_ok() {
        let collector = DiagnosticCollector::new();
        assert!(collector.finish().unwrap().is_empty());
    }

    #[test]
    fn test_collector_emit_error_finish_err() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::warning("warning 1"));
        collector.emit(Diagnostic::error("error 1"));

        assert!(collector.has_errors());
        let err = collector.finish().unwrap_err();
        assert_eq!(err.diagnostics().len(), 2);
    }

    #[test]
    fn test_collector_warnings_are_returned() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::warning("warning 1"));
        collector.emit(Diagnostic::warning("warning 2"));

        assert!(!collector.has_errors());
        let warnings = collector.finish().unwrap();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[1].message(), "warning 2");
    }
}
