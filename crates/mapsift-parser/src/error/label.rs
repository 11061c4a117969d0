//! Labeled source spans for diagnostic messages.

use crate::span::Span;

/// A labeled span in the source document.
///
/// - **Primary labels** mark the main location of an error or warning.
/// - **Secondary labels** provide context, such as "element opened here".
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a new primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a new secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    /// Get the span this label applies to.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Get the label message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if this is a primary label.
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    /// Check if this is a secondary label.
    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_label() {
        let label = Label::primary(Span::new(14..21), "expected `</map>`");

        assert_eq!(label.span().start(), 14);
        assert_eq!(label.span().end(), 21);
        assert_eq!(label.message(), "expected `</map>`");
        assert!(label.is_primary());
        assert!(!label.is_secondary());
    }

    #[test]
    fn test_secondary_label() {
        let label = Label::secondary(Span::new(0..5), "element opened here");

        assert_eq!(label.span().start(), 0);
        assert_eq!(label.span().end(), 5);
        assert_eq!(label.message(), "element opened here");
        assert!(label.is_secondary());
        assert!(!label.is_primary());
    }
}
