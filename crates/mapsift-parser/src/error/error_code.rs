//! Error codes for the mapsift diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E00x` - Markup errors (reading individual tags, comments, entities)
//! - `E01x` - Tree errors (nesting of elements)
//! - `E1xx` - Map structure findings (expected sections of a map document)

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Markup Errors (E00x)
    // =========================================================================
    /// Unexpected character.
    ///
    /// A `<` was found that does not start any known kind of markup.
    E001,

    /// Malformed tag.
    ///
    /// A start or end tag has an invalid name, a broken attribute, or is
    /// missing its closing `>`.
    E002,

    /// Unterminated markup.
    ///
    /// A comment, CDATA section, processing instruction or DOCTYPE was opened
    /// but never closed.
    E003,

    /// Invalid entity reference.
    ///
    /// An `&` does not start one of the predefined entities (`&amp;`, `&lt;`,
    /// `&gt;`, `&quot;`, `&apos;`) or a valid numeric character reference.
    E004,

    // =========================================================================
    // Tree Errors (E01x)
    // =========================================================================
    /// Mismatched closing tag.
    ///
    /// A closing tag does not match the innermost open element.
    E010,

    /// Unclosed element.
    ///
    /// The document ended while an element was still open.
    E011,

    /// Missing root element.
    ///
    /// The document contains no element at all.
    E012,

    /// Content outside the root element.
    ///
    /// A document must have exactly one top-level element, surrounded only
    /// by whitespace, comments and processing instructions.
    E013,

    // =========================================================================
    // Map Structure (E1xx)
    // =========================================================================
    /// Unexpected root element.
    ///
    /// The top-level element is not `<map>`.
    E100,

    /// Missing symbols section.
    ///
    /// No `<symbols>` element was found; every object will be treated as
    /// referencing an unknown symbol.
    E101,

    /// Missing objects section.
    ///
    /// No `<objects>` element was found; the map has nothing to filter.
    E102,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E010 => "E010",
            ErrorCode::E011 => "E011",
            ErrorCode::E012 => "E012",
            ErrorCode::E013 => "E013",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unexpected character",
            ErrorCode::E002 => "malformed tag",
            ErrorCode::E003 => "unterminated markup",
            ErrorCode::E004 => "invalid entity reference",
            ErrorCode::E010 => "mismatched closing tag",
            ErrorCode::E011 => "unclosed element",
            ErrorCode::E012 => "missing root element",
            ErrorCode::E013 => "content outside root element",
            ErrorCode::E100 => "unexpected root element",
            ErrorCode::E101 => "missing symbols section",
            ErrorCode::E102 => "missing objects section",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
