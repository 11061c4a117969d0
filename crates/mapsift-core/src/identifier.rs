//! Numeric identifiers for symbols and map objects.
//!
//! Map documents carry every numeric field as text. This module provides the
//! typed identifiers the rest of mapsift works with, and the parsing rules
//! that turn document text into them.

use std::{fmt, num::ParseIntError, str::FromStr};

use thiserror::Error;

/// Error returned when an identifier attribute is not a valid integer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidId {
    #[error("identifier is empty")]
    Empty,

    #[error("identifier `{text}` is not an integer: {source}")]
    NotNumeric {
        text: String,
        #[source]
        source: ParseIntError,
    },
}

/// Identifier of a symbol definition.
///
/// Symbol ids are signed because documents use `-1` for objects that lost
/// their symbol.
///
/// # Examples
///
/// ```
/// # use mapsift_core::identifier::SymbolId;
/// let id: SymbolId = " 42 ".parse().unwrap();
/// assert_eq!(id.value(), 42);
/// assert!("road".parse::<SymbolId>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(i32);

impl SymbolId {
    /// Creates a symbol id from its numeric value
    pub fn new(value: i32) -> Self {
        Self(value)
    }

    /// Returns the numeric value
    pub fn value(self) -> i32 {
        self.0
    }

    /// Parses an optional attribute value, treating absence and garbage alike.
    pub fn parse_attr(text: Option<&str>) -> Result<Self, InvalidId> {
        text.ok_or(InvalidId::Empty)?.parse()
    }
}

impl FromStr for SymbolId {
    type Err = InvalidId;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(InvalidId::Empty);
        }

        trimmed
            .parse::<i32>()
            .map(Self)
            .map_err(|source| InvalidId::NotNumeric {
                text: trimmed.to_string(),
                source,
            })
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a map object within one document.
///
/// The id is the object's ordinal in the document's object sequence, counted
/// across all map parts in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(usize);

impl ObjectId {
    /// Creates an object id from its ordinal
    pub fn new(ordinal: usize) -> Self {
        Self(ordinal)
    }

    /// Returns the ordinal
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
