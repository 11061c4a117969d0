//! Error types for mapsift operations.
//!
//! [`MapSiftError`] covers the fatal failures of a run. Problems inside a
//! well-formed map (unusable symbol ids, bad coordinates, missing sections)
//! are never fatal; they are logged and surface in the
//! [`SiftReport`](crate::SiftReport).

use std::io;

use thiserror::Error;

use mapsift_parser::ParseError;

/// The main error type for mapsift operations.
///
/// The `Parse` variant keeps the source text next to the diagnostics so
/// their spans can be rendered against it.
#[derive(Debug, Error)]
pub enum MapSiftError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Configuration error: {0}")]
    Config(Box<dyn std::error::Error + Send + Sync>),
}

impl MapSiftError {
    /// Create a new `Parse` error with the associated source text.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
