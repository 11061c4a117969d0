//! Error and diagnostic system for the mapsift document reader.
//!
//! This module provides:
//! - Error codes for documentation and searchability
//! - Multiple labeled spans for rich error context
//! - Severity levels
//! - Diagnostic collector for accumulating multiple errors
//!
//! # Overview
//!
//! A [`Diagnostic`] represents a single error or warning with an optional
//! error code, source locations, and help text. Fatal diagnostics are wrapped
//! in [`ParseError`]; warnings travel alongside a successfully read document.
//!
//! # Example
//!
//! ```
//! # use mapsift_parser::error::{Diagnostic, ErrorCode};
//! # use mapsift_parser::Span;
//!
//! let diag = Diagnostic::error("closing tag `</part>` does not match `<objects>`")
//!     .with_code(ErrorCode::E010)
//!     .with_label(Span::new(120..127), "unexpected closing tag")
//!     .with_secondary_label(Span::new(40..49), "element opened here")
//!     .with_help("close `<objects>` before `</part>`");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
