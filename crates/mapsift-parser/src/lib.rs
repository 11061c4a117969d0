//! # mapsift Parser
//!
//! Reader and writer for OpenOrienteering Mapper XML map documents. This
//! crate provides the document layer of mapsift:
//!
//! 1. **Scan** - Split source text into markup items with byte spans
//! 2. **Read** - Build an element tree, checking nesting and decoding entities
//! 3. **Extract** - Pull symbol and object records out of the tree
//! 4. **Rebuild** - Remove or annotate objects and write the document back
//!
//! ## Usage
//!
//! ```
//! # use mapsift_parser::{MapDocument, ObjectEdit, ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"<?xml version="1.0"?>
//! <map>
//!   <symbols count="1"><symbol id="0" name="Building"/></symbols>
//!   <parts><part><objects count="1">
//!     <object symbol="0"><coords>0 0;10 0;10 10</coords></object>
//!   </objects></part></parts>
//! </map>"#;
//!
//!     let mut document = MapDocument::parse(source)?;
//!     assert_eq!(document.symbols().len(), 1);
//!     assert_eq!(document.objects().len(), 1);
//!
//!     document.rebuild(|_| ObjectEdit::Remove);
//!     assert!(document.to_xml().contains(r#"<objects count="0">"#));
//!     Ok(())
//! }
//! ```

mod document;
pub mod error;
mod markup;
mod reader;
mod span;
pub mod tree;
mod writer;

pub use document::{MapDocument, ObjectEdit};
pub use error::ParseError;
pub use reader::read;
pub use span::Span;
pub use writer::write;
