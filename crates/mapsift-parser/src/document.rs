//! Map documents: symbol and object records on top of the element tree.
//!
//! A map document has the shape
//!
//! ```text
//! <map>
//!   <barrier>                      (optional)
//!     <symbols count="N">
//!       <symbol id="3" name="Lake"> <line_symbol .../> </symbol>
//!     </symbols>
//!     <parts>
//!       <part>
//!         <objects count="M">
//!           <object symbol="3"> <coords>x y;x y;...</coords> </object>
//!         </objects>
//!       </part>
//!     </parts>
//!   </barrier>
//! </map>
//! ```
//!
//! Objects are numbered with [`ObjectId`]s in document order across all
//! parts. [`MapDocument::objects`] and [`MapDocument::rebuild`] walk the
//! tree in the same order, so an id handed out by one identifies the same
//! element in the other.

use log::debug;
use mapsift_core::{
    identifier::ObjectId,
    object::ObjectRecord,
    symbol::{GeometryFlags, SymbolRecord},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    reader,
    tree::{Element, Node, XmlDocument},
    writer,
};

const MAP: &str = "map";
const SYMBOLS: &str = "symbols";
const SYMBOL: &str = "symbol";
const OBJECTS: &str = "objects";
const OBJECT: &str = "object";
const COORDS: &str = "coords";

const POINT_MARKERS: &[&str] = &["point_symbol", "point"];
const LINE_MARKERS: &[&str] = &["line_symbol", "line"];

/// What to do with one object when the document is rebuilt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectEdit {
    /// Write the object unchanged
    Keep,
    /// Write the object with an `opacity` attribute
    SetOpacity(f64),
    /// Leave the object out
    Remove,
}

/// A parsed map document.
#[derive(Debug, Clone)]
pub struct MapDocument {
    xml: XmlDocument,
    warnings: Vec<Diagnostic>,
}

impl MapDocument {
    /// Parse map source text.
    ///
    /// Fails when the text is not well-formed XML. A well-formed document
    /// that lacks the expected sections parses successfully and carries
    /// warnings instead.
    ///
    /// # Example
    ///
    /// ```
    /// # use mapsift_parser::MapDocument;
    /// let document = MapDocument::parse(
    ///     r#"<map><symbols><symbol id="1" name="Road"/></symbols><parts/></map>"#,
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(document.symbols().len(), 1);
    /// assert!(document.objects().is_empty());
    /// assert_eq!(document.warnings().len(), 1);
    /// ```
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let xml = reader::read(source)?;
        let warnings = check_structure(&xml)?;
        debug!(warnings = warnings.len(); "Map document parsed");
        Ok(Self { xml, warnings })
    }

    /// Structure warnings found while parsing
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// The underlying element tree
    pub fn xml(&self) -> &XmlDocument {
        &self.xml
    }

    /// Symbol records: the direct `symbol` children of the first `symbols` element.
    pub fn symbols(&self) -> Vec<SymbolRecord> {
        let Some(symbols) = self.xml.root().find(SYMBOLS) else {
            return Vec::new();
        };

        symbols
            .child_elements()
            .filter(|element| element.name() == SYMBOL)
            .map(|element| SymbolRecord {
                id: element.attribute("id").map(str::to_string),
                name: element.attribute("name").unwrap_or_default().to_string(),
                geometry: GeometryFlags::new(
                    element.has_descendant(POINT_MARKERS),
                    element.has_descendant(LINE_MARKERS),
                ),
            })
            .collect()
    }

    /// Object records in document order; the index of a record is its [`ObjectId`].
    pub fn objects(&self) -> Vec<ObjectRecord> {
        let mut records = Vec::new();
        collect_objects(self.xml.root(), &mut records);
        records
    }

    /// Apply an edit to every object, in the order of [`MapDocument::objects`].
    ///
    /// Removed objects take their leading whitespace with them. The `count`
    /// attribute of every `objects` element is updated to what remains.
    ///
    /// # Example
    ///
    /// ```
    /// # use mapsift_parser::{MapDocument, ObjectEdit};
    /// let mut document = MapDocument::parse(
    ///     r#"<map><symbols/><objects count="2"><object symbol="1"/><object symbol="2"/></objects></map>"#,
    /// )
    /// .unwrap();
    ///
    /// document.rebuild(|id| if id.index() == 0 { ObjectEdit::Remove } else { ObjectEdit::SetOpacity(0.5) });
    /// assert_eq!(
    ///     document.to_xml(),
    ///     r#"<map><symbols/><objects count="1"><object symbol="2" opacity="0.5"/></objects></map>"#
    /// );
    /// ```
    pub fn rebuild(&mut self, mut edit: impl FnMut(ObjectId) -> ObjectEdit) {
        let mut next = 0;
        rebuild_objects(self.xml.root_mut(), &mut next, &mut edit);
        debug!(objects = next; "Map document rebuilt");
    }

    /// Serialize the document
    pub fn to_xml(&self) -> String {
        writer::write(&self.xml)
    }
}

/// Report expected sections that are missing.
fn check_structure(xml: &XmlDocument) -> Result<Vec<Diagnostic>, ParseError> {
    let mut diagnostics = DiagnosticCollector::new();
    let root = xml.root();

    if root.name() != MAP {
        diagnostics.emit(
            Diagnostic::warning(format!("root element is `<{}>`, not `<map>`", root.name()))
                .with_code(ErrorCode::E100)
                .with_label(root.span(), ErrorCode::E100.description()),
        );
    }
    if root.find(SYMBOLS).is_none() {
        diagnostics.emit(
            Diagnostic::warning("document has no `<symbols>` section")
                .with_code(ErrorCode::E101)
                .with_label(root.span(), ErrorCode::E101.description())
                .with_help("objects will not match any symbol"),
        );
    }
    if root.find(OBJECTS).is_none() {
        diagnostics.emit(
            Diagnostic::warning("document has no `<objects>` section")
                .with_code(ErrorCode::E102)
                .with_label(root.span(), ErrorCode::E102.description()),
        );
    }

    diagnostics.finish()
}

fn object_record(element: &Element) -> ObjectRecord {
    ObjectRecord {
        symbol: element.attribute("symbol").map(str::to_string),
        coordinates: element
            .first_child(COORDS)
            .map(Element::text)
            .unwrap_or_default(),
    }
}

fn collect_objects(element: &Element, records: &mut Vec<ObjectRecord>) {
    if element.name() == SYMBOLS {
        return;
    }
    if element.name() == OBJECTS {
        records.extend(
            element
                .child_elements()
                .filter(|child| child.name() == OBJECT)
                .map(object_record),
        );
        return;
    }
    for child in element.child_elements() {
        collect_objects(child, records);
    }
}

fn rebuild_objects(
    element: &mut Element,
    next: &mut usize,
    edit: &mut impl FnMut(ObjectId) -> ObjectEdit,
) {
    if element.name() == SYMBOLS {
        return;
    }
    if element.name() == OBJECTS {
        rebuild_object_list(element, next, edit);
        return;
    }
    for child in element.children_mut().iter_mut().filter_map(Node::as_element_mut) {
        rebuild_objects(child, next, edit);
    }
}

fn rebuild_object_list(
    objects: &mut Element,
    next: &mut usize,
    edit: &mut impl FnMut(ObjectId) -> ObjectEdit,
) {
    let children = std::mem::take(objects.children_mut());
    let mut kept = Vec::with_capacity(children.len());
    let mut count = 0usize;

    for mut node in children {
        let is_object = matches!(&node, Node::Element(child) if child.name() == OBJECT);
        if !is_object {
            kept.push(node);
            continue;
        }

        let action = edit(ObjectId::new(*next));
        *next += 1;

        match action {
            ObjectEdit::Remove => {
                if kept.last().is_some_and(Node::is_whitespace) {
                    kept.pop();
                }
            }
            ObjectEdit::Keep => {
                count += 1;
                kept.push(node);
            }
            ObjectEdit::SetOpacity(opacity) => {
                if let Some(object) = node.as_element_mut() {
                    object.set_attribute("opacity", opacity.to_string());
                }
                count += 1;
                kept.push(node);
            }
        }
    }

    *objects.children_mut() = kept;
    if objects.attribute("count").is_some() {
        objects.set_attribute("count", count.to_string());
    }
}
