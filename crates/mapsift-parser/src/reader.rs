//! Builds an element tree from scanned markup.
//!
//! The builder checks nesting, decodes entity references in text and
//! attribute values, and separates the root element from the nodes around it.

use std::ops::Range;

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    markup::{self, Markup, PositionedMarkup},
    span::Span,
    tree::{Element, Node, XmlDocument},
};

/// Longest entity name accepted between `&` and `;` (`#x10FFFF`).
const MAX_ENTITY_LEN: usize = 8;

/// Read an XML document into an element tree.
///
/// # Example
///
/// ```
/// # use mapsift_parser::read;
/// let document = read(r#"<?xml version="1.0"?><map><symbols count="0"/></map>"#).unwrap();
/// assert_eq!(document.root().name(), "map");
/// assert_eq!(
///     document.root().first_child("symbols").and_then(|s| s.attribute("count")),
///     Some("0")
/// );
/// ```
pub fn read(source: &str) -> Result<XmlDocument, ParseError> {
    let items = markup::scan(source)?;

    let mut builder = TreeBuilder::new();
    for item in items {
        builder.push(item);
    }
    builder.finish()
}

/// Tracks open elements while markup is fed in document order.
struct TreeBuilder {
    prolog: Vec<Node>,
    root: Option<Element>,
    epilog: Vec<Node>,
    open: Vec<Element>,
    diagnostics: DiagnosticCollector,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            prolog: Vec::new(),
            root: None,
            epilog: Vec::new(),
            open: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    fn push(&mut self, item: PositionedMarkup<'_>) {
        let span = item.span;
        match item.markup {
            Markup::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let mut element = Element::new(name).with_span(span);
                for attribute in attributes {
                    let value = self.decode(attribute.value, attribute.value_span.start());
                    element.set_attribute(attribute.name, value);
                }

                if self_closing {
                    self.attach(Node::Element(element), span);
                } else {
                    self.open.push(element);
                }
            }
            Markup::EndTag(name) => self.close(name, span),
            Markup::Text(raw) => {
                let text = self.decode(raw, span.start());
                self.attach(Node::Text(text), span);
            }
            Markup::Comment(text) => self.attach(Node::Comment(text.to_string()), span),
            Markup::CData(text) => self.attach(Node::CData(text.to_string()), span),
            Markup::ProcessingInstruction(text) => {
                self.attach(Node::ProcessingInstruction(text.to_string()), span)
            }
            Markup::Doctype(text) => self.attach(Node::Doctype(text.to_string()), span),
        }
    }

    /// Add a finished node to the innermost open element, or to the top level.
    fn attach(&mut self, node: Node, span: Span) {
        if let Some(parent) = self.open.last_mut() {
            parent.push(node);
            return;
        }

        match node {
            Node::Element(element) => match &self.root {
                None => self.root = Some(element),
                Some(root) => {
                    let diagnostic = Diagnostic::error(format!(
                        "second top-level element `<{}>`",
                        element.name()
                    ))
                    .with_code(ErrorCode::E013)
                    .with_label(element.span(), ErrorCode::E013.description())
                    .with_secondary_label(root.span(), "root element starts here")
                    .with_help("wrap both elements in a single root element");
                    self.diagnostics.emit(diagnostic);
                }
            },
            Node::Text(ref text) if !text.trim().is_empty() => {
                self.diagnostics.emit(
                    Diagnostic::error("text outside the root element")
                        .with_code(ErrorCode::E013)
                        .with_label(span, ErrorCode::E013.description()),
                );
            }
            node if self.root.is_none() => self.prolog.push(node),
            node => self.epilog.push(node),
        }
    }

    fn close(&mut self, name: &str, span: Span) {
        let Some(innermost) = self.open.last() else {
            self.diagnostics.emit(
                Diagnostic::error(format!("closing tag `</{name}>` has no matching start tag"))
                    .with_code(ErrorCode::E010)
                    .with_label(span, "unexpected closing tag"),
            );
            return;
        };

        if innermost.name() == name {
            self.pop();
            return;
        }

        self.diagnostics.emit(
            Diagnostic::error(format!(
                "closing tag `</{name}>` does not match `<{}>`",
                innermost.name()
            ))
            .with_code(ErrorCode::E010)
            .with_label(span, "unexpected closing tag")
            .with_secondary_label(innermost.span(), "element opened here")
            .with_help(format!(
                "close `<{}>` before `</{name}>`",
                innermost.name()
            )),
        );

        // Resynchronize on an outer element with this name, if there is one.
        if let Some(depth) = self.open.iter().rposition(|element| element.name() == name) {
            while self.open.len() > depth {
                self.pop();
            }
        }
    }

    fn pop(&mut self) {
        if let Some(element) = self.open.pop() {
            let span = element.span();
            self.attach(Node::Element(element), span);
        }
    }

    /// Decode entity references, reporting the ones that cannot be resolved.
    fn decode(&mut self, raw: &str, offset: usize) -> String {
        let (decoded, invalid) = decode_entities(raw);
        for range in invalid {
            self.diagnostics.emit(
                Diagnostic::error("invalid entity reference")
                    .with_code(ErrorCode::E004)
                    .with_label(
                        Span::new(offset + range.start..offset + range.end),
                        ErrorCode::E004.description(),
                    )
                    .with_help("use `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;` or `&#NNN;`"),
            );
        }
        decoded
    }

    fn finish(mut self) -> Result<XmlDocument, ParseError> {
        while let Some(element) = self.open.pop() {
            self.diagnostics.emit(
                Diagnostic::error(format!("unclosed element `<{}>`", element.name()))
                    .with_code(ErrorCode::E011)
                    .with_label(element.span(), "element opened here")
                    .with_help(format!("add `</{}>`", element.name())),
            );
        }

        let Some(root) = self.root else {
            if !self.diagnostics.has_errors() {
                self.diagnostics.emit(
                    Diagnostic::error("document has no root element")
                        .with_code(ErrorCode::E012)
                        .with_help("a map document starts with `<map>`"),
                );
            }
            return Err(ParseError::new(self.diagnostics.into_diagnostics()));
        };

        self.diagnostics.finish()?;
        Ok(XmlDocument::new(self.prolog, root, self.epilog))
    }
}

/// Resolve the name between `&` and `;`.
fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Decode entity references in `raw`.
///
/// Returns the decoded text and the byte ranges (relative to `raw`) of every
/// `&` that does not start a valid reference. Invalid references are kept
/// literally in the decoded text.
fn decode_entities(raw: &str) -> (String, Vec<Range<usize>>) {
    let mut decoded = String::with_capacity(raw.len());
    let mut invalid = Vec::new();
    let mut rest = raw;

    while let Some(amp) = rest.find('&') {
        decoded.push_str(&rest[..amp]);
        let reference = &rest[amp + 1..];

        let resolved = reference
            .find(';')
            .filter(|&end| end <= MAX_ENTITY_LEN)
            .and_then(|end| resolve_entity(&reference[..end]).map(|ch| (ch, end + 1)));

        let consumed = match resolved {
            Some((ch, len)) => {
                decoded.push(ch);
                len
            }
            None => {
                let start = raw.len() - rest.len() + amp;
                invalid.push(start..start + 1);
                decoded.push('&');
                0
            }
        };
        rest = &reference[consumed..];
    }

    decoded.push_str(rest);
    (decoded, invalid)
}
