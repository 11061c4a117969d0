//! Serializes an element tree back to XML text.

use crate::tree::{Element, Node, XmlDocument};

/// Write a document as XML.
///
/// Nodes around the root element are written as they were read. Elements
/// without children are written as self-closing tags.
///
/// # Example
///
/// ```
/// # use mapsift_parser::{read, write};
/// let document = read("<map><objects count=\"0\"></objects></map>").unwrap();
/// assert_eq!(write(&document), "<map><objects count=\"0\"/></map>");
/// ```
pub fn write(document: &XmlDocument) -> String {
    let mut out = String::new();
    for node in document.prolog() {
        write_node(&mut out, node);
    }
    write_element(&mut out, document.root());
    for node in document.epilog() {
        write_node(&mut out, node);
    }
    out
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Element(element) => write_element(out, element),
        Node::Text(text) => escape_into(out, text, false),
        Node::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        Node::CData(text) => {
            out.push_str("<![CDATA[");
            out.push_str(text);
            out.push_str("]]>");
        }
        Node::ProcessingInstruction(text) => {
            out.push_str("<?");
            out.push_str(text);
            out.push_str("?>");
        }
        Node::Doctype(text) => {
            out.push_str("<!DOCTYPE");
            out.push_str(text);
            out.push('>');
        }
    }
}

fn write_element(out: &mut String, element: &Element) {
    out.push('<');
    out.push_str(element.name());
    for (name, value) in element.attributes() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_into(out, value, true);
        out.push('"');
    }

    if element.children().is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in element.children() {
        write_node(out, child);
    }
    out.push_str("</");
    out.push_str(element.name());
    out.push('>');
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            ch => out.push(ch),
        }
    }
}
