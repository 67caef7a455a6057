//! Markup tree serialization.

use super::{Element, Node, Root};
use crate::util::{escape_attr, escape_html};

/// Elements without content or end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Serialize a markup tree to an HTML string.
///
/// Text is escaped, [`Node::Raw`] is written verbatim, and empty attribute
/// values are written as bare attribute names.
#[must_use]
pub fn to_html(root: &Root) -> String {
    let mut out = String::new();
    for node in &root.children {
        write_node(node, &mut out);
    }
    out
}

pub(crate) fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Element(element) => write_element(element, out),
        Node::Text(text) => out.push_str(&escape_html(text)),
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        Node::Raw(html) => out.push_str(html),
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    if !element.classes.is_empty() {
        write_attr("class", &element.classes.to_attr(), out);
    }
    for (name, value) in &element.attrs {
        write_attr(name, value, out);
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&element.tag.as_str()) {
        return;
    }

    // HTML parsers drop one newline directly after `<pre>`.
    if element.is("pre")
        && matches!(element.children.first(), Some(Node::Text(text)) if text.starts_with('\n'))
    {
        out.push('\n');
    }

    for child in &element.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
}

fn write_attr(name: &str, value: &str, out: &mut String) {
    out.push(' ');
    out.push_str(name);
    if !value.is_empty() {
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
}
