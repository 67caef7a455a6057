//! Markdown tree to markup tree conversion.
//!
//! Raw HTML from the source is carried over as [`Node::Raw`] and parsed
//! later by the materializer. Block siblings are separated by `"\n"` text
//! nodes so the serialized output keeps one block per line.

use std::collections::HashMap;

use super::{Element, Node, Root};
use crate::mdast::{Align, Document, MdNode};
use crate::sanitize::ID_PREFIX;

/// Convert a markdown tree into a markup tree.
///
/// Footnote definitions are collected into a trailing
/// `<section data-footnotes>` in order of first reference; unreferenced
/// definitions are dropped.
#[must_use]
pub fn to_markup(doc: Document) -> Root {
    let mut converter = Converter::default();
    let mut children = converter.all(doc.children);
    if let Some(section) = converter.footnote_section() {
        children.push(section);
    }
    Root {
        children: wrap(children, false),
    }
}

#[derive(Default)]
struct Converter {
    definitions: HashMap<String, Vec<MdNode>>,
    /// Footnote labels in order of first reference.
    order: Vec<String>,
    /// Reference count per label.
    references: HashMap<String, usize>,
}

impl Converter {
    fn all(&mut self, nodes: Vec<MdNode>) -> Vec<Node> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            if let Some(converted) = self.node(node) {
                out.extend(converted);
            }
        }
        out
    }

    fn node(&mut self, node: MdNode) -> Option<Vec<Node>> {
        let converted = match node {
            MdNode::Paragraph(children) => element("p", self.all(children)),
            MdNode::Heading { depth, children } => {
                element(&format!("h{depth}"), self.all(children))
            }
            MdNode::ThematicBreak => Element::new("hr").into(),
            MdNode::BlockQuote(children) => {
                let children = self.all(children);
                element("blockquote", wrap(children, true))
            }
            MdNode::List { start, children } => self.list(start, children),
            MdNode::ListItem { checked, children } => self.list_item(checked, children),
            MdNode::Code { lang, value } => code_block(lang.as_deref(), value),
            MdNode::Html(html) => Node::Raw(html),
            MdNode::Table { align, children } => self.table(&align, children),
            // Rows and cells are handled by `table`.
            MdNode::TableRow { children, .. } | MdNode::TableCell(children) => {
                return Some(self.all(children));
            }
            MdNode::Emphasis(children) => element("em", self.all(children)),
            MdNode::Strong(children) => element("strong", self.all(children)),
            MdNode::Delete(children) => element("del", self.all(children)),
            MdNode::Link {
                url,
                title,
                children,
            } => {
                let mut link = Element::new("a").with_attr("href", url);
                if !title.is_empty() {
                    link.set_attr("title", title);
                }
                link.with_children(self.all(children)).into()
            }
            MdNode::Image { url, title, alt } => {
                let mut image = Element::new("img")
                    .with_attr("src", url)
                    .with_attr("alt", alt);
                if !title.is_empty() {
                    image.set_attr("title", title);
                }
                image.into()
            }
            MdNode::InlineCode(code) => element("code", vec![Node::Text(code)]),
            MdNode::InlineMath(math) => math_element("math-inline", math),
            MdNode::DisplayMath(math) => math_element("math-display", math),
            MdNode::Break => return Some(vec![Element::new("br").into(), Node::text("\n")]),
            MdNode::Text(text) => Node::Text(text),
            MdNode::FootnoteReference(label) => self.footnote_reference(label),
            MdNode::FootnoteDefinition { label, children } => {
                self.definitions.entry(label).or_insert(children);
                return None;
            }
        };
        Some(vec![converted])
    }

    fn list(&mut self, start: Option<u64>, children: Vec<MdNode>) -> Node {
        let mut list = match start {
            Some(start) => {
                let mut list = Element::new("ol");
                if start != 1 {
                    list.set_attr("start", start.to_string());
                }
                list
            }
            None => Element::new("ul"),
        };
        let items = self.all(children);
        list.children = wrap(items, true);
        list.into()
    }

    fn list_item(&mut self, checked: Option<bool>, children: Vec<MdNode>) -> Node {
        let loose = children.iter().any(|c| matches!(c, MdNode::Paragraph(_)));
        let mut converted = Vec::new();
        for child in children {
            let block = is_block(&child);
            let Some(nodes) = self.node(child) else {
                continue;
            };
            if block && !loose && !converted.is_empty() {
                converted.push(Node::text("\n"));
            }
            converted.extend(nodes);
        }

        if let Some(checked) = checked {
            let mut checkbox = Element::new("input").with_attr("type", "checkbox");
            if checked {
                checkbox.set_attr("checked", "");
            }
            checkbox.set_attr("disabled", "");
            let marker = [checkbox.into(), Node::text(" ")];
            match converted.first_mut() {
                Some(Node::Element(first)) if loose && first.is("p") => {
                    first.children.splice(0..0, marker);
                }
                _ => {
                    converted.splice(0..0, marker);
                }
            }
        }

        let children = if loose {
            wrap(converted, true)
        } else {
            if converted.last().and_then(Node::as_element).is_some_and(is_block_element) {
                converted.push(Node::text("\n"));
            }
            converted
        };
        element("li", children)
    }

    fn table(&mut self, align: &[Align], rows: Vec<MdNode>) -> Node {
        let mut head = Vec::new();
        let mut body = Vec::new();
        for row in rows {
            let MdNode::TableRow {
                head: is_head,
                children,
            } = row
            else {
                continue;
            };
            let cell_tag = if is_head { "th" } else { "td" };
            let mut cells = Vec::with_capacity(children.len());
            for (column, cell) in children.into_iter().enumerate() {
                let MdNode::TableCell(content) = cell else {
                    continue;
                };
                let mut cell = Element::new(cell_tag);
                if let Some(value) = align.get(column).and_then(|a| a.as_attr()) {
                    cell.set_attr("align", value);
                }
                cells.push(cell.with_children(self.all(content)).into());
            }
            let row = element("tr", wrap(cells, true));
            if is_head {
                head.push(row);
            } else {
                body.push(row);
            }
        }

        let mut sections = vec![element("thead", wrap(head, true))];
        if !body.is_empty() {
            sections.push(element("tbody", wrap(body, true)));
        }
        element("table", wrap(sections, true))
    }

    fn footnote_reference(&mut self, label: String) -> Node {
        let count = self.references.entry(label.clone()).or_insert(0);
        *count += 1;
        let count = *count;
        if count == 1 {
            self.order.push(label.clone());
        }
        let number = self
            .order
            .iter()
            .position(|l| *l == label)
            .map_or(0, |i| i + 1);

        let id = footnote_id(&label);
        let ref_id = if count == 1 {
            format!("fnref-{id}")
        } else {
            format!("fnref-{id}-{count}")
        };
        let link = Element::new("a")
            .with_attr("href", format!("#{ID_PREFIX}fn-{id}"))
            .with_attr("id", ref_id)
            .with_attr("data-footnote-ref", "")
            .with_attr("aria-describedby", format!("{ID_PREFIX}footnote-label"))
            .with_children(vec![Node::text(number.to_string())]);
        element("sup", vec![link.into()])
    }

    fn footnote_section(&mut self) -> Option<Node> {
        let mut items = Vec::new();
        // Definitions may reference further footnotes, which extends `order`.
        let mut index = 0;
        while index < self.order.len() {
            let label = self.order[index].clone();
            index += 1;
            let Some(definition) = self.definitions.remove(&label) else {
                continue;
            };
            let id = footnote_id(&label);
            let mut content = self.all(definition);
            let backrefs = self.backrefs(&label, &id, index);
            match content.last_mut() {
                Some(Node::Element(last)) if last.is("p") => {
                    last.children.push(Node::text(" "));
                    last.children.extend(backrefs);
                }
                _ => content.push(element("p", backrefs)),
            }
            let item = Element::new("li")
                .with_attr("id", format!("fn-{id}"))
                .with_children(wrap(content, true));
            items.push(item.into());
        }

        if items.is_empty() {
            return None;
        }
        let heading = Element::new("h2")
            .with_attr("id", "footnote-label")
            .with_children(vec![Node::text("Footnotes")]);
        let list = element("ol", wrap(items, true));
        let section = Element::new("section")
            .with_attr("data-footnotes", "")
            .with_children(wrap(vec![heading.into(), list], true));
        Some(section.into())
    }

    fn backrefs(&self, label: &str, id: &str, number: usize) -> Vec<Node> {
        let count = self.references.get(label).copied().unwrap_or(1);
        let mut out = Vec::new();
        for n in 1..=count {
            if n > 1 {
                out.push(Node::text(" "));
            }
            let (target, aria) = if n == 1 {
                (
                    format!("#{ID_PREFIX}fnref-{id}"),
                    format!("Back to reference {number}"),
                )
            } else {
                (
                    format!("#{ID_PREFIX}fnref-{id}-{n}"),
                    format!("Back to reference {number}-{n}"),
                )
            };
            let mut children = vec![Node::text("\u{21a9}")];
            if n > 1 {
                children.push(element("sup", vec![Node::text(n.to_string())]));
            }
            let link = Element::new("a")
                .with_attr("href", target)
                .with_attr("data-footnote-backref", "")
                .with_attr("aria-label", aria)
                .with_children(children);
            out.push(link.into());
        }
        out
    }
}

/// Lowercased label with whitespace runs joined by `-`.
fn footnote_id(label: &str) -> String {
    label
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn element(tag: &str, children: Vec<Node>) -> Node {
    Element::new(tag).with_children(children).into()
}

fn code_block(lang: Option<&str>, value: String) -> Node {
    let mut code = Element::new("code");
    if let Some(lang) = lang {
        code.classes.add(&format!("language-{lang}"));
    }
    code.children.push(Node::Text(value));
    element("pre", vec![code.into()])
}

fn math_element(kind: &str, source: String) -> Node {
    Element::new("code")
        .with_classes(["language-math", kind])
        .with_children(vec![Node::Text(source)])
        .into()
}

fn is_block(node: &MdNode) -> bool {
    matches!(
        node,
        MdNode::Paragraph(_)
            | MdNode::Heading { .. }
            | MdNode::ThematicBreak
            | MdNode::BlockQuote(_)
            | MdNode::List { .. }
            | MdNode::Code { .. }
            | MdNode::Table { .. }
    )
}

fn is_block_element(element: &Element) -> bool {
    matches!(
        element.tag.as_str(),
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "hr" | "blockquote" | "ul" | "ol" | "pre"
            | "table"
    )
}

/// Join nodes with `"\n"` text; `loose` also pads both ends.
fn wrap(nodes: Vec<Node>, loose: bool) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len() * 2 + 1);
    if loose {
        out.push(Node::text("\n"));
    }
    let non_empty = !nodes.is_empty();
    for (index, node) in nodes.into_iter().enumerate() {
        if index > 0 {
            out.push(Node::text("\n"));
        }
        out.push(node);
    }
    if loose && non_empty {
        out.push(Node::text("\n"));
    }
    out
}
