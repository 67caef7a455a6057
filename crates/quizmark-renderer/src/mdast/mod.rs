//! Markdown syntax tree.
//!
//! pulldown-cmark produces a flat event stream; [`parse`] folds it into an
//! owned tree so tree transforms ([`insert_heading_separators`],
//! [`link_literals`]) can rewrite sibling lists directly.

mod autolink;
mod builder;
mod separator;

pub use autolink::link_literals;
pub use builder::{ParseOptions, parse};
pub use separator::insert_heading_separators;

/// Column alignment of a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    /// No explicit alignment.
    None,
    /// `:---`
    Left,
    /// `:---:`
    Center,
    /// `---:`
    Right,
}

impl Align {
    /// Value for the HTML `align` attribute, if any.
    #[must_use]
    pub fn as_attr(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Left => Some("left"),
            Self::Center => Some("center"),
            Self::Right => Some("right"),
        }
    }
}

impl From<pulldown_cmark::Alignment> for Align {
    fn from(alignment: pulldown_cmark::Alignment) -> Self {
        match alignment {
            pulldown_cmark::Alignment::None => Self::None,
            pulldown_cmark::Alignment::Left => Self::Left,
            pulldown_cmark::Alignment::Center => Self::Center,
            pulldown_cmark::Alignment::Right => Self::Right,
        }
    }
}

/// Root of a markdown syntax tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    /// Top-level block nodes.
    pub children: Vec<MdNode>,
}

/// Markdown syntax tree node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MdNode {
    Paragraph(Vec<MdNode>),
    Heading {
        /// Heading level, 1 through 6.
        depth: u8,
        children: Vec<MdNode>,
    },
    ThematicBreak,
    BlockQuote(Vec<MdNode>),
    List {
        /// Start number for ordered lists, `None` for bullet lists.
        start: Option<u64>,
        children: Vec<MdNode>,
    },
    ListItem {
        /// Task list state, `None` for plain items.
        checked: Option<bool>,
        children: Vec<MdNode>,
    },
    Code {
        lang: Option<String>,
        value: String,
    },
    /// Raw HTML, block or inline.
    Html(String),
    Table {
        align: Vec<Align>,
        children: Vec<MdNode>,
    },
    TableRow {
        /// Whether this is the header row.
        head: bool,
        children: Vec<MdNode>,
    },
    TableCell(Vec<MdNode>),
    Emphasis(Vec<MdNode>),
    Strong(Vec<MdNode>),
    Delete(Vec<MdNode>),
    Link {
        url: String,
        title: String,
        children: Vec<MdNode>,
    },
    Image {
        url: String,
        title: String,
        alt: String,
    },
    InlineCode(String),
    InlineMath(String),
    DisplayMath(String),
    Break,
    Text(String),
    FootnoteReference(String),
    FootnoteDefinition {
        label: String,
        children: Vec<MdNode>,
    },
}

impl MdNode {
    /// Child nodes of a container, `None` for leaves.
    pub fn children_mut(&mut self) -> Option<&mut Vec<MdNode>> {
        match self {
            Self::Paragraph(children)
            | Self::BlockQuote(children)
            | Self::TableCell(children)
            | Self::Emphasis(children)
            | Self::Strong(children)
            | Self::Delete(children)
            | Self::Heading { children, .. }
            | Self::List { children, .. }
            | Self::ListItem { children, .. }
            | Self::Table { children, .. }
            | Self::TableRow { children, .. }
            | Self::Link { children, .. }
            | Self::FootnoteDefinition { children, .. } => Some(children),
            Self::ThematicBreak
            | Self::Code { .. }
            | Self::Html(_)
            | Self::Image { .. }
            | Self::InlineCode(_)
            | Self::InlineMath(_)
            | Self::DisplayMath(_)
            | Self::Break
            | Self::Text(_)
            | Self::FootnoteReference(_) => None,
        }
    }

    /// Plain text of this node and its descendants.
    ///
    /// Used for image alt text, where markup is dropped.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(text)
            | Self::InlineCode(text)
            | Self::InlineMath(text)
            | Self::DisplayMath(text) => out.push_str(text),
            Self::Image { alt, .. } => out.push_str(alt),
            Self::Break => out.push('\n'),
            Self::Paragraph(children)
            | Self::BlockQuote(children)
            | Self::TableCell(children)
            | Self::Emphasis(children)
            | Self::Strong(children)
            | Self::Delete(children)
            | Self::Heading { children, .. }
            | Self::List { children, .. }
            | Self::ListItem { children, .. }
            | Self::Table { children, .. }
            | Self::TableRow { children, .. }
            | Self::Link { children, .. }
            | Self::FootnoteDefinition { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
            Self::ThematicBreak
            | Self::Code { .. }
            | Self::Html(_)
            | Self::FootnoteReference(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_flattens_inline_markup() {
        let node = MdNode::Paragraph(vec![
            MdNode::Text("a ".to_owned()),
            MdNode::Strong(vec![MdNode::Text("b".to_owned())]),
            MdNode::InlineCode(" c".to_owned()),
        ]);
        assert_eq!(node.plain_text(), "a b c");
    }

    #[test]
    fn test_children_mut_on_leaf() {
        let mut node = MdNode::ThematicBreak;
        assert!(node.children_mut().is_none());
    }

    #[test]
    fn test_align_attr() {
        assert_eq!(Align::None.as_attr(), None);
        assert_eq!(Align::Center.as_attr(), Some("center"));
    }
}
