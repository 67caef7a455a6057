//! Markup tree.
//!
//! An HTML-shaped tree shared by every stage after markdown conversion.
//! Classes are kept apart from other attributes in a [`ClassList`] so stages
//! can add presentation classes without duplicating tokens.

mod convert;
mod serialize;

pub use convert::to_markup;
pub use serialize::to_html;

use crate::error::RenderError;

/// Root of a markup tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Root {
    /// Top-level nodes.
    pub children: Vec<Node>,
}

impl Root {
    /// Whether any node in the tree is an unparsed raw HTML fragment.
    #[must_use]
    pub fn has_raw(&self) -> bool {
        self.children.iter().any(Node::has_raw)
    }

    /// Check that elements nest at most `max_depth` levels.
    ///
    /// Top-level elements are at level 1, the count
    /// [`parse_html`](crate::parse_html) applies to parsed markup.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::TooDeep`] for deeper trees.
    pub fn check_depth(&self, max_depth: usize) -> Result<(), RenderError> {
        check_level(&self.children, 1, max_depth)
    }
}

fn check_level(nodes: &[Node], level: usize, max_depth: usize) -> Result<(), RenderError> {
    for node in nodes {
        if let Node::Element(element) = node {
            if level > max_depth {
                return Err(RenderError::TooDeep { limit: max_depth });
            }
            check_level(&element.children, level + 1, max_depth)?;
        }
    }
    Ok(())
}

/// Markup tree node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    /// HTML emitted verbatim by the serializer.
    ///
    /// Before materialization this holds untrusted fragments from the
    /// markdown source; after sanitization only trusted stages create it.
    Raw(String),
}

impl Node {
    /// Shorthand for a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Element if this node is one.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    fn has_raw(&self) -> bool {
        match self {
            Self::Raw(_) => true,
            Self::Element(element) => element.children.iter().any(Self::has_raw),
            Self::Text(_) | Self::Comment(_) => false,
        }
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(text),
            Self::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
            Self::Comment(_) | Self::Raw(_) => {}
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

/// Ordered set of class tokens.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassList(Vec<String>);

impl ClassList {
    /// Parse a whitespace-separated `class` attribute value.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let mut list = Self::default();
        for token in value.split_whitespace() {
            list.add(token);
        }
        list
    }

    /// Add a token unless it is already present.
    pub fn add(&mut self, token: &str) {
        if !self.contains(token) {
            self.0.push(token.to_owned());
        }
    }

    /// Add several tokens, skipping those already present.
    pub fn extend<'a>(&mut self, tokens: impl IntoIterator<Item = &'a str>) {
        for token in tokens {
            self.add(token);
        }
    }

    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.0.iter().any(|t| t == token)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tokens in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Space-joined attribute value.
    #[must_use]
    pub fn to_attr(&self) -> String {
        self.0.join(" ")
    }
}

/// Element node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name.
    pub tag: String,
    /// Class tokens (the `class` attribute).
    pub classes: ClassList,
    /// Other attributes in source order.
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element without attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            classes: ClassList::default(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: set an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder: add class tokens.
    #[must_use]
    pub fn with_classes<'a>(mut self, tokens: impl IntoIterator<Item = &'a str>) -> Self {
        self.classes.extend(tokens);
        self
    }

    /// Builder: set children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Set an attribute, replacing an existing value.
    ///
    /// `class` is routed to the [`ClassList`].
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if name == "class" {
            self.classes = ClassList::parse(&value);
            return;
        }
        if let Some(slot) = self.attrs.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value;
        } else {
            self.attrs.push((name.to_owned(), value));
        }
    }

    /// Attribute value by name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether this element has the given tag name.
    #[must_use]
    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    /// Concatenated text of all descendant text nodes.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }

    /// Element children, skipping text, comments and raw nodes.
    pub fn element_children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_list_set_semantics() {
        let mut classes = ClassList::parse("a b a");
        classes.add("b");
        classes.add("c");
        assert_eq!(classes.to_attr(), "a b c");
    }

    #[test]
    fn test_set_attr_routes_class() {
        let mut element = Element::new("code");
        element.set_attr("class", "language-rust x");
        element.set_attr("title", "t");
        assert!(element.classes.contains("language-rust"));
        assert_eq!(element.attr("class"), None);
        assert_eq!(element.attr("title"), Some("t"));
    }

    #[test]
    fn test_set_attr_replaces() {
        let mut element = Element::new("a").with_attr("href", "x");
        element.set_attr("href", "y");
        assert_eq!(element.attrs, vec![("href".to_owned(), "y".to_owned())]);
    }

    #[test]
    fn test_text_content() {
        let element = Element::new("p").with_children(vec![
            Node::text("a"),
            Element::new("em")
                .with_children(vec![Node::text("b")])
                .into(),
            Node::Comment("c".to_owned()),
        ]);
        assert_eq!(element.text_content(), "ab");
    }

    #[test]
    fn test_has_raw() {
        let root = Root {
            children: vec![
                Element::new("p")
                    .with_children(vec![Node::Raw("<u>".to_owned())])
                    .into(),
            ],
        };
        assert!(root.has_raw());
        assert!(!Root::default().has_raw());
    }
}
