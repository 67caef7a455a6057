//! Raw HTML materialization.
//!
//! Raw fragments from the markdown source are spliced into the serialized
//! tree and the result is parsed with an HTML5 parser, so fragments that
//! open and close across separate nodes (`<u>` … `</u>`) become one element.

use scraper::Html;

use crate::error::RenderError;
use crate::hast::{Element, Node, Root, to_html};
use crate::transform::Transform;

/// Stage that parses [`Node::Raw`] fragments into real elements.
pub struct Materialize {
    max_depth: usize,
}

impl Materialize {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

impl Transform for Materialize {
    fn name(&self) -> &'static str {
        "materialize"
    }

    fn apply(&self, root: &mut Root) -> Result<(), RenderError> {
        if !root.has_raw() {
            return Ok(());
        }
        *root = parse_html(&to_html(root), self.max_depth)?;
        Ok(())
    }
}

/// Parse an HTML fragment into a markup tree.
///
/// Malformed markup is repaired the way browsers repair it. Top-level
/// elements are at level 1; elements nested deeper than `max_depth` levels
/// fail with [`RenderError::TooDeep`], as in [`Root::check_depth`].
pub fn parse_html(html: &str, max_depth: usize) -> Result<Root, RenderError> {
    let fragment = Html::parse_fragment(html);
    let children = convert_children(fragment.root_element(), 1, max_depth)?;
    Ok(Root { children })
}

/// Convert the children of `parent`, whose element children sit at `level`.
fn convert_children(
    parent: scraper::ElementRef<'_>,
    level: usize,
    max_depth: usize,
) -> Result<Vec<Node>, RenderError> {
    let mut out = Vec::new();
    for child in parent.children() {
        match child.value() {
            scraper::Node::Text(text) => push_text(&mut out, text),
            scraper::Node::Comment(comment) => out.push(Node::Comment((**comment).to_owned())),
            scraper::Node::Element(source) => {
                if level > max_depth {
                    return Err(RenderError::TooDeep { limit: max_depth });
                }
                let mut element = Element::new(source.name());
                for (name, value) in source.attrs() {
                    element.set_attr(name, value);
                }
                if let Some(child_ref) = scraper::ElementRef::wrap(child) {
                    element.children = convert_children(child_ref, level + 1, max_depth)?;
                }
                out.push(element.into());
            }
            scraper::Node::Document
            | scraper::Node::Fragment
            | scraper::Node::Doctype(_)
            | scraper::Node::ProcessingInstruction(_) => {}
        }
    }
    Ok(out)
}

/// Append text, merging with a preceding text node.
fn push_text(out: &mut Vec<Node>, text: &str) {
    if let Some(Node::Text(last)) = out.last_mut() {
        last.push_str(text);
    } else {
        out.push(Node::text(text));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn materialize(root: &mut Root) {
        Materialize::new(64).apply(root).unwrap();
    }

    #[test]
    fn test_split_raw_tags_join() {
        let mut root = Root {
            children: vec![
                Element::new("p")
                    .with_children(vec![
                        Node::text("a "),
                        Node::Raw("<u>".to_owned()),
                        Node::text("b"),
                        Node::Raw("</u>".to_owned()),
                    ])
                    .into(),
            ],
        };
        materialize(&mut root);
        assert_eq!(
            root,
            Root {
                children: vec![
                    Element::new("p")
                        .with_children(vec![
                            Node::text("a "),
                            Element::new("u")
                                .with_children(vec![Node::text("b")])
                                .into(),
                        ])
                        .into(),
                ],
            }
        );
    }

    #[test]
    fn test_malformed_html_repaired() {
        let mut root = Root {
            children: vec![Node::Raw("<div><b>x</div>".to_owned())],
        };
        materialize(&mut root);
        assert_eq!(to_html(&root), "<div><b>x</b></div>");
    }

    #[test]
    fn test_text_escaped_after_parse() {
        let mut root = Root {
            children: vec![Node::Raw("<span>1 &lt; 2</span>".to_owned())],
        };
        materialize(&mut root);
        assert_eq!(to_html(&root), "<span>1 &lt; 2</span>");
    }

    #[test]
    fn test_no_raw_is_untouched() {
        let original = Root {
            children: vec![Element::new("pre").with_children(vec![Node::text("\nx")]).into()],
        };
        let mut root = original.clone();
        materialize(&mut root);
        assert_eq!(root, original);
    }

    #[test]
    fn test_pre_leading_newline_survives() {
        let mut root = Root {
            children: vec![
                Element::new("pre").with_children(vec![Node::text("\nx")]).into(),
                Node::Raw("<br>".to_owned()),
            ],
        };
        materialize(&mut root);
        assert_eq!(to_html(&root), "<pre>\n\nx</pre><br>");
    }

    #[test]
    fn test_depth_limit() {
        let html = "<div>".repeat(20);
        let err = parse_html(&html, 8).unwrap_err();
        assert!(matches!(err, RenderError::TooDeep { limit: 8 }));
    }

    #[test]
    fn test_depth_limit_is_inclusive() {
        let html = format!("{}x{}", "<div>".repeat(8), "</div>".repeat(8));
        let root = parse_html(&html, 8).unwrap();
        assert!(root.check_depth(8).is_ok());
        assert!(matches!(
            parse_html(&html, 7),
            Err(RenderError::TooDeep { limit: 7 })
        ));
    }

    #[test]
    fn test_comment_kept() {
        let root = parse_html("<!-- hi --><p>x</p>", 8).unwrap();
        assert_eq!(to_html(&root), "<!-- hi --><p>x</p>");
    }
}
