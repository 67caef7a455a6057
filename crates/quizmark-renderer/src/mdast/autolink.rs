//! GFM autolink literals.
//!
//! pulldown-cmark only links `<https://…>`; bare `https://…`, `www.…` and
//! e-mail addresses in text are linked here.

use std::sync::LazyLock;

use regex::Regex;

use super::{Document, MdNode};

static LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(?P<url>(?:https?://|www\.)[^\s<]*[^\s<?!.,:;*_~'")\]])|(?P<email>[a-z0-9._%+-]+@[a-z0-9-]+(?:\.[a-z0-9-]+)+)"#,
    )
    .unwrap()
});

/// Link bare URLs and e-mail addresses in text nodes.
///
/// Text inside links, images and code is never touched. `www.` links get an
/// `http://` scheme and e-mail addresses a `mailto:` scheme.
pub fn link_literals(doc: &mut Document) {
    link_in(&mut doc.children);
}

fn link_in(children: &mut Vec<MdNode>) {
    let mut out = Vec::with_capacity(children.len());
    for node in std::mem::take(children) {
        match node {
            MdNode::Text(text) => split_text(&text, &mut out),
            link @ MdNode::Link { .. } => out.push(link),
            mut other => {
                if let Some(grandchildren) = other.children_mut() {
                    link_in(grandchildren);
                }
                out.push(other);
            }
        }
    }
    *children = out;
}

fn split_text(text: &str, out: &mut Vec<MdNode>) {
    let mut cursor = 0;
    for caps in LITERAL.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        // Literals must start at a word boundary.
        let preceded_by_word = text[..whole.start()]
            .chars()
            .next_back()
            .is_some_and(char::is_alphanumeric);
        if preceded_by_word || whole.start() < cursor {
            continue;
        }

        let (end, url) = if caps.name("email").is_some() {
            (whole.end(), format!("mailto:{}", whole.as_str()))
        } else {
            let end = balance_parens(text, whole.start(), whole.end());
            let literal = &text[whole.start()..end];
            let url = if literal.len() >= 4 && literal[..4].eq_ignore_ascii_case("www.") {
                format!("http://{literal}")
            } else {
                literal.to_owned()
            };
            (end, url)
        };

        if whole.start() > cursor {
            out.push(MdNode::Text(text[cursor..whole.start()].to_owned()));
        }
        out.push(MdNode::Link {
            url,
            title: String::new(),
            children: vec![MdNode::Text(text[whole.start()..end].to_owned())],
        });
        cursor = end;
    }
    if cursor < text.len() {
        out.push(MdNode::Text(text[cursor..].to_owned()));
    }
}

/// Extend a URL match over closing parentheses that balance opening ones.
fn balance_parens(text: &str, start: usize, mut end: usize) -> usize {
    loop {
        let literal = &text[start..end];
        let open = literal.matches('(').count();
        let close = literal.matches(')').count();
        if open > close && text[end..].starts_with(')') {
            end += 1;
        } else {
            return end;
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn link(url: &str, label: &str) -> MdNode {
        MdNode::Link {
            url: url.to_owned(),
            title: String::new(),
            children: vec![MdNode::Text(label.to_owned())],
        }
    }

    fn text(s: &str) -> MdNode {
        MdNode::Text(s.to_owned())
    }

    fn linked(s: &str) -> Vec<MdNode> {
        let mut doc = Document {
            children: vec![MdNode::Paragraph(vec![text(s)])],
        };
        link_literals(&mut doc);
        match doc.children.remove(0) {
            MdNode::Paragraph(children) => children,
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn test_https_url() {
        assert_eq!(
            linked("see https://example.com/a?b=1."),
            vec![
                text("see "),
                link("https://example.com/a?b=1", "https://example.com/a?b=1"),
                text("."),
            ]
        );
    }

    #[test]
    fn test_www_gets_scheme() {
        assert_eq!(
            linked("www.example.com"),
            vec![link("http://www.example.com", "www.example.com")]
        );
    }

    #[test]
    fn test_email() {
        assert_eq!(
            linked("mail ta@school.edu"),
            vec![text("mail "), link("mailto:ta@school.edu", "ta@school.edu")]
        );
    }

    #[test]
    fn test_balanced_parens_kept() {
        assert_eq!(
            linked("(https://en.wikipedia.org/wiki/Set_(mathematics))"),
            vec![
                text("("),
                link(
                    "https://en.wikipedia.org/wiki/Set_(mathematics)",
                    "https://en.wikipedia.org/wiki/Set_(mathematics)"
                ),
                text(")"),
            ]
        );
    }

    #[test]
    fn test_mid_word_not_linked() {
        assert_eq!(linked("xwww.example.com"), vec![text("xwww.example.com")]);
    }

    #[test]
    fn test_existing_links_untouched() {
        let existing = link("https://a.example", "https://b.example");
        let mut doc = Document {
            children: vec![MdNode::Paragraph(vec![existing.clone()])],
        };
        link_literals(&mut doc);
        assert_eq!(doc.children, vec![MdNode::Paragraph(vec![existing])]);
    }

    #[test]
    fn test_inline_code_untouched() {
        let code = MdNode::InlineCode("https://example.com".to_owned());
        let mut doc = Document {
            children: vec![MdNode::Paragraph(vec![code.clone()])],
        };
        link_literals(&mut doc);
        assert_eq!(doc.children, vec![MdNode::Paragraph(vec![code])]);
    }
}
