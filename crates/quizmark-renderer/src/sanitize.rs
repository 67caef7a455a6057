//! HTML sanitization.
//!
//! Runs after materialization, so raw HTML typed by users is filtered with
//! the same whitelist as generated markup. Stages that run afterwards
//! (styling, highlighting, math) are trusted and may add classes and
//! attributes the whitelist would reject.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use ammonia::Builder;
use regex::Regex;

use crate::error::RenderError;
use crate::hast::{Root, to_html};
use crate::materialize::parse_html;
use crate::transform::Transform;

/// Allowed elements.
const TAGS: &[&str] = &[
    "a", "b", "blockquote", "br", "code", "dd", "del", "details", "div", "dl", "dt", "em", "h1",
    "h2", "h3", "h4", "h5", "h6", "hr", "i", "img", "input", "ins", "kbd", "li", "ol", "p",
    "picture", "pre", "q", "rp", "rt", "ruby", "s", "samp", "section", "source", "span", "strike",
    "strong", "sub", "summary", "sup", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "tt",
    "u", "ul", "var",
];

/// Attributes allowed on every element.
const GENERIC_ATTRIBUTES: &[&str] = &[
    "abbr",
    "accept",
    "accept-charset",
    "accesskey",
    "action",
    "align",
    "alt",
    "aria-describedby",
    "aria-hidden",
    "aria-label",
    "aria-labelledby",
    "axis",
    "border",
    "cellpadding",
    "cellspacing",
    "char",
    "charoff",
    "charset",
    "checked",
    "clear",
    "color",
    "cols",
    "colspan",
    "compact",
    "coords",
    "datetime",
    "dir",
    "enctype",
    "frame",
    "headers",
    "height",
    "hreflang",
    "hspace",
    "id",
    "ismap",
    "itemprop",
    "label",
    "lang",
    "maxlength",
    "media",
    "method",
    "multiple",
    "name",
    "nohref",
    "noshade",
    "nowrap",
    "open",
    "prompt",
    "readonly",
    "rev",
    "rows",
    "rowspan",
    "rules",
    "scope",
    "selected",
    "shape",
    "size",
    "span",
    "start",
    "summary",
    "tabindex",
    "title",
    "usemap",
    "valign",
    "value",
    "width",
];

/// Extra attributes per element.
const TAG_ATTRIBUTES: &[(&str, &[&str])] = &[
    (
        "a",
        &["href", "data-footnote-ref", "data-footnote-backref"],
    ),
    ("blockquote", &["cite"]),
    ("code", &["class"]),
    ("del", &["cite"]),
    ("div", &["itemscope", "itemtype"]),
    ("img", &["src", "longdesc", "class", "alt", "title"]),
    ("input", &["checked", "disabled", "type"]),
    ("ins", &["cite"]),
    ("q", &["cite"]),
    ("section", &["data-footnotes"]),
    ("source", &["srcset"]),
];

/// URL schemes allowed in `href`, `src` and `cite`.
const URL_SCHEMES: &[&str] = &["http", "https", "mailto", "xmpp", "irc", "ircs"];

/// Prefix added to `id` values so user content cannot clobber page ids.
pub const ID_PREFIX: &str = "user-content-";

/// Attributes whose values name elements and get [`ID_PREFIX`] like `id`.
const CLOBBER_ATTRIBUTES: &[&str] = &["name", "aria-describedby", "aria-labelledby"];

/// Opening `<pre>` tag directly followed by a newline in ammonia output.
static PRE_NEWLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(<pre(?:\s[^\s"'>/=]+(?:="[^"]*")?)*>)\n"#).unwrap());

/// Stage that filters the tree through the element and attribute whitelist.
///
/// Scripts, event handlers, inline styles and `javascript:` URLs are
/// removed; `<script>` and `<style>` lose their content as well.
pub struct Sanitize {
    max_depth: usize,
}

impl Sanitize {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

impl Transform for Sanitize {
    fn name(&self) -> &'static str {
        "sanitize"
    }

    fn apply(&self, root: &mut Root) -> Result<(), RenderError> {
        let clean = sanitize_html(&to_html(root));
        *root = parse_html(&clean, self.max_depth)?;
        Ok(())
    }
}

/// Sanitize an HTML fragment with the whitelist.
///
/// `id`, `name` and the `aria-*` id references are prefixed with
/// [`ID_PREFIX`]. Every `input` comes out as a disabled checkbox.
#[must_use]
pub fn sanitize_html(html: &str) -> String {
    let clean = builder().clean(html).to_string();
    // A newline right after `<pre>` is dropped by parsers, so a leading
    // newline in the content has to be written twice.
    PRE_NEWLINE.replace_all(&clean, "$1\n\n").into_owned()
}

fn filter_attribute<'u>(element: &str, attribute: &str, value: &'u str) -> Option<Cow<'u, str>> {
    if element == "input" && attribute == "type" {
        return Some(Cow::Borrowed("checkbox"));
    }
    if CLOBBER_ATTRIBUTES.contains(&attribute) && !value.starts_with(ID_PREFIX) {
        return Some(Cow::Owned(format!("{ID_PREFIX}{value}")));
    }
    Some(Cow::Borrowed(value))
}

fn builder() -> Builder<'static> {
    let tag_attributes: HashMap<&str, HashSet<&str>> = TAG_ATTRIBUTES
        .iter()
        .map(|(tag, attrs)| (*tag, attrs.iter().copied().collect()))
        .collect();

    let mut builder = Builder::new();
    builder
        .tags(TAGS.iter().copied().collect())
        .generic_attributes(GENERIC_ATTRIBUTES.iter().copied().collect())
        .tag_attributes(tag_attributes)
        .url_schemes(URL_SCHEMES.iter().copied().collect())
        .id_prefix(Some(ID_PREFIX))
        .attribute_filter(filter_attribute)
        .set_tag_attribute_value("input", "type", "checkbox")
        .set_tag_attribute_value("input", "disabled", "")
        .strip_comments(true);
    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_removed_with_content() {
        assert_eq!(sanitize_html("<p>a</p><script>alert(1)</script>"), "<p>a</p>");
    }

    #[test]
    fn test_style_removed_with_content() {
        assert_eq!(sanitize_html("<style>p{}</style><p>a</p>"), "<p>a</p>");
    }

    #[test]
    fn test_event_handlers_stripped() {
        assert_eq!(
            sanitize_html("<p onclick=\"x()\" style=\"color:red\">a</p>"),
            "<p>a</p>"
        );
    }

    #[test]
    fn test_javascript_url_stripped() {
        let html = sanitize_html("<a href=\"javascript:alert(1)\">x</a>");
        assert!(!html.contains("javascript"), "{html}");
        assert!(html.contains(">x</a>"));
    }

    #[test]
    fn test_https_link_kept() {
        let html = sanitize_html("<a href=\"https://example.com\">x</a>");
        assert!(html.contains("href=\"https://example.com\""), "{html}");
    }

    #[test]
    fn test_img_keeps_class_alt_src_title() {
        assert_eq!(
            sanitize_html("<img src=\"a.png\" class=\"w-1\" alt=\"A\" title=\"T\" onerror=\"x\">"),
            "<img src=\"a.png\" class=\"w-1\" alt=\"A\" title=\"T\">"
        );
    }

    #[test]
    fn test_code_keeps_class() {
        assert_eq!(
            sanitize_html("<code class=\"language-rust\">x</code>"),
            "<code class=\"language-rust\">x</code>"
        );
    }

    #[test]
    fn test_span_class_stripped() {
        assert_eq!(
            sanitize_html("<span class=\"evil\">x</span>"),
            "<span>x</span>"
        );
    }

    #[test]
    fn test_underline_allowed() {
        assert_eq!(sanitize_html("<u>x</u>"), "<u>x</u>");
    }

    #[test]
    fn test_disallowed_tag_unwrapped() {
        assert_eq!(sanitize_html("<form><b>x</b></form>"), "<b>x</b>");
    }

    #[test]
    fn test_id_prefixed() {
        assert_eq!(
            sanitize_html("<h2 id=\"top\">x</h2>"),
            "<h2 id=\"user-content-top\">x</h2>"
        );
    }

    #[test]
    fn test_name_prefixed() {
        assert_eq!(
            sanitize_html("<img src=\"x.png\" name=\"getElementById\">"),
            "<img src=\"x.png\" name=\"user-content-getElementById\">"
        );
    }

    #[test]
    fn test_aria_references_prefixed_once() {
        let html = sanitize_html(
            "<span aria-labelledby=\"title\" aria-describedby=\"user-content-note\">x</span>",
        );
        assert!(html.contains("aria-labelledby=\"user-content-title\""), "{html}");
        assert!(html.contains("aria-describedby=\"user-content-note\""), "{html}");
    }

    #[test]
    fn test_text_input_becomes_disabled_checkbox() {
        let html =
            sanitize_html("<input type=\"text\" name=\"password\" value=\"enter password\">");
        assert!(html.contains("type=\"checkbox\""), "{html}");
        assert!(html.contains("disabled"), "{html}");
        assert!(!html.contains("type=\"text\""), "{html}");
        assert!(html.contains("name=\"user-content-password\""), "{html}");
    }

    #[test]
    fn test_submit_input_neutralized() {
        let html = sanitize_html("<input type=\"submit\" value=\"Login\">");
        assert!(!html.contains("submit"), "{html}");
        assert!(html.contains("type=\"checkbox\""), "{html}");
        assert!(html.contains("disabled"), "{html}");
    }

    #[test]
    fn test_task_checkbox_kept() {
        let html = sanitize_html("<input type=\"checkbox\" checked disabled>");
        assert!(html.contains("type=\"checkbox\""), "{html}");
        assert!(html.contains("checked"), "{html}");
        assert!(html.contains("disabled"), "{html}");
    }

    #[test]
    fn test_pre_leading_newline_kept() {
        assert_eq!(sanitize_html("<pre>\n\nx</pre>"), "<pre>\n\nx</pre>");
        assert_eq!(
            sanitize_html("<pre title=\"t\">\n\nx</pre>"),
            "<pre title=\"t\">\n\nx</pre>"
        );
        assert_eq!(sanitize_html("<pre>x\n</pre>"), "<pre>x\n</pre>");
    }

    #[test]
    fn test_stage_keeps_pre_leading_newline() {
        let mut root = parse_html("<pre>\n\nx</pre>", 16).unwrap();
        Sanitize::new(16).apply(&mut root).unwrap();
        assert_eq!(to_html(&root), "<pre>\n\nx</pre>");
    }

    #[test]
    fn test_comments_stripped() {
        assert_eq!(sanitize_html("<!-- x --><p>y</p>"), "<p>y</p>");
    }

    #[test]
    fn test_stage_reparses_tree() {
        let mut root = parse_html("<p>a<iframe src=\"x\"></iframe></p>", 16).unwrap();
        Sanitize::new(16).apply(&mut root).unwrap();
        assert_eq!(to_html(&root), "<p>a</p>");
    }
}
