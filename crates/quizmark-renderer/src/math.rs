//! KaTeX typesetting of math elements.
//!
//! Math reaches this stage as `code.language-math` elements:
//! `math-inline` for `$…$`, `math-display` for `$$…$$`, and a
//! `<pre><code class="language-math">` block for fenced ```` ```math ````.
//! Each is replaced by the KaTeX HTML for its source.

use katex::Opts;

use crate::error::RenderError;
use crate::hast::{Element, Node, Root};
use crate::transform::Transform;
use crate::util::{escape_attr, escape_html};

/// Color of the error span for formulas that fail to typeset.
const ERROR_COLOR: &str = "#cc0000";

/// Stage that renders math elements with KaTeX.
///
/// A formula that fails to parse is replaced by a `span.katex-error`
/// holding its source; the rest of the document is unaffected.
pub struct Math;

impl Transform for Math {
    fn name(&self) -> &'static str {
        "math"
    }

    fn apply(&self, root: &mut Root) -> Result<(), RenderError> {
        typeset_children(&mut root.children);
        Ok(())
    }
}

fn typeset_children(children: &mut [Node]) {
    for node in children {
        let Node::Element(element) = node else {
            continue;
        };
        if let Some((source, display)) = math_source(element) {
            *node = Node::Raw(typeset(&source, display));
        } else {
            typeset_children(&mut element.children);
        }
    }
}

/// Formula source and display flag if `element` is a math element.
fn math_source(element: &Element) -> Option<(String, bool)> {
    if element.is("pre") {
        let mut elements = element.element_children();
        let code = elements.next()?;
        if elements.next().is_none() && code.is("code") && code.classes.contains("language-math")
        {
            return Some((code.text_content(), true));
        }
        return None;
    }
    if !element.is("code") || !element.classes.contains("language-math") {
        return None;
    }
    // Bare `language-math` outside `pre` is display math.
    let display = !element.classes.contains("math-inline");
    Some((element.text_content(), display))
}

/// KaTeX HTML for `source`, or an error span when it does not typeset.
fn typeset(source: &str, display: bool) -> String {
    let rendered = Opts::builder()
        .display_mode(display)
        .throw_on_error(true)
        .build()
        .map_err(|e| e.to_string())
        .and_then(|opts| katex::render_with_opts(source, &opts).map_err(|e| e.to_string()));
    match rendered {
        Ok(html) => html,
        Err(message) => {
            tracing::warn!(source, error = %message, "Math typesetting failed");
            format!(
                "<span class=\"katex-error\" title=\"{}\" style=\"color:{ERROR_COLOR}\">{}</span>",
                escape_attr(&message),
                escape_html(source)
            )
        }
    }
}
