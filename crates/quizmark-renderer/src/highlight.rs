//! Syntax highlighting for fenced code blocks.
//!
//! Each `<pre><code>` block becomes
//!
//! ```html
//! <figure data-rehype-pretty-code-figure>
//!   <pre style="…" tabindex="0" data-language="rust" data-theme="…">
//!     <code class="language-rust …" data-language="rust" data-theme="…">
//!       <span data-line>…</span>
//!     </code>
//!     <button class="rehype-pretty-copy" …></button>
//!   </pre>
//! </figure>
//! ```
//!
//! The copy button is omitted when disabled. Math blocks (`language-math`)
//! are left for the math stage.

use std::sync::LazyLock;

use syntect::easy::HighlightLines;
use syntect::highlighting::{Color, Theme, ThemeSet};
use syntect::html::{IncludeBackground, styled_line_to_highlighted_html};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::error::RenderError;
use crate::hast::{Element, Node, Root};
use crate::options::RenderOptions;
use crate::transform::Transform;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Names of the bundled highlight themes, sorted.
#[must_use]
pub fn available_themes() -> Vec<&'static str> {
    THEME_SET.themes.keys().map(String::as_str).collect()
}

/// Stage that highlights code blocks and attaches copy buttons.
pub struct Highlight {
    theme_name: String,
    default_language: String,
    keep_background: bool,
    /// Copy button feedback duration, `None` when the button is disabled.
    copy_feedback_ms: Option<u32>,
}

impl Highlight {
    /// Create the stage from render options.
    ///
    /// The theme is looked up when the stage runs; an unknown name fails
    /// the render with [`RenderError::UnknownTheme`].
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            theme_name: options.theme.clone(),
            default_language: options.default_language.clone(),
            keep_background: options.keep_background,
            copy_feedback_ms: options.copy_button.then_some(options.copy_feedback_ms),
        }
    }

    fn highlight_children(&self, theme: &Theme, children: &mut [Node]) -> Result<(), RenderError> {
        for node in children {
            let Node::Element(element) = node else {
                continue;
            };
            if let Some(figure) = self.highlight_block(theme, element)? {
                *element = figure;
            } else {
                self.highlight_children(theme, &mut element.children)?;
            }
        }
        Ok(())
    }

    /// Highlight a `<pre><code>` block, `None` if `pre` is not one.
    fn highlight_block(
        &self,
        theme: &Theme,
        pre: &Element,
    ) -> Result<Option<Element>, RenderError> {
        let Some(code) = code_block(pre) else {
            return Ok(None);
        };

        let language = code
            .classes
            .iter()
            .find_map(|class| class.strip_prefix("language-"))
            .unwrap_or(self.default_language.as_str())
            .to_owned();
        let source = code.text_content();
        let lines = highlight_lines(theme, &language, &source)?;

        let mut highlighted = code.clone();
        highlighted.set_attr("data-language", language.as_str());
        highlighted.set_attr("data-theme", self.theme_name.as_str());
        highlighted.set_attr("style", "display: grid;");
        highlighted.children = vec![Node::Raw(lines)];

        let mut block = Element::new("pre");
        if self.keep_background
            && let Some(style) = background_style(theme)
        {
            block.set_attr("style", style);
        }
        block.set_attr("tabindex", "0");
        block.set_attr("data-language", language.as_str());
        block.set_attr("data-theme", self.theme_name.as_str());
        block.children.push(highlighted.into());
        if let Some(feedback_ms) = self.copy_feedback_ms {
            block.children.push(copy_button(&source, feedback_ms).into());
        }

        let figure = Element::new("figure")
            .with_attr("data-rehype-pretty-code-figure", "")
            .with_children(vec![block.into()]);
        Ok(Some(figure))
    }
}

impl Transform for Highlight {
    fn name(&self) -> &'static str {
        "highlight"
    }

    fn apply(&self, root: &mut Root) -> Result<(), RenderError> {
        let theme = THEME_SET
            .themes
            .get(&self.theme_name)
            .ok_or_else(|| RenderError::UnknownTheme(self.theme_name.clone()))?;
        self.highlight_children(theme, &mut root.children)
    }
}

/// Highlighted HTML, one `<span data-line>` per source line.
fn highlight_lines(theme: &Theme, language: &str, source: &str) -> Result<String, RenderError> {
    let syntax = SYNTAX_SET
        .find_syntax_by_token(language)
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());
    let mut highlighter = HighlightLines::new(syntax, theme);

    let mut lines = Vec::new();
    for line in LinesWithEndings::from(source) {
        let ranges = highlighter.highlight_line(line, &SYNTAX_SET)?;
        let ranges: Vec<_> = ranges
            .into_iter()
            .map(|(style, text)| (style, text.trim_end_matches(['\n', '\r'])))
            .filter(|(_, text)| !text.is_empty())
            .collect();
        let html = styled_line_to_highlighted_html(&ranges, IncludeBackground::No)?;
        lines.push(format!("<span data-line>{html}</span>"));
    }
    Ok(lines.join("\n"))
}

/// Inline style with the theme's background and foreground colors.
fn background_style(theme: &Theme) -> Option<String> {
    let background = theme.settings.background?;
    let mut style = format!("background-color:{}", hex(background));
    if let Some(foreground) = theme.settings.foreground {
        style.push_str(";color:");
        style.push_str(&hex(foreground));
    }
    Some(style)
}

/// The `code` child of an unhighlighted, non-math `pre` block.
fn code_block(pre: &Element) -> Option<&Element> {
    if !pre.is("pre") {
        return None;
    }
    let mut elements = pre.element_children();
    let code = elements.next()?;
    if elements.next().is_some() || !code.is("code") || code.classes.contains("language-math") {
        return None;
    }
    // Already highlighted blocks carry generated markup instead of text.
    if !code.children.iter().all(|child| matches!(child, Node::Text(_))) {
        return None;
    }
    Some(code)
}

fn copy_button(source: &str, feedback_ms: u32) -> Element {
    let onclick = format!(
        "navigator.clipboard.writeText(this.attributes.data.value);\
         this.classList.add('rehype-pretty-copied');\
         window.setTimeout(() => this.classList.remove('rehype-pretty-copied'), {feedback_ms});"
    );
    Element::new("button")
        .with_classes(["rehype-pretty-copy"])
        .with_attr("type", "button")
        .with_attr("data", source)
        .with_attr("title", "Copy code")
        .with_attr("aria-label", "Copy code")
        .with_attr("data-feedback-duration", feedback_ms.to_string())
        .with_attr("data-name", "rehype-pretty-copy-button")
        .with_attr("data-visibility", "always")
        .with_attr("onclick", onclick)
        .with_children(vec![
            Element::new("span").with_classes(["ready"]).into(),
            Element::new("span").with_classes(["success"]).into(),
        ])
}

fn hex(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}
