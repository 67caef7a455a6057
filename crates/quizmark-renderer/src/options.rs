//! Pipeline configuration.

/// Fallback HTML returned when rendering fails.
pub const DEFAULT_FALLBACK_HTML: &str = "<p>Failed to render markdown</p>";

/// Default syntax highlighting theme.
pub const DEFAULT_THEME: &str = "InspiredGitHub";

/// Default language for fenced code blocks without an info string.
pub const DEFAULT_LANGUAGE: &str = "text";

/// Default copy button feedback duration in milliseconds.
pub const DEFAULT_COPY_FEEDBACK_MS: u32 = 3000;

/// Default maximum nesting depth of markdown and raw HTML.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Options controlling which stages run and how they behave.
///
/// The default is the full pipeline used for problem statements and
/// announcements. [`RenderOptions::lite`] is the lighter variant without
/// highlighting, copy buttons or math typesetting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Treat single newlines inside paragraphs as hard line breaks.
    pub hard_breaks: bool,
    /// Insert a thematic break after top-level h1/h2/h3 headings.
    pub heading_separators: bool,
    /// Turn bare URLs and e-mail addresses into links.
    pub autolinks: bool,
    /// Typeset `$…$` and `$$…$$` math with KaTeX.
    pub math: bool,
    /// Syntax-highlight fenced code blocks.
    pub highlight: bool,
    /// Attach a copy-to-clipboard button to highlighted code blocks.
    pub copy_button: bool,
    /// How long the copy button shows its success state.
    pub copy_feedback_ms: u32,
    /// Language used for code blocks without an info string.
    pub default_language: String,
    /// Highlight theme name (see [`available_themes`](crate::available_themes)).
    pub theme: String,
    /// Keep the theme background color on highlighted blocks.
    pub keep_background: bool,
    /// Maximum nesting depth before rendering fails.
    pub max_depth: usize,
    /// HTML returned when rendering fails.
    pub fallback_html: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            hard_breaks: true,
            heading_separators: true,
            autolinks: true,
            math: true,
            highlight: true,
            copy_button: true,
            copy_feedback_ms: DEFAULT_COPY_FEEDBACK_MS,
            default_language: DEFAULT_LANGUAGE.to_owned(),
            theme: DEFAULT_THEME.to_owned(),
            keep_background: true,
            max_depth: DEFAULT_MAX_DEPTH,
            fallback_html: DEFAULT_FALLBACK_HTML.to_owned(),
        }
    }
}

impl RenderOptions {
    /// Lighter variant: no highlighting, copy button or math typesetting.
    #[must_use]
    pub fn lite() -> Self {
        Self {
            math: false,
            highlight: false,
            copy_button: false,
            ..Self::default()
        }
    }

    /// Set the highlight theme.
    #[must_use]
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    /// Enable or disable math typesetting.
    #[must_use]
    pub fn with_math(mut self, enabled: bool) -> Self {
        self.math = enabled;
        self
    }

    /// Enable or disable syntax highlighting.
    #[must_use]
    pub fn with_highlight(mut self, enabled: bool) -> Self {
        self.highlight = enabled;
        self
    }

    /// Enable or disable the copy button.
    #[must_use]
    pub fn with_copy_button(mut self, enabled: bool) -> Self {
        self.copy_button = enabled;
        self
    }

    /// Set the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}
