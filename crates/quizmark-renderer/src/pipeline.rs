//! The rendering pipeline.
//!
//! Stage order is fixed:
//!
//! 1. tab preprocessing and underline normalization (raw text)
//! 2. markdown parsing, autolink literals, heading separators (markdown tree)
//! 3. conversion to the markup tree
//! 4. materialization, sanitization, styling, highlighting, math (markup tree)
//! 5. serialization
//!
//! Every stage after sanitization is trusted: it may add markup the
//! whitelist would reject (inline styles, the copy button handler, KaTeX
//! output).

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::LazyLock;
use std::time::Instant;

use crate::error::RenderError;
use crate::hast::{self, Root};
use crate::highlight::{Highlight, available_themes};
use crate::materialize::Materialize;
use crate::math::Math;
use crate::mdast::{self, ParseOptions};
use crate::options::RenderOptions;
use crate::preprocess::preprocess;
use crate::sanitize::Sanitize;
use crate::style::Style;
use crate::transform::Transform;
use crate::util::elapsed_ms;

static DEFAULT_PIPELINE: LazyLock<MarkdownPipeline> = LazyLock::new(MarkdownPipeline::new);

/// Render markdown with the default pipeline.
///
/// Never fails: on any error the fallback
/// `<p>Failed to render markdown</p>` is returned.
///
/// # Example
///
/// ```
/// use quizmark_renderer::render_markdown_to_html;
///
/// let html = render_markdown_to_html("<script>alert(1)</script>Hi");
/// assert!(html.contains("Hi"));
/// assert!(!html.contains("<script>"));
/// ```
#[must_use]
pub fn render_markdown_to_html(markdown: &str) -> String {
    DEFAULT_PIPELINE.render(markdown)
}

/// Render stored content that may be absent; `None` renders as empty input.
#[must_use]
pub fn render_content(content: Option<&str>) -> String {
    render_markdown_to_html(content.unwrap_or_default())
}

/// Configured markdown to HTML pipeline.
///
/// Holds only immutable configuration, so one instance can serve
/// concurrent renders from many threads.
pub struct MarkdownPipeline {
    options: RenderOptions,
    transforms: Vec<Box<dyn Transform>>,
}

impl MarkdownPipeline {
    /// Create the full pipeline with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::build(RenderOptions::default())
    }

    /// Create a pipeline from options.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnknownTheme`] if highlighting is enabled and
    /// `options.theme` is not one of [`available_themes`].
    pub fn with_options(options: RenderOptions) -> Result<Self, RenderError> {
        if options.highlight && !available_themes().contains(&options.theme.as_str()) {
            return Err(RenderError::UnknownTheme(options.theme));
        }
        Ok(Self::build(options))
    }

    fn build(options: RenderOptions) -> Self {
        let mut transforms: Vec<Box<dyn Transform>> = vec![
            Box::new(Materialize::new(options.max_depth)),
            Box::new(Sanitize::new(options.max_depth)),
            Box::new(Style),
        ];
        if options.highlight {
            transforms.push(Box::new(Highlight::new(&options)));
        }
        if options.math {
            transforms.push(Box::new(Math));
        }
        Self {
            options,
            transforms,
        }
    }

    /// Append a custom stage after the built-in ones.
    ///
    /// The stage runs on the sanitized tree and is trusted like the
    /// built-in stages that follow sanitization.
    #[must_use]
    pub fn with_transform(mut self, transform: impl Transform + 'static) -> Self {
        self.transforms.push(Box::new(transform));
        self
    }

    /// Options this pipeline was built with.
    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render markdown to HTML, returning the fallback HTML on failure.
    ///
    /// Errors and panics in any stage are logged and replaced by
    /// [`RenderOptions::fallback_html`]; partial output is never returned.
    #[must_use]
    pub fn render(&self, markdown: &str) -> String {
        let result = catch_unwind(AssertUnwindSafe(|| self.try_render(markdown)))
            .unwrap_or_else(|payload| Err(RenderError::Panicked(panic_message(&*payload))));
        match result {
            Ok(html) => html,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    input_len = markdown.len(),
                    "Failed to render markdown"
                );
                self.options.fallback_html.clone()
            }
        }
    }

    /// Render markdown to HTML.
    ///
    /// # Errors
    ///
    /// Returns the first stage error. Panics are not caught here; use
    /// [`render`](Self::render) for the guarded variant.
    pub fn try_render(&self, markdown: &str) -> Result<String, RenderError> {
        let start = Instant::now();

        let text = preprocess(markdown);
        let parse_options = ParseOptions {
            hard_breaks: self.options.hard_breaks,
            max_depth: self.options.max_depth,
        };
        let mut doc = mdast::parse(&text, &parse_options)?;
        if self.options.autolinks {
            mdast::link_literals(&mut doc);
        }
        if self.options.heading_separators {
            mdast::insert_heading_separators(&mut doc);
        }
        let mut root: Root = hast::to_markup(doc);
        root.check_depth(self.options.max_depth)?;
        tracing::debug!(elapsed_ms = elapsed_ms(start), "Markdown parsed");

        for transform in &self.transforms {
            let stage_start = Instant::now();
            transform.apply(&mut root)?;
            tracing::debug!(
                stage = transform.name(),
                elapsed_ms = elapsed_ms(stage_start),
                "Stage completed"
            );
        }

        let html = hast::to_html(&root);
        tracing::debug!(
            input_len = markdown.len(),
            output_len = html.len(),
            elapsed_ms = elapsed_ms(start),
            "Markdown rendered"
        );
        Ok(html)
    }
}

impl Default for MarkdownPipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}
