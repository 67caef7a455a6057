//! Markdown to sanitized HTML rendering for problem statements and
//! announcements.
//!
//! This crate provides [`render_markdown_to_html`], a fixed pipeline that
//! turns user-authored markdown into HTML safe to inject into a page.
//!
//! # Architecture
//!
//! The pipeline works on two owned trees:
//! - [`mdast`]: markdown syntax tree folded from pulldown-cmark events
//! - [`hast`]: HTML-shaped markup tree rewritten by [`Transform`] stages
//!
//! Raw HTML typed by users is parsed into the markup tree and filtered by an
//! element/attribute whitelist before any presentation stage runs. Styling,
//! syntax highlighting and KaTeX typesetting follow sanitization.
//!
//! Stages are configured with [`RenderOptions`]; the default is the full
//! pipeline and [`RenderOptions::lite`] drops highlighting, copy buttons
//! and math.
//!
//! # Example
//!
//! ```
//! use quizmark_renderer::{MarkdownPipeline, RenderOptions};
//!
//! let pipeline = MarkdownPipeline::with_options(RenderOptions::lite()).unwrap();
//! let html = pipeline.render("# Title\n\nHello\nWorld");
//! assert_eq!(
//!     html,
//!     "<h1 class=\"text-2xl font-bold mt-6 mb-4\">Title</h1>\n<hr>\n<p>Hello<br>\nWorld</p>"
//! );
//! ```

mod error;
pub mod hast;
mod highlight;
mod materialize;
mod math;
pub mod mdast;
mod options;
mod pipeline;
mod preprocess;
mod sanitize;
mod style;
mod transform;
mod util;

pub use error::RenderError;
pub use highlight::{Highlight, available_themes};
pub use materialize::{Materialize, parse_html};
pub use math::Math;
pub use options::{
    DEFAULT_COPY_FEEDBACK_MS, DEFAULT_FALLBACK_HTML, DEFAULT_LANGUAGE, DEFAULT_MAX_DEPTH,
    DEFAULT_THEME, RenderOptions,
};
pub use pipeline::{MarkdownPipeline, render_content, render_markdown_to_html};
pub use preprocess::{normalize_underline, preprocess_tabs};
pub use sanitize::{Sanitize, sanitize_html};
pub use style::Style;
pub use transform::Transform;
pub use util::escape_html;
