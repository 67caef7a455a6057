//! Render error types.

/// Error raised by a pipeline stage.
///
/// [`MarkdownPipeline::render`](crate::MarkdownPipeline::render) never returns
/// these; it converts them to the fallback HTML. Use
/// [`try_render`](crate::MarkdownPipeline::try_render) to observe them.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Document nesting exceeds the configured depth limit.
    #[error("document nesting exceeds {limit} levels")]
    TooDeep {
        /// Configured maximum depth.
        limit: usize,
    },

    /// The parser produced an end event without a matching start.
    #[error("unbalanced markdown event stream: {0}")]
    UnbalancedEvents(String),

    /// Syntax highlighting failed.
    #[error("syntax highlighting failed: {0}")]
    Highlight(#[from] syntect::Error),

    /// Configured highlight theme is not available.
    #[error("unknown highlight theme: {0}")]
    UnknownTheme(String),

    /// A stage panicked.
    #[error("rendering panicked: {0}")]
    Panicked(String),
}
