//! Markup tree transform trait.

use crate::error::RenderError;
use crate::hast::Root;

/// A pipeline stage that rewrites the markup tree in place.
///
/// Stages are shared between threads by
/// [`MarkdownPipeline`](crate::MarkdownPipeline), so they hold only
/// immutable configuration. Per-render state lives on the stack of
/// [`apply`](Self::apply).
///
/// # Example
///
/// ```
/// use quizmark_renderer::hast::{Node, Root};
/// use quizmark_renderer::{RenderError, Transform};
///
/// struct DropComments;
///
/// impl Transform for DropComments {
///     fn name(&self) -> &'static str {
///         "drop-comments"
///     }
///
///     fn apply(&self, root: &mut Root) -> Result<(), RenderError> {
///         root.children.retain(|node| !matches!(node, Node::Comment(_)));
///         Ok(())
///     }
/// }
/// ```
pub trait Transform: Send + Sync {
    /// Stage name used in log events.
    fn name(&self) -> &'static str;

    /// Rewrite the tree.
    ///
    /// Per-node problems (a formula that fails to typeset) are handled inside
    /// the stage. An error aborts the whole render.
    fn apply(&self, root: &mut Root) -> Result<(), RenderError>;
}
