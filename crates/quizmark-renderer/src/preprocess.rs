//! Raw-text passes that run before markdown parsing.
//!
//! Both passes emit literal HTML that pulldown-cmark passes through as raw
//! HTML. Escaping is left to materialization and sanitization.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static TAB_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\t+").unwrap());

static UNDERLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"__([^_\n]+)__").unwrap());

/// Wrap tab characters in HTML so they survive markdown parsing.
///
/// - a run of two or more tabs → `<pre>RUN</pre>`
/// - a single tab → `<code>\t</code>`
///
/// Runs are classified by length in one pass, so a long run never becomes
/// several single-tab wrappings.
///
/// # Example
///
/// ```
/// use quizmark_renderer::preprocess_tabs;
///
/// assert_eq!(preprocess_tabs("a\tb"), "a<code>\t</code>b");
/// assert_eq!(preprocess_tabs("\t\t\tx"), "<pre>\t\t\t</pre>x");
/// ```
#[must_use]
pub fn preprocess_tabs(text: &str) -> Cow<'_, str> {
    TAB_RUN.replace_all(text, |caps: &Captures<'_>| {
        let run = &caps[0];
        if run.len() >= 2 {
            format!("<pre>{run}</pre>")
        } else {
            format!("<code>{run}</code>")
        }
    })
}

/// Convert `__text__` to `<u>text</u>`.
///
/// The delimited text may not contain underscores or newlines. Running this
/// before parsing keeps pulldown-cmark from reading `__` as strong emphasis.
///
/// # Example
///
/// ```
/// use quizmark_renderer::normalize_underline;
///
/// assert_eq!(normalize_underline("__note__"), "<u>note</u>");
/// ```
#[must_use]
pub fn normalize_underline(text: &str) -> Cow<'_, str> {
    UNDERLINE.replace_all(text, "<u>$1</u>")
}

/// Run both raw-text passes in pipeline order.
pub(crate) fn preprocess(text: &str) -> String {
    let tabbed = preprocess_tabs(text);
    normalize_underline(&tabbed).into_owned()
}
