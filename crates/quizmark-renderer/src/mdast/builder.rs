//! Fold pulldown-cmark events into a [`Document`].

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

use super::{Align, Document, MdNode};
use crate::error::RenderError;
use crate::util::heading_level_to_num;

/// Parser settings.
#[derive(Clone, Copy, Debug)]
pub struct ParseOptions {
    /// Turn soft line breaks into hard breaks.
    pub hard_breaks: bool,
    /// Maximum container nesting depth.
    ///
    /// Every container becomes at least one element after conversion, so a
    /// document rejected here would also exceed the element depth
    /// enforced on the markup tree.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            hard_breaks: true,
            max_depth: crate::options::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Parse markdown text into a syntax tree.
///
/// Tables, strikethrough, task lists, footnotes and `$`/`$$` math are
/// enabled. With [`ParseOptions::hard_breaks`] every newline inside a
/// paragraph becomes a [`MdNode::Break`].
///
/// # Errors
///
/// Returns [`RenderError::TooDeep`] when containers nest deeper than
/// [`ParseOptions::max_depth`].
pub fn parse(markdown: &str, options: &ParseOptions) -> Result<Document, RenderError> {
    let parser_options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_MATH;

    let mut builder = TreeBuilder::new(*options);
    for event in Parser::new_ext(markdown, parser_options) {
        builder.event(event)?;
    }
    builder.finish()
}

/// Open container waiting for its end event.
enum Frame {
    Paragraph,
    Heading(u8),
    BlockQuote,
    List(Option<u64>),
    ListItem(Option<bool>),
    CodeBlock(Option<String>),
    HtmlBlock,
    Table(Vec<Align>),
    TableHead,
    TableRow,
    TableCell,
    Emphasis,
    Strong,
    Delete,
    Link { url: String, title: String },
    Image { url: String, title: String },
    FootnoteDefinition(String),
    /// Containers we do not model; children are spliced into the parent.
    Transparent,
}

struct TreeBuilder {
    options: ParseOptions,
    stack: Vec<(Frame, Vec<MdNode>)>,
    root: Vec<MdNode>,
}

impl TreeBuilder {
    fn new(options: ParseOptions) -> Self {
        Self {
            options,
            stack: Vec::new(),
            root: Vec::new(),
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), RenderError> {
        match event {
            Event::Start(tag) => self.start(tag)?,
            Event::End(_) => self.end()?,
            Event::Text(text) => self.push_text(&text),
            Event::Code(code) => self.push(MdNode::InlineCode(code.into_string())),
            Event::InlineMath(math) => self.push(MdNode::InlineMath(math.into_string())),
            Event::DisplayMath(math) => self.push(MdNode::DisplayMath(math.into_string())),
            Event::Html(html) | Event::InlineHtml(html) => {
                self.push(MdNode::Html(html.into_string()));
            }
            Event::FootnoteReference(label) => {
                self.push(MdNode::FootnoteReference(label.into_string()));
            }
            Event::SoftBreak => {
                if self.options.hard_breaks {
                    self.push(MdNode::Break);
                } else {
                    self.push_text("\n");
                }
            }
            Event::HardBreak => self.push(MdNode::Break),
            Event::Rule => self.push(MdNode::ThematicBreak),
            Event::TaskListMarker(checked) => {
                // Loose items carry the marker inside their first paragraph.
                let item = self.stack.iter_mut().rev().find_map(|(frame, _)| match frame {
                    Frame::ListItem(state) => Some(state),
                    _ => None,
                });
                if let Some(state) = item {
                    *state = Some(checked);
                }
            }
        }
        Ok(())
    }

    fn start(&mut self, tag: Tag<'_>) -> Result<(), RenderError> {
        if self.stack.len() >= self.options.max_depth {
            return Err(RenderError::TooDeep {
                limit: self.options.max_depth,
            });
        }

        let frame = match tag {
            Tag::Paragraph => Frame::Paragraph,
            Tag::Heading { level, .. } => Frame::Heading(heading_level_to_num(level)),
            Tag::BlockQuote(_) => Frame::BlockQuote,
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().map(str::to_owned)
                    }
                    CodeBlockKind::Indented => None,
                };
                Frame::CodeBlock(lang)
            }
            Tag::HtmlBlock => Frame::HtmlBlock,
            Tag::List(start) => Frame::List(start),
            Tag::Item => Frame::ListItem(None),
            Tag::FootnoteDefinition(label) => Frame::FootnoteDefinition(label.into_string()),
            Tag::Table(alignments) => {
                Frame::Table(alignments.into_iter().map(Align::from).collect())
            }
            Tag::TableHead => Frame::TableHead,
            Tag::TableRow => Frame::TableRow,
            Tag::TableCell => Frame::TableCell,
            Tag::Emphasis => Frame::Emphasis,
            Tag::Strong => Frame::Strong,
            Tag::Strikethrough => Frame::Delete,
            Tag::Link {
                dest_url, title, ..
            } => Frame::Link {
                url: dest_url.into_string(),
                title: title.into_string(),
            },
            Tag::Image {
                dest_url, title, ..
            } => Frame::Image {
                url: dest_url.into_string(),
                title: title.into_string(),
            },
            Tag::MetadataBlock(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::Superscript
            | Tag::Subscript => Frame::Transparent,
        };

        self.stack.push((frame, Vec::new()));
        Ok(())
    }

    fn end(&mut self) -> Result<(), RenderError> {
        let (frame, children) = self
            .stack
            .pop()
            .ok_or_else(|| RenderError::UnbalancedEvents("end event without start".to_owned()))?;

        let node = match frame {
            Frame::Paragraph => MdNode::Paragraph(children),
            Frame::Heading(depth) => MdNode::Heading { depth, children },
            Frame::BlockQuote => MdNode::BlockQuote(children),
            Frame::List(start) => MdNode::List { start, children },
            Frame::ListItem(checked) => MdNode::ListItem { checked, children },
            Frame::CodeBlock(lang) => MdNode::Code {
                lang,
                value: concat_text(&children),
            },
            Frame::HtmlBlock => MdNode::Html(concat_html(&children)),
            Frame::Table(align) => MdNode::Table { align, children },
            Frame::TableHead => MdNode::TableRow {
                head: true,
                children,
            },
            Frame::TableRow => MdNode::TableRow {
                head: false,
                children,
            },
            Frame::TableCell => MdNode::TableCell(children),
            Frame::Emphasis => MdNode::Emphasis(children),
            Frame::Strong => MdNode::Strong(children),
            Frame::Delete => MdNode::Delete(children),
            Frame::Link { url, title } => MdNode::Link {
                url,
                title,
                children,
            },
            Frame::Image { url, title } => MdNode::Image {
                url,
                title,
                alt: children.iter().map(MdNode::plain_text).collect(),
            },
            Frame::FootnoteDefinition(label) => MdNode::FootnoteDefinition { label, children },
            Frame::Transparent => {
                for child in children {
                    self.push(child);
                }
                return Ok(());
            }
        };

        self.push(node);
        Ok(())
    }

    fn children(&mut self) -> &mut Vec<MdNode> {
        match self.stack.last_mut() {
            Some((_, children)) => children,
            None => &mut self.root,
        }
    }

    fn push(&mut self, node: MdNode) {
        self.children().push(node);
    }

    /// Append text, merging with a preceding text node.
    fn push_text(&mut self, text: &str) {
        let children = self.children();
        if let Some(MdNode::Text(last)) = children.last_mut() {
            last.push_str(text);
        } else {
            children.push(MdNode::Text(text.to_owned()));
        }
    }

    fn finish(self) -> Result<Document, RenderError> {
        if !self.stack.is_empty() {
            return Err(RenderError::UnbalancedEvents(format!(
                "{} unclosed containers at end of input",
                self.stack.len()
            )));
        }
        Ok(Document {
            children: self.root,
        })
    }
}

fn concat_text(children: &[MdNode]) -> String {
    children
        .iter()
        .filter_map(|child| match child {
            MdNode::Text(text) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

fn concat_html(children: &[MdNode]) -> String {
    children
        .iter()
        .filter_map(|child| match child {
            MdNode::Html(html) | MdNode::Text(html) => Some(html.as_str()),
            _ => None,
        })
        .collect()
}
