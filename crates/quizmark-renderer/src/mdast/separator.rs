//! Thematic breaks after top-level headings.

use super::{Document, MdNode};

/// Insert a [`MdNode::ThematicBreak`] after every top-level heading of depth 1-3.
///
/// Only direct children of the document are inspected; headings nested in
/// block quotes or list items are left alone. Deeper headings (h4-h6) get no
/// separator.
pub fn insert_heading_separators(doc: &mut Document) {
    let children = std::mem::take(&mut doc.children);
    let mut separated = Vec::with_capacity(children.len());
    for node in children {
        let qualifies = matches!(node, MdNode::Heading { depth: 1..=3, .. });
        separated.push(node);
        if qualifies {
            separated.push(MdNode::ThematicBreak);
        }
    }
    doc.children = separated;
}
