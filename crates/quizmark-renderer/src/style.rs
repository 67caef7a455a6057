//! Presentation classes for sanitized markup.
//!
//! Only adds classes and wraps tables; tag names and the remaining tree
//! shape are left alone. Running the stage twice gives the same result as
//! running it once.

use crate::error::RenderError;
use crate::hast::{Element, Node, Root};
use crate::transform::Transform;

/// Classes on the `<div>` that wraps every table.
pub const TABLE_WRAPPER_CLASSES: [&str; 2] = ["table-wrapper", "figure-table"];

const H1_CLASSES: [&str; 4] = ["text-2xl", "font-bold", "mt-6", "mb-4"];
const H2_CLASSES: [&str; 4] = ["text-xl", "font-semibold", "mt-5", "mb-3"];
const H3_CLASSES: [&str; 4] = ["text-lg", "font-semibold", "mt-4", "mb-2"];

/// Stage that tags structural elements with presentation classes.
///
/// | element        | change                                        |
/// |----------------|-----------------------------------------------|
/// | `table`        | wrapped in `div.table-wrapper.figure-table`   |
/// | `img`          | `decor-outline`                               |
/// | `code`         | `wiki-inline-code`                            |
/// | `h1`-`h3`      | size, weight and margin utility classes       |
/// | `ul`, `ol`     | `wiki-list`                                   |
/// | `dl`           | `wiki-dl`                                     |
pub struct Style;

impl Transform for Style {
    fn name(&self) -> &'static str {
        "style"
    }

    fn apply(&self, root: &mut Root) -> Result<(), RenderError> {
        style_children(&mut root.children, false);
        Ok(())
    }
}

/// Style `children`; `wrapped` is set when their parent is a table wrapper.
fn style_children(children: &mut [Node], wrapped: bool) {
    for node in children {
        let Node::Element(element) = node else {
            continue;
        };
        style_element(element);
        if element.is("table") && !wrapped {
            let wrapper = Element::new("div").with_classes(TABLE_WRAPPER_CLASSES);
            let table = std::mem::replace(element, wrapper);
            element.children.push(table.into());
        }
    }
}

fn style_element(element: &mut Element) {
    match element.tag.as_str() {
        "img" => element.classes.add("decor-outline"),
        "code" => element.classes.add("wiki-inline-code"),
        "h1" => element.classes.extend(H1_CLASSES),
        "h2" => element.classes.extend(H2_CLASSES),
        "h3" => element.classes.extend(H3_CLASSES),
        "ul" | "ol" => element.classes.add("wiki-list"),
        "dl" => element.classes.add("wiki-dl"),
        _ => {}
    }
    let is_wrapper = element.is("div") && element.classes.contains(TABLE_WRAPPER_CLASSES[0]);
    style_children(&mut element.children, is_wrapper);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::hast::to_html;

    fn styled(root: &mut Root) -> String {
        Style.apply(root).unwrap();
        to_html(root)
    }

    fn root(children: Vec<Node>) -> Root {
        Root { children }
    }

    #[test]
    fn test_heading_classes() {
        let mut tree = root(vec![
            Element::new("h1").into(),
            Element::new("h2").into(),
            Element::new("h3").into(),
            Element::new("h4").into(),
        ]);
        assert_eq!(
            styled(&mut tree),
            "<h1 class=\"text-2xl font-bold mt-6 mb-4\"></h1>\
             <h2 class=\"text-xl font-semibold mt-5 mb-3\"></h2>\
             <h3 class=\"text-lg font-semibold mt-4 mb-2\"></h3>\
             <h4></h4>"
        );
    }

    #[test]
    fn test_table_wrapped_once() {
        let mut tree = root(vec![Element::new("table").into()]);
        let once = styled(&mut tree);
        let twice = styled(&mut tree);
        assert_eq!(
            once,
            "<div class=\"table-wrapper figure-table\"><table></table></div>"
        );
        assert_eq!(twice, once);
    }

    #[test]
    fn test_table_contents_styled() {
        let table = Element::new("table").with_children(vec![
            Element::new("code").into(),
        ]);
        let mut tree = root(vec![table.into()]);
        assert_eq!(
            styled(&mut tree),
            "<div class=\"table-wrapper figure-table\"><table>\
             <code class=\"wiki-inline-code\"></code></table></div>"
        );
    }

    #[test]
    fn test_nested_elements() {
        let list = Element::new("ul").with_children(vec![
            Element::new("li")
                .with_children(vec![
                    Element::new("img").with_classes(["w-1"]).into(),
                ])
                .into(),
        ]);
        let mut tree = root(vec![list.into(), Element::new("dl").into()]);
        assert_eq!(
            styled(&mut tree),
            "<ul class=\"wiki-list\"><li><img class=\"w-1 decor-outline\"></li></ul>\
             <dl class=\"wiki-dl\"></dl>"
        );
    }

    #[test]
    fn test_idempotent_classes() {
        let mut tree = root(vec![
            Element::new("h1").with_classes(["mb-4"]).into(),
            Element::new("code").into(),
        ]);
        styled(&mut tree);
        let again = styled(&mut tree);
        assert_eq!(
            again,
            "<h1 class=\"mb-4 text-2xl font-bold mt-6\"></h1>\
             <code class=\"wiki-inline-code\"></code>"
        );
    }
}
