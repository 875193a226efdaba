//! HTML parsing support.
//!
//! Parses HTML strings into the [`Node`] structure used by the converter.
//! Only available with the `html` feature (enabled by default).

use scraper::{ElementRef, Html, Node as ScraperNode};

use crate::node::Node;

/// Parse an HTML string into a Node tree.
///
/// The returned node is the fragment's root element; converting it renders
/// its children. Useful when the tree needs adjusting before conversion, or
/// when integrating with other tools.
///
/// # Example
///
/// ```rust
/// use downmark::{parse_html, DownmarkService};
///
/// let node = parse_html("<h1>Hello <em>World</em></h1>");
///
/// let service = DownmarkService::new();
/// let markdown = service.convert(&node).unwrap();
/// ```
pub fn parse_html(html: &str) -> Node {
    let document = Html::parse_fragment(html);
    element_to_node(document.root_element())
}

/// Convert a scraper ElementRef to our Node structure
fn element_to_node(element: ElementRef) -> Node {
    let attrs: Vec<(&str, &str)> = element.value().attrs().collect();
    let mut node = Node::element_with_attrs(element.value().name(), attrs);

    for child in element.children() {
        match child.value() {
            ScraperNode::Text(text) => {
                node.add_child(Node::text(&text.text));
            }
            ScraperNode::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    node.add_child(element_to_node(child_element));
                }
            }
            _ => {}
        }
    }

    node
}
