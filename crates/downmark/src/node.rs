//! Parser-agnostic DOM node structure for Markdown conversion.
//!
//! Any HTML parser can convert its output into this structure; the `html`
//! feature ships a `scraper`-based producer. The engine only consumes the
//! capability surface exposed here: tag name, children, blankness, block
//! classification, text content, and serialized markup.

use crate::utilities::{is_block, is_meaningful_when_blank, is_void};

/// Node kinds understood by the converter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Element,
    Text,
    Comment,
    Document,
    DocumentFragment,
}

/// An owned DOM node.
#[derive(Debug, Clone)]
pub struct Node {
    /// Node kind
    pub node_type: NodeType,

    /// Lowercase tag name for elements, "#text" for text nodes
    pub name: String,

    /// Text content for text and comment nodes
    pub value: Option<String>,

    /// Attributes as ordered name/value pairs
    pub attributes: Vec<(String, String)>,

    /// Child nodes
    pub children: Vec<Node>,
}

impl Node {
    /// Create a new element node
    pub fn element(tag_name: &str) -> Self {
        Self {
            node_type: NodeType::Element,
            name: tag_name.to_lowercase(),
            value: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a new element node with attributes
    pub fn element_with_attrs(tag_name: &str, attrs: Vec<(&str, &str)>) -> Self {
        Self {
            node_type: NodeType::Element,
            name: tag_name.to_lowercase(),
            value: None,
            attributes: attrs
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v.to_string()))
                .collect(),
            children: Vec::new(),
        }
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Self {
            node_type: NodeType::Text,
            name: "#text".to_string(),
            value: Some(content.to_string()),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a new comment node
    pub fn comment(content: &str) -> Self {
        Self {
            node_type: NodeType::Comment,
            name: "#comment".to_string(),
            value: Some(content.to_string()),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a document fragment node
    pub fn document_fragment() -> Self {
        Self {
            node_type: NodeType::DocumentFragment,
            name: "#document-fragment".to_string(),
            value: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Check if this is an element node
    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    /// Check if this is a text node
    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Get the tag name (lowercase)
    pub fn tag_name(&self) -> &str {
        &self.name
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        let name_lower = name.to_lowercase();
        self.attributes
            .iter()
            .find(|(attr_name, _)| *attr_name == name_lower)
            .map(|(_, value)| value.as_str())
    }

    /// Check if an attribute exists
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set an attribute, replacing an existing value
    pub fn set_attr(&mut self, name: &str, value: &str) {
        let name_lower = name.to_lowercase();
        if let Some(attr) = self.attributes.iter_mut().find(|(n, _)| *n == name_lower) {
            attr.1 = value.to_string();
        } else {
            self.attributes.push((name_lower, value.to_string()));
        }
    }

    /// Add a child node
    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Get all child nodes
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter()
    }

    /// Get only element children
    pub fn element_children(&self) -> impl Iterator<Item = &Node> {
        self.children().filter(|n| n.is_element())
    }

    /// Get the first child of any kind
    pub fn first_child(&self) -> Option<&Node> {
        self.children.first()
    }

    /// Check if this node is a block-level element
    pub fn is_block(&self) -> bool {
        self.node_type == NodeType::Element && is_block(&self.name)
    }

    /// Check if this node contributes nothing to the output.
    ///
    /// An element is blank when it is not void, not meaningful when blank,
    /// its text content is entirely whitespace, and no descendant is void or
    /// meaningful when blank.
    pub fn is_blank(&self) -> bool {
        match self.node_type {
            NodeType::Text => self
                .value
                .as_deref()
                .map_or(true, |v| v.trim().is_empty()),
            NodeType::Element => {
                !is_void(&self.name)
                    && !is_meaningful_when_blank(&self.name)
                    && self.text_content().trim().is_empty()
                    && !self.has_descendant(&|n| {
                        n.is_element() && (is_void(&n.name) || is_meaningful_when_blank(&n.name))
                    })
            }
            _ => false,
        }
    }

    fn has_descendant(&self, predicate: &dyn Fn(&Node) -> bool) -> bool {
        self.children
            .iter()
            .any(|child| predicate(child) || child.has_descendant(predicate))
    }

    /// Get all text content from this node and descendants
    pub fn text_content(&self) -> String {
        match self.node_type {
            NodeType::Text => self.value.clone().unwrap_or_default(),
            NodeType::Comment => String::new(),
            _ => {
                let mut text = String::new();
                for child in &self.children {
                    text.push_str(&child.text_content());
                }
                text
            }
        }
    }

    /// Reconstruct outer HTML (for keep rules)
    pub fn outer_html(&self) -> String {
        match self.node_type {
            NodeType::Text => self.value.clone().unwrap_or_default(),
            NodeType::Comment => format!("<!--{}-->", self.value.as_deref().unwrap_or("")),
            NodeType::Element => {
                let tag = self.tag_name();
                let attrs = self.attributes_string();

                if is_void(tag) {
                    if attrs.is_empty() {
                        format!("<{}>", tag)
                    } else {
                        format!("<{} {}>", tag, attrs)
                    }
                } else {
                    let inner = self.inner_html();
                    if attrs.is_empty() {
                        format!("<{}>{}</{}>", tag, inner, tag)
                    } else {
                        format!("<{} {}>{}</{}>", tag, attrs, inner, tag)
                    }
                }
            }
            _ => self.inner_html(),
        }
    }

    /// Reconstruct inner HTML
    pub fn inner_html(&self) -> String {
        self.children
            .iter()
            .map(|child| child.outer_html())
            .collect::<Vec<_>>()
            .join("")
    }

    fn attributes_string(&self) -> String {
        self.attributes
            .iter()
            .map(|(name, value)| {
                if value.is_empty() {
                    name.clone()
                } else {
                    format!("{}=\"{}\"", name, escape_html_attr(value))
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Escape HTML attribute value
fn escape_html_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Whitespace to restore outside a node's rendered replacement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlankingWhitespace {
    pub leading: &'static str,
    pub trailing: &'static str,
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// A node together with its traversal context.
///
/// Built by the engine while descending the tree; gives rules and filters
/// parent and sibling access without parent pointers in the tree itself.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    /// The node itself
    pub node: &'a Node,
    parent: Option<&'a Node>,
    index: usize,
}

impl<'a> NodeRef<'a> {
    /// Create a NodeRef without parent context
    pub fn new(node: &'a Node) -> Self {
        Self {
            node,
            parent: None,
            index: 0,
        }
    }

    /// Create a NodeRef for a child at `index` of `parent`
    pub fn with_parent(node: &'a Node, parent: &'a Node, index: usize) -> Self {
        Self {
            node,
            parent: Some(parent),
            index,
        }
    }

    /// Get the parent node if known
    pub fn parent(&self) -> Option<&'a Node> {
        self.parent
    }

    /// Get the parent tag name if known
    pub fn parent_tag(&self) -> Option<&'a str> {
        self.parent.filter(|p| p.is_element()).map(|p| p.tag_name())
    }

    /// Get the previous sibling of any kind
    pub fn previous_sibling(&self) -> Option<&'a Node> {
        let parent = self.parent?;
        self.index.checked_sub(1).and_then(|i| parent.children.get(i))
    }

    /// Get the next sibling of any kind
    pub fn next_sibling(&self) -> Option<&'a Node> {
        self.parent?.children.get(self.index + 1)
    }

    /// Position of this node among its parent's element children
    pub fn element_index(&self) -> usize {
        match self.parent {
            Some(parent) => parent.children[..self.index]
                .iter()
                .filter(|n| n.is_element())
                .count(),
            None => 0,
        }
    }

    /// Check if this node is the last element child of its parent
    pub fn is_last_element_child(&self) -> bool {
        match self.parent {
            Some(parent) => parent.children[self.index + 1..]
                .iter()
                .all(|n| !n.is_element()),
            None => true,
        }
    }

    /// Whitespace to restore around this node's replacement.
    ///
    /// Block elements carry none. An inline element whose text content
    /// starts or ends with whitespace contributes a single space on that
    /// side, unless the adjacent sibling already supplies it.
    pub fn flanking_whitespace(&self) -> FlankingWhitespace {
        let mut whitespace = FlankingWhitespace::default();
        if self.node.is_block() {
            return whitespace;
        }

        let text = self.node.text_content();
        if text.starts_with([' ', '\r', '\n', '\t']) && !self.flanked_by_whitespace(Side::Left) {
            whitespace.leading = " ";
        }
        if text.ends_with([' ', '\r', '\n', '\t']) && !self.flanked_by_whitespace(Side::Right) {
            whitespace.trailing = " ";
        }
        whitespace
    }

    fn flanked_by_whitespace(&self, side: Side) -> bool {
        let sibling = match side {
            Side::Left => self.previous_sibling(),
            Side::Right => self.next_sibling(),
        };
        let Some(sibling) = sibling else {
            return false;
        };

        let text = match sibling.node_type {
            NodeType::Text => sibling.value.clone().unwrap_or_default(),
            NodeType::Element if !sibling.is_block() => sibling.text_content(),
            _ => return false,
        };
        match side {
            Side::Left => text.ends_with(' '),
            Side::Right => text.starts_with(' '),
        }
    }

    // Delegate to Node methods

    pub fn is_element(&self) -> bool {
        self.node.is_element()
    }

    pub fn is_text(&self) -> bool {
        self.node.is_text()
    }

    pub fn tag_name(&self) -> &'a str {
        self.node.name.as_str()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.node
            .attributes
            .iter()
            .find(|(attr_name, _)| attr_name == &name.to_lowercase())
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn children(&self) -> impl Iterator<Item = &'a Node> {
        self.node.children.iter()
    }

    pub fn first_child(&self) -> Option<&'a Node> {
        self.node.children.first()
    }

    pub fn text_content(&self) -> String {
        self.node.text_content()
    }

    pub fn outer_html(&self) -> String {
        self.node.outer_html()
    }
}
