//! DownmarkService - the main entry point for node to Markdown conversion.

use crate::collapse::collapse_whitespace;
use crate::escape::escape_markdown;
use crate::node::{Node, NodeRef, NodeType};
use crate::rules::{Filter, Rule, Rules};
use crate::{DownmarkError, Result};

/// Heading style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingStyle {
    /// Use setext-style headings (underlined with = or -)
    /// Only applies to h1 and h2; deeper levels fall back to ATX
    #[default]
    Setext,
    /// Use ATX-style headings (prefixed with #)
    Atx,
}

/// Code block style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeBlockStyle {
    /// Use indented code blocks (4 spaces)
    #[default]
    Indented,
    /// Use fenced code blocks (```)
    Fenced,
}

/// Link style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkStyle {
    /// Use inline links [text](url)
    #[default]
    Inlined,
    /// Use reference links [text][ref]
    Referenced,
}

/// Reference style for referenced links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkReferenceStyle {
    /// Full reference: [text][1]
    #[default]
    Full,
    /// Collapsed reference: [text][]
    Collapsed,
    /// Shortcut reference: [text]
    Shortcut,
}

/// Options for DownmarkService
#[derive(Debug, Clone)]
pub struct DownmarkOptions {
    /// Heading style (setext or atx)
    pub heading_style: HeadingStyle,

    /// Horizontal rule string
    pub hr: String,

    /// Bullet list marker
    pub bullet_list_marker: char,

    /// Code block style
    pub code_block_style: CodeBlockStyle,

    /// Fence string for fenced code blocks
    pub fence: String,

    /// Emphasis delimiter
    pub em_delimiter: char,

    /// Strong delimiter
    pub strong_delimiter: String,

    /// Link style
    pub link_style: LinkStyle,

    /// Reference style for referenced links
    pub link_reference_style: LinkReferenceStyle,

    /// Text emitted before the newline of a hard line break
    pub br: String,
}

impl Default for DownmarkOptions {
    fn default() -> Self {
        Self {
            heading_style: HeadingStyle::Setext,
            hr: "* * *".to_string(),
            bullet_list_marker: '*',
            code_block_style: CodeBlockStyle::Indented,
            fence: "```".to_string(),
            em_delimiter: '_',
            strong_delimiter: "**".to_string(),
            link_style: LinkStyle::Inlined,
            link_reference_style: LinkReferenceStyle::Full,
            br: "  ".to_string(),
        }
    }
}

/// The main service for converting DOM nodes to Markdown
pub struct DownmarkService {
    options: DownmarkOptions,
    rules: Rules,
}

impl DownmarkService {
    /// Create a new DownmarkService with default options
    pub fn new() -> Self {
        Self {
            options: DownmarkOptions::default(),
            rules: Rules::new(),
        }
    }

    /// Create a DownmarkService with custom options
    pub fn with_options(options: DownmarkOptions) -> Self {
        Self {
            options,
            rules: Rules::new(),
        }
    }

    /// Convert a node tree to Markdown.
    ///
    /// The input is treated as the root container: its children are
    /// converted, not the node itself. It must be an element, document, or
    /// document fragment.
    pub fn convert(&self, input: &Node) -> Result<String> {
        match input.node_type {
            NodeType::Element | NodeType::Document | NodeType::DocumentFragment => {}
            _ => {
                return Err(DownmarkError::InvalidInput(format!(
                    "{} is not an element, document, or fragment node",
                    input.name
                )))
            }
        }

        let mut root = input.clone();
        collapse_whitespace(&mut root);
        let output = self.process(&root);
        Ok(self.post_process(output))
    }

    /// Convert an HTML string to Markdown
    #[cfg(feature = "html")]
    pub fn convert_html(&self, html: &str) -> Result<String> {
        if html.is_empty() {
            return Ok(String::new());
        }
        self.convert(&crate::html::parse_html(html))
    }

    /// Add a custom rule
    pub fn add_rule(&mut self, key: &str, rule: Rule) -> &mut Self {
        self.rules.add(key, rule);
        self
    }

    /// Keep elements matching the filter as HTML
    pub fn keep(&mut self, filter: Filter) -> &mut Self {
        self.rules.keep(filter);
        self
    }

    /// Remove elements matching the filter
    pub fn remove(&mut self, filter: Filter) -> &mut Self {
        self.rules.remove(filter);
        self
    }

    /// Apply a plugin
    pub fn use_plugin<F>(&mut self, plugin: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        plugin(self);
        self
    }

    /// Escape Markdown syntax in a string
    pub fn escape(&self, text: &str) -> String {
        escape_markdown(text)
    }

    /// Get the current options
    pub fn options(&self) -> &DownmarkOptions {
        &self.options
    }

    /// Get mutable access to options
    pub fn options_mut(&mut self) -> &mut DownmarkOptions {
        &mut self.options
    }

    /// Reduce a node's children to their combined Markdown equivalent
    fn process(&self, parent: &Node) -> String {
        let mut output = String::new();
        for (index, child) in parent.children().enumerate() {
            let replacement = match child.node_type {
                NodeType::Text => escape_markdown(child.value.as_deref().unwrap_or("")),
                NodeType::Element => {
                    self.replacement_for_node(&NodeRef::with_parent(child, parent, index))
                }
                _ => continue,
            };
            output = join(&output, &replacement);
        }
        output
    }

    /// Convert an element node to its Markdown equivalent
    fn replacement_for_node(&self, node: &NodeRef) -> String {
        let rule = self.rules.select(node, &self.options);
        let mut content = self.process(node.node);

        let whitespace = node.flanking_whitespace();
        if !whitespace.leading.is_empty() || !whitespace.trailing.is_empty() {
            content = content.trim().to_string();
        }

        format!(
            "{}{}{}",
            whitespace.leading,
            rule.replace(node, &content, &self.options),
            whitespace.trailing
        )
    }

    /// Run append hooks and trim the assembled output
    fn post_process(&self, mut output: String) -> String {
        for rule in self.rules.iter() {
            if let Some(appended) = rule.append(&self.options) {
                output = join(&output, &appended);
            }
        }
        output
            .trim_start_matches(['\t', '\r', '\n'])
            .trim_end()
            .to_string()
    }
}

impl Default for DownmarkService {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge two output fragments with the correct run of newlines between.
///
/// The separator is the longer of the left fragment's trailing and the
/// right fragment's leading newline runs, capped at two. Taking the
/// maximum rather than the sum keeps nested blocks from compounding their
/// blank-line separation.
fn join(left: &str, right: &str) -> String {
    let stripped_left = left.trim_end_matches('\n');
    let stripped_right = right.trim_start_matches('\n');
    let separator = (left.len() - stripped_left.len())
        .max(right.len() - stripped_right.len())
        .min(2);

    let mut output = String::with_capacity(stripped_left.len() + separator + stripped_right.len());
    output.push_str(stripped_left);
    for _ in 0..separator {
        output.push('\n');
    }
    output.push_str(stripped_right);
    output
}
