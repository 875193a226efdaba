//! Whitespace normalization over a node tree.
//!
//! Runs once over the cloned root before conversion: collapses runs of
//! whitespace in text nodes to single spaces, strips spaces that touch
//! block boundaries, removes text nodes that become empty, and drops
//! comment nodes. `pre` subtrees are left untouched, and a leading space
//! directly after a void element is preserved.
//!
//! The walk is planned immutably (edits are recorded against child-index
//! paths) and applied afterwards, removals last in reverse document order
//! so earlier paths stay valid.

use crate::node::{Node, NodeType};

enum Edit {
    SetText(Vec<usize>, String),
    Remove(Vec<usize>),
}

struct Collapser {
    edits: Vec<Edit>,
    /// Working text of the most recent surviving text node
    prev_text: Option<(Vec<usize>, String)>,
    keep_leading: bool,
}

impl Collapser {
    fn visit_children(&mut self, node: &Node, path: &mut Vec<usize>) {
        for (index, child) in node.children().enumerate() {
            path.push(index);
            self.visit(child, path);
            path.pop();
        }
    }

    fn visit(&mut self, node: &Node, path: &mut Vec<usize>) {
        match node.node_type {
            NodeType::Text => {
                let mut text = collapse_runs(node.value.as_deref().unwrap_or(""));
                let after_space = self
                    .prev_text
                    .as_ref()
                    .map_or(true, |(_, prev)| prev.ends_with(' '));
                if after_space && !self.keep_leading && text.starts_with(' ') {
                    text.remove(0);
                }
                if text.is_empty() {
                    self.edits.push(Edit::Remove(path.clone()));
                } else {
                    self.commit_prev(false);
                    self.prev_text = Some((path.clone(), text));
                }
            }
            NodeType::Element => {
                let tag = node.tag_name();
                if node.is_block() || tag == "br" {
                    self.commit_prev(true);
                    self.keep_leading = false;
                    // pre is a block boundary, but its content is sacred
                    if tag != "pre" {
                        self.visit_children(node, path);
                    }
                } else if crate::utilities::is_void(tag) {
                    // Whitespace after a void element is significant
                    self.commit_prev(false);
                    self.keep_leading = true;
                } else {
                    if self.prev_text.is_some() {
                        self.keep_leading = false;
                    }
                    self.visit_children(node, path);
                }
            }
            NodeType::Comment => {
                self.edits.push(Edit::Remove(path.clone()));
            }
            NodeType::Document | NodeType::DocumentFragment => {
                self.visit_children(node, path);
            }
        }
    }

    fn commit_prev(&mut self, trim_trailing: bool) {
        if let Some((path, mut text)) = self.prev_text.take() {
            if trim_trailing && text.ends_with(' ') {
                text.pop();
            }
            if text.is_empty() {
                self.edits.push(Edit::Remove(path));
            } else {
                self.edits.push(Edit::SetText(path, text));
            }
        }
    }
}

/// Normalize whitespace in `root`'s subtree in place.
pub(crate) fn collapse_whitespace(root: &mut Node) {
    if root.children.is_empty() || root.tag_name() == "pre" {
        return;
    }

    let mut collapser = Collapser {
        edits: Vec::new(),
        prev_text: None,
        keep_leading: false,
    };
    let mut path = Vec::new();
    collapser.visit_children(root, &mut path);
    collapser.commit_prev(true);

    let mut removals = Vec::new();
    for edit in collapser.edits {
        match edit {
            Edit::SetText(path, text) => {
                if let Some(node) = node_at_mut(root, &path) {
                    node.value = Some(text);
                }
            }
            Edit::Remove(path) => removals.push(path),
        }
    }
    removals.sort();
    for path in removals.into_iter().rev() {
        remove_at(root, &path);
    }
}

fn node_at_mut<'a>(root: &'a mut Node, path: &[usize]) -> Option<&'a mut Node> {
    let mut current = root;
    for &index in path {
        current = current.children.get_mut(index)?;
    }
    Some(current)
}

fn remove_at(root: &mut Node, path: &[usize]) {
    if let Some((&last, parent_path)) = path.split_last() {
        if let Some(parent) = node_at_mut(root, parent_path) {
            if last < parent.children.len() {
                parent.children.remove(last);
            }
        }
    }
}

fn collapse_runs(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_run = false;
    for c in text.chars() {
        if matches!(c, ' ' | '\r' | '\n' | '\t') {
            if !in_run {
                result.push(' ');
                in_run = true;
            }
        } else {
            result.push(c);
            in_run = false;
        }
    }
    result
}
