//! Rule table and rule selection.

mod commonmark;
mod rule;

pub use commonmark::commonmark_rules;
pub use rule::{AppendFn, Filter, ReplacementFn, Rule};

use indexmap::IndexMap;

use crate::node::NodeRef;
use crate::service::DownmarkOptions;

/// Collection of rules for conversion.
///
/// Selection walks a fixed priority chain: keep rules, remove rules, the
/// blank rule, custom rules in insertion order, built-in rules in table
/// order, and finally the catch-all default rule.
pub struct Rules {
    /// Preserve matching elements as HTML
    keep_rule: Rule,
    /// Drop matching elements entirely
    remove_rule: Rule,
    /// Render elements that contribute no content
    blank_rule: Rule,
    /// Catch-all for unmatched elements
    default_rule: Rule,
    /// User-added keep filters, checked together with the default keep filter
    keep_filters: Vec<Filter>,
    /// User-added remove filters
    remove_filters: Vec<Filter>,
    /// Custom rules added by the user (checked before built-ins)
    custom_rules: IndexMap<String, Rule>,
    /// Built-in CommonMark rules
    commonmark_rules: Vec<Rule>,
}

impl Rules {
    /// Create a new Rules instance with the CommonMark table
    pub fn new() -> Self {
        Self {
            keep_rule: default_keep_rule(),
            remove_rule: default_remove_rule(),
            blank_rule: default_blank_rule(),
            default_rule: default_default_rule(),
            keep_filters: Vec::new(),
            remove_filters: Vec::new(),
            custom_rules: IndexMap::new(),
            commonmark_rules: commonmark_rules(),
        }
    }

    /// Add a custom rule
    pub fn add(&mut self, key: &str, rule: Rule) {
        self.custom_rules.insert(key.to_string(), rule);
    }

    /// Add a keep filter
    pub fn keep(&mut self, filter: Filter) {
        self.keep_filters.push(filter);
    }

    /// Add a remove filter
    pub fn remove(&mut self, filter: Filter) {
        self.remove_filters.push(filter);
    }

    /// Select the rule that applies to a node.
    ///
    /// The first satisfied entry in the priority chain wins; the default
    /// rule matches everything, so selection always succeeds.
    pub fn select<'a>(&'a self, node: &NodeRef, options: &DownmarkOptions) -> &'a Rule {
        let tag = node.tag_name();

        if self.matches_keep(tag, node, options) {
            return &self.keep_rule;
        }
        if self.matches_remove(tag, node, options) {
            return &self.remove_rule;
        }
        if self.blank_rule.filter.matches(tag, node, options) {
            return &self.blank_rule;
        }
        for rule in self.custom_rules.values() {
            if rule.filter.matches(tag, node, options) {
                return rule;
            }
        }
        for rule in &self.commonmark_rules {
            if rule.filter.matches(tag, node, options) {
                return rule;
            }
        }
        &self.default_rule
    }

    fn matches_keep(&self, tag: &str, node: &NodeRef, options: &DownmarkOptions) -> bool {
        self.keep_filters
            .iter()
            .any(|filter| filter.matches(tag, node, options))
            || self.keep_rule.filter.matches(tag, node, options)
    }

    fn matches_remove(&self, tag: &str, node: &NodeRef, options: &DownmarkOptions) -> bool {
        self.remove_filters
            .iter()
            .any(|filter| filter.matches(tag, node, options))
            || self.remove_rule.filter.matches(tag, node, options)
    }

    /// Iterate over the rule table (custom rules first, then built-ins)
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.custom_rules.values().chain(self.commonmark_rules.iter())
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new()
    }
}

/// Tables pass through untouched, as does a `pre` that holds anything other
/// than a lone piece of code.
fn default_keep_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| match tag {
            "table" => true,
            "pre" => node
                .first_child()
                .map_or(false, |child| child.tag_name() != "code"),
            _ => false,
        }),
        |node, _, _| {
            if node.node.is_block() {
                format!("\n\n{}\n\n", node.outer_html())
            } else {
                node.outer_html()
            }
        },
    )
}

fn default_remove_rule() -> Rule {
    Rule::new(Filter::tags(&["head", "script"]), |_, _, _| String::new())
}

fn default_blank_rule() -> Rule {
    Rule::new(
        Filter::predicate(|_, node, _| node.node.is_blank()),
        |node, _, _| {
            if node.node.is_block() {
                "\n\n".to_string()
            } else {
                String::new()
            }
        },
    )
}

fn default_default_rule() -> Rule {
    Rule::new(
        Filter::predicate(|_, _, _| true),
        |node, content, _| {
            if node.node.is_block() {
                format!("\n\n{}\n\n", content)
            } else {
                content.to_string()
            }
        },
    )
}
