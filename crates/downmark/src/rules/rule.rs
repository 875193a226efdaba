//! Rule and Filter types for element conversion.

use crate::node::NodeRef;
use crate::service::DownmarkOptions;

/// Type alias for replacement functions
pub type ReplacementFn = Box<dyn Fn(&NodeRef, &str, &DownmarkOptions) -> String + Send + Sync>;

/// Type alias for append hooks, invoked once per conversion
pub type AppendFn = Box<dyn Fn(&DownmarkOptions) -> String + Send + Sync>;

/// A filter determines which elements a rule applies to
pub enum Filter {
    /// Match a single tag name
    Tag(String),
    /// Match any of multiple tag names
    Tags(Vec<String>),
    /// Match using a predicate function
    Predicate(Box<dyn Fn(&str, &NodeRef, &DownmarkOptions) -> bool + Send + Sync>),
}

impl Filter {
    /// Create a filter for a single tag
    pub fn tag(name: &str) -> Self {
        Filter::Tag(name.to_lowercase())
    }

    /// Create a filter for multiple tags
    pub fn tags(names: &[&str]) -> Self {
        Filter::Tags(names.iter().map(|s| s.to_lowercase()).collect())
    }

    /// Create a filter with a predicate
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str, &NodeRef, &DownmarkOptions) -> bool + Send + Sync + 'static,
    {
        Filter::Predicate(Box::new(f))
    }

    /// Check if this filter matches a node
    pub fn matches(&self, tag: &str, node: &NodeRef, options: &DownmarkOptions) -> bool {
        let tag_lower = tag.to_lowercase();
        match self {
            Filter::Tag(t) => tag_lower == *t,
            Filter::Tags(tags) => tags.contains(&tag_lower),
            Filter::Predicate(f) => f(&tag_lower, node, options),
        }
    }
}

/// A rule defines how to convert a matched element to Markdown
pub struct Rule {
    /// Filter to determine which elements this rule applies to
    pub filter: Filter,
    /// Replacement function that generates Markdown
    replacement: ReplacementFn,
    /// Optional hook contributing trailing output once per conversion
    append: Option<AppendFn>,
}

impl Rule {
    /// Create a new rule
    pub fn new<F>(filter: Filter, replacement: F) -> Self
    where
        F: Fn(&NodeRef, &str, &DownmarkOptions) -> String + Send + Sync + 'static,
    {
        Self {
            filter,
            replacement: Box::new(replacement),
            append: None,
        }
    }

    /// Create a rule that matches a single tag
    pub fn for_tag<F>(tag: &str, replacement: F) -> Self
    where
        F: Fn(&NodeRef, &str, &DownmarkOptions) -> String + Send + Sync + 'static,
    {
        Self::new(Filter::tag(tag), replacement)
    }

    /// Create a rule that matches multiple tags
    pub fn for_tags<F>(tags: &[&str], replacement: F) -> Self
    where
        F: Fn(&NodeRef, &str, &DownmarkOptions) -> String + Send + Sync + 'static,
    {
        Self::new(Filter::tags(tags), replacement)
    }

    /// Attach an append hook to this rule
    pub fn with_append<F>(mut self, append: F) -> Self
    where
        F: Fn(&DownmarkOptions) -> String + Send + Sync + 'static,
    {
        self.append = Some(Box::new(append));
        self
    }

    /// Apply this rule's replacement
    pub fn replace(&self, node: &NodeRef, content: &str, options: &DownmarkOptions) -> String {
        (self.replacement)(node, content, options)
    }

    /// Run the append hook if this rule has one
    pub fn append(&self, options: &DownmarkOptions) -> Option<String> {
        self.append.as_ref().map(|append| append(options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[test]
    fn test_tag_filter() {
        let filter = Filter::tag("P");
        let node = Node::element("p");
        let node_ref = NodeRef::new(&node);
        let options = DownmarkOptions::default();
        assert!(filter.matches("p", &node_ref, &options));
        assert!(!filter.matches("div", &node_ref, &options));
    }

    #[test]
    fn test_tags_filter() {
        let filter = Filter::tags(&["ul", "ol"]);
        let node = Node::element("ol");
        let node_ref = NodeRef::new(&node);
        let options = DownmarkOptions::default();
        assert!(filter.matches("OL", &node_ref, &options));
        assert!(!filter.matches("li", &node_ref, &options));
    }

    #[test]
    fn test_predicate_filter() {
        let filter = Filter::predicate(|tag, node, _| tag == "a" && node.has_attr("href"));
        let options = DownmarkOptions::default();

        let with_href = Node::element_with_attrs("a", vec![("href", "#")]);
        assert!(filter.matches("a", &NodeRef::new(&with_href), &options));

        let without_href = Node::element("a");
        assert!(!filter.matches("a", &NodeRef::new(&without_href), &options));
    }

    #[test]
    fn test_append_hook() {
        let rule = Rule::for_tag("a", |_, content, _| content.to_string())
            .with_append(|_| "appended".to_string());
        let options = DownmarkOptions::default();
        assert_eq!(rule.append(&options), Some("appended".to_string()));

        let plain = Rule::for_tag("a", |_, content, _| content.to_string());
        assert_eq!(plain.append(&options), None);
    }
}
