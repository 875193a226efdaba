//! # downmark
//!
//! Convert DOM nodes to Markdown.
//!
//! The converter walks a parser-agnostic [`Node`] tree and reduces it to a
//! single Markdown string through an ordered, pluggable table of conversion
//! rules. Each element is matched against the table (keep and remove rules
//! first, then blank handling, then custom and built-in rules), its children
//! are converted recursively, and the fragments are merged with
//! newline-aware joining so nested blocks never compound into more than one
//! blank line.
//!
//! ## Example (Node-based)
//!
//! ```rust
//! use downmark::{DownmarkService, Node};
//!
//! let service = DownmarkService::new();
//!
//! // Build a small DOM tree by hand
//! let mut root = Node::document_fragment();
//! let mut h1 = Node::element("h1");
//! h1.add_child(Node::text("Hello World"));
//! root.add_child(h1);
//!
//! let markdown = service.convert(&root).unwrap();
//! assert!(markdown.contains("Hello World"));
//! ```
//!
//! ## Example (HTML string)
//!
//! ```rust
//! use downmark::DownmarkService;
//!
//! let service = DownmarkService::new();
//! let markdown = service.convert_html("<h1>Hello World</h1>").unwrap();
//! assert!(markdown.contains("Hello World"));
//! ```

mod collapse;
mod escape;
#[cfg(feature = "html")]
pub mod html;
pub mod node;
mod rules;
mod service;
mod utilities;

pub use escape::escape_markdown;
#[cfg(feature = "html")]
pub use html::parse_html;
pub use node::{FlankingWhitespace, Node, NodeRef, NodeType};
pub use rules::{commonmark_rules, Filter, Rule, Rules};
pub use service::{
    CodeBlockStyle, DownmarkOptions, DownmarkService, HeadingStyle, LinkReferenceStyle, LinkStyle,
};
pub use utilities::*;

/// Error type for conversion operations
#[derive(Debug, thiserror::Error)]
pub enum DownmarkError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, DownmarkError>;
