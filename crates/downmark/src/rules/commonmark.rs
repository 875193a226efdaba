//! Built-in CommonMark rules.

use std::sync::{Arc, Mutex};

use super::{Filter, Rule};
use crate::service::{CodeBlockStyle, HeadingStyle, LinkReferenceStyle, LinkStyle};
use crate::utilities::clean_attribute;

/// Create the CommonMark rule table, in match order
pub fn commonmark_rules() -> Vec<Rule> {
    vec![
        paragraph_rule(),
        line_break_rule(),
        heading_rule(),
        blockquote_rule(),
        list_rule(),
        list_item_rule(),
        indented_code_block_rule(),
        fenced_code_block_rule(),
        horizontal_rule(),
        inline_link_rule(),
        reference_link_rule(),
        emphasis_rule(),
        strong_rule(),
        code_rule(),
        image_rule(),
    ]
}

fn paragraph_rule() -> Rule {
    Rule::for_tag("p", |_, content, _| format!("\n\n{}\n\n", content))
}

fn line_break_rule() -> Rule {
    Rule::for_tag("br", |_, _, options| format!("{}\n", options.br))
}

fn heading_rule() -> Rule {
    Rule::new(
        Filter::tags(&["h1", "h2", "h3", "h4", "h5", "h6"]),
        |node, content, options| {
            let level: usize = node.tag_name()[1..].parse().unwrap_or(1);

            match options.heading_style {
                HeadingStyle::Setext if level < 3 => {
                    let underline = if level == 1 { "=" } else { "-" };
                    format!(
                        "\n\n{}\n{}\n\n",
                        content,
                        underline.repeat(content.chars().count())
                    )
                }
                _ => format!("\n\n{} {}\n\n", "#".repeat(level), content),
            }
        },
    )
}

fn blockquote_rule() -> Rule {
    Rule::for_tag("blockquote", |_, content, _| {
        let content = content.trim_matches('\n');
        let quoted = content
            .split('\n')
            .map(|line| format!("> {}", line))
            .collect::<Vec<_>>()
            .join("\n");
        format!("\n\n{}\n\n", quoted)
    })
}

fn list_rule() -> Rule {
    Rule::for_tags(&["ul", "ol"], |node, content, _| {
        // A list closing out a list item stays tight against the item text
        if node.parent_tag() == Some("li") && node.is_last_element_child() {
            format!("\n{}", content)
        } else {
            format!("\n\n{}\n\n", content)
        }
    })
}

fn list_item_rule() -> Rule {
    Rule::for_tag("li", |node, content, options| {
        let content = content.trim_start_matches('\n');
        let stripped = content.trim_end_matches('\n');
        let content = if stripped.len() < content.len() {
            // Reduce any trailing newline run to a single newline
            format!("{}\n", stripped)
        } else {
            stripped.to_string()
        };
        let content = content.replace('\n', "\n    ");

        let prefix = if node.parent_tag() == Some("ol") {
            let start = node
                .parent()
                .and_then(|parent| parent.attr("start"))
                .and_then(|start| start.parse::<i64>().ok());
            let index = node.element_index() as i64;
            let ordinal = start.map_or(index + 1, |start| start + index);
            format!("{}.  ", ordinal)
        } else {
            format!("{}   ", options.bullet_list_marker)
        };

        let suffix = if node.next_sibling().is_some() && !content.ends_with('\n') {
            "\n"
        } else {
            ""
        };
        format!("{}{}{}", prefix, content, suffix)
    })
}

fn indented_code_block_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, options| {
            matches!(options.code_block_style, CodeBlockStyle::Indented)
                && tag == "pre"
                && node
                    .first_child()
                    .map_or(false, |child| child.tag_name() == "code")
        }),
        |node, _, _| {
            let code = node
                .first_child()
                .map(|child| child.text_content())
                .unwrap_or_default();
            format!("\n\n    {}\n\n", code.replace('\n', "\n    "))
        },
    )
}

fn fenced_code_block_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, options| {
            matches!(options.code_block_style, CodeBlockStyle::Fenced)
                && tag == "pre"
                && node
                    .first_child()
                    .map_or(false, |child| child.tag_name() == "code")
        }),
        |node, _, options| {
            let code_child = node.first_child();
            let code = code_child
                .map(|child| child.text_content())
                .unwrap_or_default();
            let language = code_child
                .and_then(|child| child.attr("class"))
                .and_then(|class| {
                    class
                        .split_whitespace()
                        .find_map(|name| name.strip_prefix("language-"))
                })
                .unwrap_or("");

            format!(
                "\n\n{}{}\n{}\n{}\n\n",
                options.fence,
                language,
                code.strip_suffix('\n').unwrap_or(&code),
                options.fence
            )
        },
    )
}

fn horizontal_rule() -> Rule {
    Rule::for_tag("hr", |_, _, options| format!("\n\n{}\n\n", options.hr))
}

fn inline_link_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, options| {
            matches!(options.link_style, LinkStyle::Inlined)
                && tag == "a"
                && node.attr("href").is_some_and(|href| !href.is_empty())
        }),
        |node, content, _| {
            let href = clean_attribute(node.attr("href"));
            let title = node
                .attr("title")
                .map(|title| format!(" \"{}\"", title))
                .unwrap_or_default();
            format!("[{}]({}{})", content, href, title)
        },
    )
}

fn reference_link_rule() -> Rule {
    // Definitions collected during a conversion, emitted by the append
    // hook and cleared for the next conversion
    let references: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let collected = Arc::clone(&references);

    Rule::new(
        Filter::predicate(|tag, node, options| {
            matches!(options.link_style, LinkStyle::Referenced)
                && tag == "a"
                && node.attr("href").is_some_and(|href| !href.is_empty())
        }),
        move |node, content, options| {
            let href = clean_attribute(node.attr("href"));
            let title = node
                .attr("title")
                .map(|title| format!(" \"{}\"", title))
                .unwrap_or_default();

            let mut references = collected.lock().unwrap();
            let (replacement, reference) = match options.link_reference_style {
                LinkReferenceStyle::Collapsed => (
                    format!("[{}][]", content),
                    format!("[{}]: {}{}", content, href, title),
                ),
                LinkReferenceStyle::Shortcut => (
                    format!("[{}]", content),
                    format!("[{}]: {}{}", content, href, title),
                ),
                LinkReferenceStyle::Full => {
                    let id = references.len() + 1;
                    (
                        format!("[{}][{}]", content, id),
                        format!("[{}]: {}{}", id, href, title),
                    )
                }
            };
            references.push(reference);
            replacement
        },
    )
    .with_append(move |_| {
        let mut references = references.lock().unwrap();
        if references.is_empty() {
            String::new()
        } else {
            let appended = format!("\n\n{}\n\n", references.join("\n"));
            references.clear();
            appended
        }
    })
}

fn emphasis_rule() -> Rule {
    Rule::for_tags(&["em", "i"], |_, content, options| {
        format!("{}{}{}", options.em_delimiter, content, options.em_delimiter)
    })
}

fn strong_rule() -> Rule {
    Rule::for_tags(&["strong", "b"], |_, content, options| {
        format!(
            "{}{}{}",
            options.strong_delimiter, content, options.strong_delimiter
        )
    })
}

fn code_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| {
            if tag != "code" {
                return false;
            }
            // The lone code child of a pre is a code block, not a span
            let has_siblings =
                node.previous_sibling().is_some() || node.next_sibling().is_some();
            !(node.parent_tag() == Some("pre") && !has_siblings)
        }),
        |node, _, _| {
            let content = node.text_content();
            if content.is_empty() {
                return String::new();
            }

            // The delimiter must be a longer backtick run than any inside
            let max_run = content
                .chars()
                .fold((0usize, 0usize), |(max, current), c| {
                    if c == '`' {
                        (max.max(current + 1), current + 1)
                    } else {
                        (max, 0)
                    }
                })
                .0;
            let delimiter = "`".repeat(max_run + 1);

            let needs_space = max_run > 0
                && (content.starts_with('`')
                    || content.ends_with('`')
                    || content.starts_with(' ')
                    || content.ends_with(' '));

            if needs_space {
                format!("{} {} {}", delimiter, content, delimiter)
            } else {
                format!("{}{}{}", delimiter, content, delimiter)
            }
        },
    )
}

fn image_rule() -> Rule {
    Rule::for_tag("img", |node, _, _| {
        let src = clean_attribute(node.attr("src"));
        if src.is_empty() {
            return String::new();
        }

        let alt = clean_attribute(node.attr("alt"));
        let title = node
            .attr("title")
            .map(|title| format!(" \"{}\"", title))
            .unwrap_or_default();
        format!("![{}]({}{})", alt, src, title)
    })
}
