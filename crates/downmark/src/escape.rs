//! Escaping of Markdown syntax in literal text.
//!
//! Block-starting syntax (horizontal rules, list markers, blockquote
//! markers) is positional and matched line by line; emphasis, code, and
//! link syntax are delimiter pairs and matched as spans anywhere in the
//! text. The substitutions run in a fixed order; later rules must not
//! re-introduce characters an earlier rule already escaped.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// A line consisting solely of 3+ repetitions of -, * or _, optionally
// interspersed with spaces
static HORIZONTAL_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([-*_] *){3,}$").unwrap());

// Ordered list markers at line start
static ORDERED_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(\W* {0,3})(\d+)\. ").unwrap());

// Unordered list markers at line start
static UNORDERED_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([^\\\w]*)([*+-]) ").unwrap());

// Blockquote markers at line start
static BLOCKQUOTE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(\W* {0,3})> ").unwrap());

// Emphasis/strong spans delimited by * or _
static STAR_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*{1,2}([^\W*]+\W*)+\*{1,2}").unwrap());
static UNDERSCORE_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_{1,2}([^\W_]+\W*)+_{1,2}").unwrap());

// Inline code spans
static BACKTICK_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^\W`]+\W*)+`").unwrap());

// Link bracket pairs
static LINK_BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]").unwrap());

/// Escape Markdown syntax in a literal text run.
///
/// Inserts a backslash before characters the Markdown parser would
/// otherwise treat as syntax, leaving every other character untouched.
pub fn escape_markdown(text: &str) -> String {
    let text = HORIZONTAL_RULE.replace_all(text, |caps: &Captures| {
        let Some(marker) = caps.get(1).and_then(|m| m.as_str().chars().next()) else {
            return caps[0].to_string();
        };
        caps[0].replace(marker, &format!("\\{marker}"))
    });
    let text = ORDERED_MARKER.replace_all(&text, "${1}${2}\\. ");
    let text = UNORDERED_MARKER.replace_all(&text, "${1}\\${2} ");
    let text = BLOCKQUOTE_MARKER.replace_all(&text, "${1}\\> ");
    let text = STAR_SPAN.replace_all(&text, |caps: &Captures| caps[0].replace('*', "\\*"));
    let text = UNDERSCORE_SPAN.replace_all(&text, |caps: &Captures| caps[0].replace('_', "\\_"));
    let text = BACKTICK_SPAN.replace_all(&text, |caps: &Captures| caps[0].replace('`', "\\`"));
    let text = LINK_BRACKETS.replace_all(&text, "\\[${1}\\]");
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(escape_markdown("normal text"), "normal text");
        assert_eq!(escape_markdown("a sentence, with punctuation!"), "a sentence, with punctuation!");
    }

    #[test]
    fn test_horizontal_rule_lines() {
        assert_eq!(escape_markdown("---"), "\\-\\-\\-");
        assert_eq!(escape_markdown("* * *"), "\\* \\* \\*");
        assert_eq!(escape_markdown("___"), "\\_\\_\\_");
        // Too short to be a rule
        assert_eq!(escape_markdown("--"), "--");
        // Not alone on the line
        assert_eq!(escape_markdown("--- dashes"), "--- dashes");
    }

    #[test]
    fn test_ordered_list_markers() {
        assert_eq!(escape_markdown("1. item"), "1\\. item");
        assert_eq!(escape_markdown("1986. What a year."), "1986\\. What a year.");
        // No trailing space, not a marker
        assert_eq!(escape_markdown("1.item"), "1.item");
    }

    #[test]
    fn test_unordered_list_markers() {
        assert_eq!(escape_markdown("* item"), "\\* item");
        assert_eq!(escape_markdown("+ item"), "\\+ item");
        assert_eq!(escape_markdown("- item"), "\\- item");
        assert_eq!(escape_markdown("mid * line"), "mid * line");
    }

    #[test]
    fn test_blockquote_markers() {
        assert_eq!(escape_markdown("> quote"), "\\> quote");
        assert_eq!(escape_markdown("not > quote"), "not > quote");
    }

    #[test]
    fn test_emphasis_spans() {
        assert_eq!(escape_markdown("*em*"), "\\*em\\*");
        assert_eq!(escape_markdown("**strong**"), "\\*\\*strong\\*\\*");
        assert_eq!(escape_markdown("_em_"), "\\_em\\_");
        assert_eq!(escape_markdown("__strong__"), "\\_\\_strong\\_\\_");
        // Lone delimiters with space-separated words are not emphasis
        assert_eq!(escape_markdown("a * b * c"), "a * b * c");
    }

    #[test]
    fn test_code_spans() {
        assert_eq!(escape_markdown("`code`"), "\\`code\\`");
    }

    #[test]
    fn test_link_brackets() {
        assert_eq!(escape_markdown("[label]"), "\\[label\\]");
        assert_eq!(escape_markdown("[a](b)"), "\\[a\\](b)");
    }

    #[test]
    fn test_positional_rules_are_line_based() {
        assert_eq!(
            escape_markdown("first\n- second\n> third"),
            "first\n\\- second\n\\> third"
        );
    }

    #[test]
    fn test_escaped_marker_not_reescaped() {
        // The unordered-marker prefix class excludes backslashes, so the
        // output of the horizontal-rule pass is left alone
        assert_eq!(escape_markdown("* * *"), "\\* \\* \\*");
    }
}
