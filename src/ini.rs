//! INI substitution
//!
//! Lines are classified with a small set of regexes:
//!
//! - section headers `[name]` are never touched;
//! - comment lines (`#` or `;`) are only touched when comment rewriting is requested;
//! - item lines `option = value` (or `option: value`) are rewritten inside the value only;
//! - indented lines following an item continue its value and are rewritten as value text.

use crate::content::Substitution;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

static SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\[[^\]]*\]\s*$").expect("valid section regex"));

static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[#;]").expect("valid comment regex"));

static ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<option>[^=:\s][^=:]*?)(?P<delimiter>\s*[=:])(?P<space>\s*)(?P<value>.*)$")
        .expect("valid item regex")
});

/// Kind of an INI line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Section,
    Comment,
    Blank,
    /// An item line; the value starts at this byte offset
    Item { value: usize },
    Continuation,
    Other,
}

/// Classify every line; continuation lines are only recognised after an item
pub fn classify(lines: &[String]) -> Vec<LineKind> {
    let mut in_value = false;
    lines
        .iter()
        .map(|line| {
            let kind = if line.trim().is_empty() {
                LineKind::Blank
            } else if SECTION.is_match(line) {
                LineKind::Section
            } else if COMMENT.is_match(line) {
                LineKind::Comment
            } else if in_value && line.starts_with(char::is_whitespace) {
                LineKind::Continuation
            } else if let Some(value) = ITEM.captures(line).and_then(|caps| caps.name("value")) {
                LineKind::Item {
                    value: value.start(),
                }
            } else {
                LineKind::Other
            };
            in_value = match kind {
                LineKind::Item { .. } | LineKind::Continuation => true,
                LineKind::Blank | LineKind::Comment => in_value,
                _ => false,
            };
            kind
        })
        .collect()
}

/// Substitute `substitution` in value text (and comment lines when `comments`)
pub fn substitute(lines: &mut [String], substitution: &Substitution, comments: bool) {
    let kinds = classify(lines);
    for (lineno, (line, kind)) in lines.iter_mut().zip(kinds).enumerate() {
        let end = line.len();
        let start = match kind {
            LineKind::Item { value } => value,
            LineKind::Continuation => line.len() - line.trim_start().len(),
            LineKind::Comment if comments => 0,
            _ => continue,
        };
        if substitution.replace_span(line, start..end) {
            trace!(lineno, ?kind, "ini substitution");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::split_lines;

    fn run(source: &str, comments: bool) -> String {
        let mut lines = split_lines(source);
        substitute(
            &mut lines,
            &Substitution::new("old_pkg", "new_pkg"),
            comments,
        );
        lines.join("\n")
    }

    #[test]
    fn test_item_value() {
        assert_eq!(run("source = old_pkg", false), "source = new_pkg");
        assert_eq!(run("old_pkg: old_pkg", false), "old_pkg: new_pkg");
    }

    #[test]
    fn test_section_untouched() {
        assert_eq!(run("[old_pkg]\nname=old_pkg", true), "[old_pkg]\nname=new_pkg");
    }

    #[test]
    fn test_comments() {
        assert_eq!(run("# old_pkg note", false), "# old_pkg note");
        assert_eq!(run("# old_pkg note", true), "# new_pkg note");
        assert_eq!(run("; old_pkg", true), "; new_pkg");
    }

    #[test]
    fn test_continuation_lines() {
        let source = "[run]\nsource =\n    old_pkg\n    tests\nomit = old_pkg/x.py\n  indented_old_pkg";
        let expected = "[run]\nsource =\n    new_pkg\n    tests\nomit = new_pkg/x.py\n  indented_new_pkg";
        assert_eq!(run(source, false), expected);
    }

    #[test]
    fn test_indented_line_without_item_is_left_alone() {
        assert_eq!(run("[s]\n    old_pkg", false), "[s]\n    old_pkg");
    }

    #[test]
    fn test_classify() {
        let kinds = classify(&split_lines("[a]\nk = v\n  more\n\n; c\nweird line"));
        assert_eq!(
            kinds,
            vec![
                LineKind::Section,
                LineKind::Item { value: 4 },
                LineKind::Continuation,
                LineKind::Blank,
                LineKind::Comment,
                LineKind::Other,
            ]
        );
    }
}
