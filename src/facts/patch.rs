//! Structural patches
//!
//! A [`PatchRule`] belongs to a node schema and knows how to find, on the line recorded
//! in the node's `lineno`, the exact span its leaf fields were read from. Patching is
//! split in two so that an update can be validated as a whole before any line changes:
//!
//! - `check` locates every target and reports [`Error::PatchTarget`] when it is missing,
//! - `apply` rewrites the located spans and never fails.

use super::field::Value;
use super::node::InfoNode;
use crate::error::{Error, Result};
use regex::Regex;
use std::ops::Range;
use tracing::{trace, warn};

/// How a node rewrites its source when its leaf fields change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchRule {
    /// Container nodes: nothing of their own to rewrite
    None,
    /// Replace the last occurrence of the old `text` on the line
    ReplaceText,
    /// Replace the title text and redraw the underline (and overline)
    RstTitle,
    /// Replace the inner span of a quoted string, anchored on `key=` when the node has a key
    QuotedValue {
        key: &'static str,
        value: &'static str,
    },
    /// Replace the quoted right-hand side of `key = '...'`
    Assignment {
        key: &'static str,
        value: &'static str,
    },
}

/// Where a title lives in the source
struct TitleTarget {
    text: Range<usize>,
    underline_width: usize,
}

impl PatchRule {
    /// Whether applying `replacement` onto `current` changes the source text
    pub fn is_pending(&self, current: &InfoNode, replacement: &InfoNode) -> bool {
        let differs = |field: &str| {
            replacement
                .value(field)
                .is_some_and(|new| current.value(field) != Some(new))
        };
        match self {
            PatchRule::None => false,
            PatchRule::ReplaceText => differs("text"),
            PatchRule::RstTitle => {
                differs("text")
                    || replacement
                        .value("symbol")
                        .is_some_and(|new| current.get("symbol").as_ref() != Some(new))
            }
            PatchRule::QuotedValue { value, .. } | PatchRule::Assignment { value, .. } => {
                differs(value)
            }
        }
    }

    /// Value a merge stores for `field`, matching what `apply` writes to the line
    pub fn stored(&self, field: &str, value: &Value) -> Value {
        match (self, value) {
            (PatchRule::ReplaceText | PatchRule::RstTitle, Value::Str(text)) if field == "text" => {
                Value::Str(text.trim().to_string())
            }
            _ => value.clone(),
        }
    }

    /// Verify that the patch target of `current` can be found in `lines`
    pub fn check(
        &self,
        current: &InfoNode,
        replacement: &InfoNode,
        lines: &[String],
    ) -> Result<()> {
        if !self.is_pending(current, replacement) {
            return Ok(());
        }
        let Some(lineno) = current.lineno() else {
            // nothing was read from the source, the update only merges values
            return Ok(());
        };
        let found = match self {
            PatchRule::None => true,
            PatchRule::ReplaceText => locate_text(current, lines, lineno).is_some(),
            PatchRule::RstTitle => locate_title(current, lines, lineno).is_some(),
            PatchRule::QuotedValue { key, value } | PatchRule::Assignment { key, value } => {
                locate_quoted(current, key, value, lines, lineno).is_some()
            }
        };
        if found {
            Ok(())
        } else {
            Err(Error::PatchTarget {
                node: current.schema().name.to_string(),
                lineno,
                token: self.token(current).to_string(),
            })
        }
    }

    /// Rewrite the target span of `current` with the values of `replacement`
    pub fn apply(&self, current: &InfoNode, replacement: &InfoNode, lines: &mut [String]) {
        if !self.is_pending(current, replacement) {
            return;
        }
        let Some(lineno) = current.lineno() else {
            return;
        };
        let patched = match self {
            PatchRule::None => true,
            PatchRule::ReplaceText => patch_text(current, replacement, lines, lineno),
            PatchRule::RstTitle => patch_title(current, replacement, lines, lineno),
            PatchRule::QuotedValue { key, value } | PatchRule::Assignment { key, value } => {
                patch_quoted(current, replacement, key, value, lines, lineno)
            }
        };
        if !patched {
            warn!(
                node = current.schema().name,
                lineno,
                token = self.token(current),
                "patch target vanished, line left untouched"
            );
        }
    }

    fn token<'a>(&self, current: &'a InfoNode) -> &'a str {
        let field = match self {
            PatchRule::QuotedValue { value, .. } | PatchRule::Assignment { value, .. } => *value,
            _ => "text",
        };
        current.str(field).unwrap_or_default()
    }
}

fn locate_text(current: &InfoNode, lines: &[String], lineno: usize) -> Option<Range<usize>> {
    let old = current.str("text").unwrap_or_default();
    let line = lines.get(lineno)?;
    line.rfind(old).map(|start| start..start + old.len())
}

fn patch_text(
    current: &InfoNode,
    replacement: &InfoNode,
    lines: &mut [String],
    lineno: usize,
) -> bool {
    let (Some(span), Some(new)) = (locate_text(current, lines, lineno), replacement.str("text"))
    else {
        return false;
    };
    trace!(lineno, old = ?&lines[lineno][span.clone()], new, "replace text");
    lines[lineno].replace_range(span, new.trim());
    true
}

/// A line made of a single RST symbol repeated, returns the run width
fn underline_width(line: &str) -> Option<usize> {
    let run = line.trim_end();
    let mut chars = run.chars();
    let first = chars.next()?;
    if !crate::facts::field::RST_SYMBOLS.contains(first) || !chars.all(|c| c == first) {
        return None;
    }
    Some(run.chars().count())
}

fn locate_title(current: &InfoNode, lines: &[String], lineno: usize) -> Option<TitleTarget> {
    let old = current.str("text")?;
    let text = lines.get(lineno)?.rfind(old).map(|start| start..start + old.len())?;
    let width = underline_width(lines.get(lineno + 1)?)?;
    if current.flag("has_overline") == Some(true) {
        underline_width(lines.get(lineno.checked_sub(1)?)?)?;
    }
    Some(TitleTarget {
        text,
        underline_width: width,
    })
}

fn redraw(line: &mut String, symbol: &str, width: usize) {
    let cr = if line.ends_with('\r') { "\r" } else { "" };
    *line = format!("{}{}", symbol.repeat(width), cr);
}

fn patch_title(
    current: &InfoNode,
    replacement: &InfoNode,
    lines: &mut [String],
    lineno: usize,
) -> bool {
    let Some(target) = locate_title(current, lines, lineno) else {
        return false;
    };
    let old_text = current.str("text").unwrap_or_default();
    let new_text = replacement.str("text").unwrap_or(old_text).trim();
    let symbol = replacement
        .str("symbol")
        .map(str::to_string)
        .or_else(|| current.get("symbol").and_then(|v| v.as_str().map(str::to_string)))
        .unwrap_or_else(|| "=".to_string());

    // titles drawn wider than their text keep the same excess
    let excess = target
        .underline_width
        .saturating_sub(old_text.chars().count());
    let width = new_text.chars().count() + excess;

    trace!(lineno, old = old_text, new = new_text, %symbol, width, "redraw title");
    lines[lineno].replace_range(target.text, new_text);
    redraw(&mut lines[lineno + 1], &symbol, width);
    if current.flag("has_overline") == Some(true) {
        redraw(&mut lines[lineno - 1], &symbol, width);
    }
    true
}

fn quoted_pattern(key: Option<&str>, old: &str) -> Option<Regex> {
    let value = regex::escape(old);
    let pattern = match key {
        Some(key) => format!(
            r#"\b{}\s*=\s*[rRuUbB]?(?:'({value})'|"({value})")"#,
            regex::escape(key)
        ),
        None => format!(r#"'({value})'|"({value})""#),
    };
    Regex::new(&pattern).ok()
}

fn locate_quoted(
    current: &InfoNode,
    key: &str,
    value: &str,
    lines: &[String],
    lineno: usize,
) -> Option<Range<usize>> {
    let old = current.str(value)?;
    let line = lines.get(lineno)?;
    let inner = |caps: regex::Captures<'_>| caps.get(1).or_else(|| caps.get(2)).map(|m| m.range());

    if let Some(key) = current.str(key) {
        if let Some(span) = quoted_pattern(Some(key), old)?.captures(line).and_then(inner) {
            return Some(span);
        }
    }

    // list elements and values wrapped onto their own line: pick by recorded column
    let any = quoted_pattern(None, old)?;
    let candidates = any.captures_iter(line).filter_map(inner);
    match current.int("column").and_then(|c| usize::try_from(c).ok()) {
        Some(column) => candidates.min_by_key(|span| span.start.abs_diff(column + 1)),
        None => candidates.min_by_key(|span| span.start),
    }
}

fn patch_quoted(
    current: &InfoNode,
    replacement: &InfoNode,
    key: &str,
    value: &str,
    lines: &mut [String],
    lineno: usize,
) -> bool {
    let (Some(span), Some(new)) = (
        locate_quoted(current, key, value, lines, lineno),
        replacement.str(value),
    ) else {
        return false;
    };
    trace!(lineno, old = ?&lines[lineno][span.clone()], new, "replace quoted value");
    lines[lineno].replace_range(span, new);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::schema::{KWARG, RST_TITLE, SINGLE_LINE_TEXT, VAR};

    fn lines(text: &str) -> Vec<String> {
        text.split('\n').map(str::to_string).collect()
    }

    #[test]
    fn test_replace_text_last_occurrence() {
        let current = InfoNode::new(&SINGLE_LINE_TEXT)
            .with("text", "pkg")
            .unwrap()
            .with("lineno", 0)
            .unwrap();
        let replacement = InfoNode::new(&SINGLE_LINE_TEXT).with("text", "new").unwrap();
        let mut buf = lines(":copyright: pkg pkg");
        PatchRule::ReplaceText.check(&current, &replacement, &buf).unwrap();
        PatchRule::ReplaceText.apply(&current, &replacement, &mut buf);
        assert_eq!(buf, vec![":copyright: pkg new"]);
    }

    #[test]
    fn test_title_with_overline_keeps_excess() {
        let current = InfoNode::new(&RST_TITLE)
            .with("text", "Title")
            .unwrap()
            .with("symbol", "#")
            .unwrap()
            .with("has_overline", true)
            .unwrap()
            .with("lineno", 1)
            .unwrap();
        let replacement = InfoNode::new(&RST_TITLE)
            .with("text", "Long title")
            .unwrap()
            .with("symbol", "*")
            .unwrap();
        let mut buf = lines("#########\n  Title\n#########");
        PatchRule::RstTitle.check(&current, &replacement, &buf).unwrap();
        PatchRule::RstTitle.apply(&current, &replacement, &mut buf);
        assert_eq!(buf, lines("**************\n  Long title\n**************"));
    }

    #[test]
    fn test_missing_underline_is_a_patch_target_error() {
        let current = InfoNode::new(&RST_TITLE)
            .with("text", "Title")
            .unwrap()
            .with("lineno", 0)
            .unwrap();
        let replacement = InfoNode::new(&RST_TITLE).with("text", "Other").unwrap();
        let buf = lines("Title\nnot an underline");
        assert!(matches!(
            PatchRule::RstTitle.check(&current, &replacement, &buf),
            Err(Error::PatchTarget { lineno: 0, .. })
        ));
    }

    #[test]
    fn test_quoted_value_anchored_on_key() {
        let current = InfoNode::new(&KWARG)
            .with("arg", "version")
            .unwrap()
            .with("value", "0.0.1")
            .unwrap()
            .with("lineno", 0)
            .unwrap();
        let replacement = InfoNode::new(&KWARG).with("value", "1.0.0").unwrap();
        let rule = KWARG.patch;
        let mut buf = lines("setup(name='0.0.1', version='0.0.1')");
        rule.check(&current, &replacement, &buf).unwrap();
        rule.apply(&current, &replacement, &mut buf);
        assert_eq!(buf, vec!["setup(name='0.0.1', version='1.0.0')"]);
    }

    #[test]
    fn test_quoted_value_picked_by_column() {
        let current = InfoNode::new(&KWARG)
            .with("value", "a")
            .unwrap()
            .with("lineno", 0)
            .unwrap()
            .with("column", 15)
            .unwrap();
        let replacement = InfoNode::new(&KWARG).with("value", "b").unwrap();
        let rule = KWARG.patch;
        let mut buf = lines("packages=['a', 'a']");
        rule.apply(&current, &replacement, &mut buf);
        assert_eq!(buf, vec!["packages=['a', 'b']"]);
    }

    #[test]
    fn test_assignment_accepts_string_prefix() {
        let current = InfoNode::new(&VAR)
            .with("var", "__version__")
            .unwrap()
            .with("value", "0.0.1")
            .unwrap()
            .with("lineno", 0)
            .unwrap();
        let replacement = InfoNode::new(&VAR).with("value", "0.2.0").unwrap();
        let rule = VAR.patch;
        let mut buf = lines("__version__ = u\"0.0.1\"  # '0.0.1'");
        rule.apply(&current, &replacement, &mut buf);
        assert_eq!(buf, vec!["__version__ = u\"0.2.0\"  # '0.0.1'"]);
    }

    #[test]
    fn test_identical_replacement_is_not_pending() {
        let current = InfoNode::new(&RST_TITLE)
            .with("text", "Title")
            .unwrap()
            .with("symbol", "=")
            .unwrap();
        let replacement = InfoNode::new(&RST_TITLE)
            .with("text", "Title")
            .unwrap()
            .with("symbol", "=")
            .unwrap();
        assert!(!PatchRule::RstTitle.is_pending(&current, &replacement));
    }
}
