//! Value-only substitution on scanned YAML

use super::scanner::{scan, ScalarStyle, TokenKind, YamlToken};
use crate::content::Substitution;
use std::ops::Range;
use tracing::trace;

/// Whether the token before `index` introduces a value scalar
fn introduced(tokens: &[YamlToken], index: usize) -> bool {
    tokens[..index]
        .iter()
        .rev()
        .find(|token| token.kind != TokenKind::Property)
        .is_some_and(|token| {
            matches!(
                token.kind,
                TokenKind::Value
                    | TokenKind::BlockEntry
                    | TokenKind::FlowEntry
                    | TokenKind::FlowSequenceStart
            )
        })
}

/// Whether the scalar at `index` is a mapping key
fn is_key(tokens: &[YamlToken], index: usize) -> bool {
    tokens
        .get(index + 1)
        .is_some_and(|token| token.kind == TokenKind::Value)
}

/// Spans of value scalars, as `(line, span)`
pub fn value_spans(tokens: &[YamlToken]) -> Vec<(usize, Range<usize>)> {
    let mut spans = Vec::new();
    // eligibility of the scalar (or block scalar) being continued
    let mut eligible = false;
    for (index, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Scalar(ScalarStyle::Continuation | ScalarStyle::Block) => {}
            TokenKind::Scalar(_) => {
                eligible = introduced(tokens, index) && !is_key(tokens, index);
            }
            TokenKind::BlockScalarHeader => {
                eligible = introduced(tokens, index);
                continue;
            }
            _ => continue,
        }
        if eligible {
            spans.push((token.line, token.span.clone()));
        }
    }
    spans
}

/// Start of the comment on `line`: a `#` at the start of the line or after whitespace,
/// outside every scalar span of the line
pub fn comment_start(line: &str, scalars: &[Range<usize>]) -> Option<usize> {
    line.char_indices().find_map(|(i, c)| {
        let starts = c == '#'
            && (i == 0 || line[..i].ends_with(char::is_whitespace))
            && !scalars.iter().any(|span| span.contains(&i));
        starts.then_some(i)
    })
}

/// Substitute inside value scalars, and inside comments when `comments`
pub fn substitute(lines: &mut [String], substitution: &Substitution, comments: bool) {
    let tokens = scan(lines);
    let mut edits: Vec<(usize, Range<usize>)> = value_spans(&tokens);

    if comments {
        for (lineno, line) in lines.iter().enumerate() {
            let scalars: Vec<Range<usize>> = tokens
                .iter()
                .filter(|token| token.line == lineno && token.is_scalar())
                .map(|token| token.span.clone())
                .collect();
            if let Some(start) = comment_start(line, &scalars) {
                edits.push((lineno, start..line.len()));
            }
        }
    }

    // right to left on each line, so earlier spans stay valid
    edits.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.start.cmp(&a.1.start)));
    for (lineno, span) in edits {
        if let Some(line) = lines.get_mut(lineno) {
            if span.end <= line.len() && substitution.replace_span(line, span.clone()) {
                trace!(lineno, ?span, "yaml substitution");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::split_lines;

    fn run(source: &str, comments: bool) -> String {
        let mut lines = split_lines(source);
        substitute(&mut lines, &Substitution::new("old", "new"), comments);
        lines.join("\n")
    }

    #[test]
    fn test_values_only() {
        assert_eq!(run("old: old", false), "old: new");
        assert_eq!(run("- old\n- old: old", false), "- new\n- old: new");
    }

    #[test]
    fn test_quoted_values_keep_quotes() {
        assert_eq!(run("k: 'old'\nj: \"old\"", false), "k: 'new'\nj: \"new\"");
    }

    #[test]
    fn test_flow_collections() {
        assert_eq!(run("k: [old, old]", false), "k: [new, new]");
        assert_eq!(run("k: {old: old}", false), "k: {old: new}");
    }

    #[test]
    fn test_block_scalar() {
        let source = "script: |\n  pip install old\n  old --help\nold: x";
        let expected = "script: |\n  pip install new\n  new --help\nold: x";
        assert_eq!(run(source, false), expected);
    }

    #[test]
    fn test_comments() {
        let source = "k: v # old\n# old\nurl: a#old";
        assert_eq!(run(source, false), "k: v # old\n# old\nurl: a#new");
        assert_eq!(run(source, true), "k: v # new\n# new\nurl: a#new");
    }

    #[test]
    fn test_hash_inside_quotes_is_not_a_comment() {
        assert_eq!(run("old: 'x #old'", false), "old: 'x #new'");
        assert_eq!(
            comment_start("k: 'x #old' # c", &[4..10]),
            Some(12)
        );
    }

    #[test]
    fn test_anchor_is_transparent() {
        assert_eq!(run("k: &anchor old\nj: *anchor", false), "k: &anchor new\nj: *anchor");
    }
}
