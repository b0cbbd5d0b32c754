//! Module docstrings
//!
//! The docstring body is handed to the RST reader as its own content. The text around it
//! (everything up to and including the opening delimiter, and the closing delimiter
//! with the rest of its line) is kept verbatim in a [`Frame`], together with the
//! indentation stripped from the body lines, so that the module can be rebuilt byte for
//! byte.

use super::syntax::{named_children, string_literal, StringLiteral};
use crate::content::{StructuredContent, Substitution};
use crate::facts::schema::PY_DOCSTRING;
use crate::registry::Format;
use crate::rst;
use tree_sitter::Node;

/// The first statement of the module, when it is a lone string literal
pub(crate) fn find(root: Node<'_>) -> Option<StringLiteral> {
    let first = named_children(root).into_iter().next()?;
    if first.kind() != "expression_statement" {
        return None;
    }
    match named_children(first).as_slice() {
        [string] => string_literal(*string),
        _ => None,
    }
}

#[derive(Debug, Clone)]
struct Frame {
    head: String,
    tail: String,
    indent: String,
    /// Which body lines had `indent` stripped
    indented: Vec<bool>,
}

#[derive(Debug, Clone)]
pub(crate) struct Docstring {
    frame: Frame,
    pub(crate) content: StructuredContent,
}

/// Longest whitespace prefix shared by the non blank lines
fn common_indent<'a>(lines: &[&'a str]) -> &'a str {
    lines
        .iter()
        .copied()
        .filter(|line| !line.trim().is_empty())
        .map(|line| &line[..line.len() - line.trim_start().len()])
        .reduce(|a, b| {
            let shared = a.bytes().zip(b.bytes()).take_while(|(x, y)| x == y).count();
            &a[..shared]
        })
        .unwrap_or("")
}

impl Docstring {
    /// `head` ends with the opening delimiter, `tail` starts with the closing one
    pub(crate) fn new(head: &str, body: &str, tail: &str) -> Self {
        let raw: Vec<&str> = body.split('\n').collect();
        let indent = common_indent(raw.get(1..).unwrap_or_default());

        let mut indented = Vec::with_capacity(raw.len());
        let mut lines = Vec::with_capacity(raw.len());
        for (index, line) in raw.iter().enumerate() {
            match line.strip_prefix(indent) {
                Some(rest) if index > 0 && !indent.is_empty() => {
                    indented.push(true);
                    lines.push(rest.to_string());
                }
                _ => {
                    indented.push(false);
                    lines.push(line.to_string());
                }
            }
        }

        let info = rst::extract(&lines, &PY_DOCSTRING);
        Self {
            frame: Frame {
                head: head.to_string(),
                tail: tail.to_string(),
                indent: indent.to_string(),
                indented,
            },
            content: StructuredContent::new(Format::Rst, lines, info),
        }
    }

    pub(crate) fn substitute(&mut self, substitution: &Substitution) -> bool {
        let mut changed = self.content.substitute(substitution);
        for part in [&mut self.frame.head, &mut self.frame.tail] {
            let replaced = substitution.replace(part);
            if replaced != *part {
                *part = replaced;
                changed = true;
            }
        }
        changed
    }

    pub(crate) fn output(&self) -> String {
        let mut out = self.frame.head.clone();
        for (index, line) in self.content.lines().iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            if self.frame.indented.get(index).copied().unwrap_or(false) {
                out.push_str(&self.frame.indent);
            }
            out.push_str(line);
        }
        out.push_str(&self.frame.tail);
        out
    }
}
