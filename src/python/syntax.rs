//! tree-sitter helpers for Python sources

use crate::error::{format_source_context, Error, Result};
use std::ops::Range;
use tree_sitter::{Node, Parser, Tree};

/// Parse a module, failing on the first syntax error the grammar reports
pub(crate) fn parse(source: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|err| parse_error(source, 0, format!("cannot load the Python grammar: {err}")))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| parse_error(source, 0, "the parser produced no tree".to_string()))?;

    if let Some(node) = first_error(tree.root_node()) {
        let message = if node.is_missing() {
            format!("missing {}", node.kind())
        } else {
            "invalid syntax".to_string()
        };
        return Err(parse_error(source, node.start_position().row, message));
    }
    Ok(tree)
}

fn parse_error(source: &str, line: usize, message: String) -> Error {
    Error::Parse {
        format: "python".to_string(),
        line,
        message,
        source_context: format_source_context(source, line),
    }
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    children(node)
        .into_iter()
        .find_map(first_error)
        .or(Some(node))
}

pub(crate) fn children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

pub(crate) fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

pub(crate) fn field_children<'tree>(node: Node<'tree>, field: &str) -> Vec<Node<'tree>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor).collect()
}

pub(crate) fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or_default()
}

/// A string literal without interpolation
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StringLiteral {
    /// Byte range of the text between the delimiters
    pub content: Range<usize>,
    pub row: usize,
    /// Byte column of the literal, prefix included
    pub column: usize,
    pub end_row: usize,
}

pub(crate) fn string_literal(node: Node<'_>) -> Option<StringLiteral> {
    if node.kind() != "string" {
        return None;
    }
    let parts = children(node);
    let start = parts.first().filter(|part| part.kind() == "string_start")?;
    let end = parts.last().filter(|part| part.kind() == "string_end")?;
    if parts.iter().any(|part| part.kind() == "interpolation") {
        return None;
    }
    Some(StringLiteral {
        content: start.end_byte()..end.start_byte(),
        row: node.start_position().row,
        column: node.start_position().column,
        end_row: node.end_position().row,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_module() {
        let tree = parse("import os\n\nx = 'a'\n").unwrap();
        assert_eq!(tree.root_node().kind(), "module");
    }

    #[test]
    fn test_parse_error_has_context() {
        match parse("x = 1\ndef (:\n    pass\n") {
            Err(Error::Parse {
                line,
                source_context,
                ..
            }) => {
                assert_eq!(line, 1);
                assert!(source_context.contains(">>   2 | def (:"));
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_string_literal_content() {
        let source = "x = u'abc'\ny = f'{x}'\n";
        let tree = parse(source).unwrap();
        let root = tree.root_node();
        let strings: Vec<_> = named_children(root)
            .into_iter()
            .filter_map(|stmt| named_children(stmt).into_iter().next())
            .filter_map(|assignment| assignment.child_by_field_name("right"))
            .collect();
        let plain = string_literal(strings[0]).unwrap();
        assert_eq!(&source[plain.content], "abc");
        assert_eq!(plain.column, 4);
        assert!(string_literal(strings[1]).is_none());
    }
}
