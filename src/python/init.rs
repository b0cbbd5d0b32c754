//! `__init__.py` facts: the module level `__version__` string

use super::syntax::{named_children, string_literal, text};
use crate::facts::schema::{INIT, VAR};
use crate::facts::InfoNode;
use tracing::debug;
use tree_sitter::Node;

const VERSION: &str = "__version__";

/// Read `InitInfo` from a parsed module whose code part starts at row `offset`
pub(crate) fn extract(root: Node<'_>, source: &str, offset: usize) -> InfoNode {
    let mut info = InfoNode::new(&INIT);
    let var = named_children(root)
        .into_iter()
        .find_map(|statement| version(statement, source, offset));
    let Some(var) = var else {
        return info;
    };
    if let Err(err) = info.set_node("version", var) {
        debug!(%err, "__version__ skipped");
    }
    info
}

fn version(statement: Node<'_>, source: &str, offset: usize) -> Option<InfoNode> {
    if statement.kind() != "expression_statement" {
        return None;
    }
    let assignment = named_children(statement)
        .into_iter()
        .find(|node| node.kind() == "assignment")?;
    let left = assignment.child_by_field_name("left")?;
    if left.kind() != "identifier" || text(left, source) != VERSION {
        return None;
    }
    let literal = string_literal(assignment.child_by_field_name("right")?)?;
    let lineno = literal.row.checked_sub(offset)?;
    InfoNode::new(&VAR)
        .with("var", VERSION)
        .and_then(|var| var.with("value", &source[literal.content.clone()]))
        .and_then(|var| var.with("lineno", lineno))
        .and_then(|var| var.with("column", literal.column))
        .map_err(|err| debug!(%err, "__version__ is not a single line string"))
        .ok()
}
