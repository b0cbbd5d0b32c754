//! `setup.py` facts
//!
//! The `setup` callable is resolved from the imports of the module:
//!
//! - `from setuptools import setup` / `from setuptools import setup as alias`
//! - `import setuptools` / `import setuptools as alias`, called as `alias.setup(...)`
//!
//! The first call to it provides the facts: keyword arguments named like a
//! `SetupKwargsInfo` field holding a string literal, or a list of string literals for
//! sequence fields. Line numbers are relative to the code part of the module.

use super::syntax::{field_children, named_children, string_literal, text};
use crate::facts::schema::{KWARG, SETUP, SETUP_KWARGS};
use crate::facts::{FieldKind, InfoNode};
use tracing::debug;
use tree_sitter::Node;

const SETUP_MODULES: &[&str] = &["setuptools", "distutils.core"];

/// Read `SetupInfo` from a parsed module whose code part starts at row `offset`
pub(crate) fn extract(root: Node<'_>, source: &str, offset: usize) -> InfoNode {
    let mut info = InfoNode::new(&SETUP);
    let callees = setup_callees(root, source);
    let Some(call) = find_call(root, source, &callees) else {
        debug!(?callees, "no setup() call");
        return info;
    };
    if let Err(err) = info.set_node("setup", read_kwargs(call, source, offset)) {
        debug!(%err, "setup() facts skipped");
    }
    info
}

fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Names under which `setup` can be called, in import order
fn setup_callees(root: Node<'_>, source: &str) -> Vec<String> {
    let mut callees = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match node.kind() {
            "import_from_statement" => {
                let module = node
                    .child_by_field_name("module_name")
                    .map(|m| compact(text(m, source)))
                    .unwrap_or_default();
                if !SETUP_MODULES.contains(&module.as_str()) {
                    continue;
                }
                for name in field_children(node, "name") {
                    match name.kind() {
                        "dotted_name" if text(name, source) == "setup" => {
                            callees.push("setup".to_string())
                        }
                        "aliased_import" => {
                            let part = |field: &str| {
                                name.child_by_field_name(field).map(|n| text(n, source))
                            };
                            let (imported, alias) = (part("name"), part("alias"));
                            if let (Some("setup"), Some(alias)) = (imported, alias) {
                                callees.push(alias.to_string());
                            }
                        }
                        _ => {}
                    }
                }
            }
            "import_statement" => {
                for name in field_children(node, "name") {
                    let (module, alias) = match name.kind() {
                        "aliased_import" => (
                            name.child_by_field_name("name"),
                            name.child_by_field_name("alias").map(|n| text(n, source).to_string()),
                        ),
                        _ => (Some(name), None),
                    };
                    let module = module.map(|m| compact(text(m, source))).unwrap_or_default();
                    if SETUP_MODULES.contains(&module.as_str()) {
                        callees.push(format!("{}.setup", alias.unwrap_or(module)));
                    }
                }
            }
            _ => {
                // push in reverse so that nodes pop in source order
                let mut children = named_children(node);
                children.reverse();
                stack.extend(children);
            }
        }
    }
    callees
}

/// First call, in source order, to one of `callees`
fn find_call<'tree>(root: Node<'tree>, source: &str, callees: &[String]) -> Option<Node<'tree>> {
    if callees.is_empty() {
        return None;
    }
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.kind() == "call" {
            let function = node
                .child_by_field_name("function")
                .map(|f| compact(text(f, source)));
            if function.is_some_and(|f| callees.contains(&f)) {
                return Some(node);
            }
        }
        let mut children = named_children(node);
        children.reverse();
        stack.extend(children);
    }
    None
}

fn kwarg(arg: &str, value: Node<'_>, source: &str, offset: usize) -> Option<InfoNode> {
    let literal = string_literal(value)?;
    let Some(lineno) = literal.row.checked_sub(offset) else {
        debug!(arg, row = literal.row, "argument before the code part");
        return None;
    };
    let fact = InfoNode::new(&KWARG)
        .with("arg", arg)
        .and_then(|k| k.with("value", &source[literal.content.clone()]))
        .and_then(|k| k.with("lineno", lineno))
        .and_then(|k| k.with("column", literal.column));
    match fact {
        Ok(fact) => Some(fact),
        Err(err) => {
            debug!(arg, %err, "argument skipped");
            None
        }
    }
}

fn read_kwargs(call: Node<'_>, source: &str, offset: usize) -> InfoNode {
    let mut kwargs = InfoNode::new(&SETUP_KWARGS);
    let Some(arguments) = call.child_by_field_name("arguments") else {
        return kwargs;
    };
    for argument in named_children(arguments) {
        if argument.kind() != "keyword_argument" {
            continue;
        }
        let (Some(name), Some(value)) = (
            argument.child_by_field_name("name"),
            argument.child_by_field_name("value"),
        ) else {
            continue;
        };
        let name = text(name, source);
        let Some((_, def)) = SETUP_KWARGS.field(name) else {
            continue;
        };
        let stored = match def.kind {
            FieldKind::Node(_) => kwarg(name, value, source, offset)
                .map(|fact| kwargs.set_node(name, fact).map(|_| ())),
            FieldKind::Sequence(_) if matches!(value.kind(), "list" | "tuple") => {
                named_children(value)
                    .into_iter()
                    .map(|element| kwarg(name, element, source, offset))
                    .collect::<Option<Vec<_>>>()
                    .map(|items| kwargs.set_sequence(name, items).map(|_| ()))
            }
            _ => None,
        };
        match stored {
            Some(Ok(())) => debug!(arg = name, "setup() argument"),
            Some(Err(err)) => debug!(arg = name, %err, "setup() argument skipped"),
            None => debug!(arg = name, kind = value.kind(), "setup() argument is not a literal"),
        }
    }
    kwargs
}
