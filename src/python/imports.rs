//! Renaming an imported top level package
//!
//! Every absolute import of `old` or one of its submodules is rewritten to `new`. Once
//! `import old` (without alias) has bound the name, the identifiers `old` that follow in
//! source order are renamed too, until something rebinds the name:
//!
//! - `import x as old`, `from x import old`, `from x import y as old`
//! - `old = ...` (the right hand side is still renamed)
//! - `def old(...)`, `class old`
//!
//! Keyword argument names, attribute names, strings and comments are never renamed.

use super::syntax::{field_children, named_children, parse, text};
use crate::error::Result;
use tracing::{debug, trace};
use tree_sitter::Node;

/// Rename of the package `old` to `new`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRename {
    pub old: String,
    pub new: String,
}

impl ImportRename {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.old.is_empty() || self.old == self.new
    }

    /// Whether `module` is `old` or one of its submodules
    fn matches(&self, module: &str) -> bool {
        module == self.old
            || module
                .strip_prefix(self.old.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
    }
}

/// A single-row replacement, in byte columns
#[derive(Debug)]
struct Edit {
    row: usize,
    start: usize,
    end: usize,
}

struct Renamer<'a> {
    rename: &'a ImportRename,
    source: &'a str,
    active: bool,
    edits: Vec<Edit>,
}

impl Renamer<'_> {
    fn is_old(&self, node: Node<'_>) -> bool {
        text(node, self.source) == self.rename.old
    }

    fn set_active(&mut self, active: bool, node: Node<'_>) {
        if self.active != active {
            debug!(active, row = node.start_position().row, "identifier renaming");
        }
        self.active = active;
    }

    fn replace(&mut self, node: Node<'_>, len: usize) {
        let (start, end) = (node.start_position(), node.end_position());
        if start.row != end.row {
            debug!(row = start.row, "multi-line name left as is");
            return;
        }
        self.edits.push(Edit {
            row: start.row,
            start: start.column,
            end: start.column + len,
        });
    }

    /// Rewrite a dotted module name if it is under `old`
    fn module(&mut self, node: Node<'_>) -> bool {
        if node.kind() != "dotted_name" || !self.rename.matches(text(node, self.source)) {
            return false;
        }
        self.replace(node, self.rename.old.len());
        true
    }

    fn import(&mut self, node: Node<'_>) {
        for name in field_children(node, "name") {
            match name.kind() {
                "aliased_import" => {
                    if let Some(module) = name.child_by_field_name("name") {
                        self.module(module);
                    }
                    if name.child_by_field_name("alias").is_some_and(|a| self.is_old(a)) {
                        self.set_active(false, name);
                    }
                }
                _ => {
                    if self.module(name) {
                        self.set_active(true, name);
                    }
                }
            }
        }
    }

    fn import_from(&mut self, node: Node<'_>) {
        if let Some(module) = node.child_by_field_name("module_name") {
            self.module(module);
        }
        for name in field_children(node, "name") {
            let bound = match name.kind() {
                "aliased_import" => name.child_by_field_name("alias"),
                _ => Some(name),
            };
            if bound.is_some_and(|b| self.is_old(b)) {
                self.set_active(false, name);
            }
        }
    }

    fn visit_except<'t>(&mut self, node: Node<'t>, skipped: Option<Node<'t>>) {
        for child in named_children(node) {
            if Some(child) != skipped {
                self.visit(child);
            }
        }
    }

    fn visit(&mut self, node: Node<'_>) {
        match node.kind() {
            "import_statement" => self.import(node),
            "import_from_statement" => self.import_from(node),
            "future_import_statement" | "comment" => {}
            "keyword_argument" => {
                if let Some(value) = node.child_by_field_name("value") {
                    self.visit(value);
                }
            }
            "attribute" => {
                if let Some(object) = node.child_by_field_name("object") {
                    self.visit(object);
                }
            }
            "function_definition" | "class_definition" => {
                let name = node.child_by_field_name("name");
                if name.is_some_and(|n| self.is_old(n)) {
                    self.set_active(false, node);
                }
                self.visit_except(node, name);
            }
            "assignment" => {
                let left = node
                    .child_by_field_name("left")
                    .filter(|left| left.kind() == "identifier" && self.is_old(*left));
                match left {
                    Some(left) => {
                        self.visit_except(node, Some(left));
                        self.set_active(false, node);
                    }
                    None => self.visit_except(node, None),
                }
            }
            "identifier" => {
                if self.active && self.is_old(node) {
                    self.replace(node, self.rename.old.len());
                }
            }
            _ => self.visit_except(node, None),
        }
    }
}

/// Rename the imports of `rename.old` in a Python module given as lines.
///
/// Returns whether any line changed.
pub fn rename(lines: &mut [String], rename: &ImportRename) -> Result<bool> {
    if rename.is_noop() {
        return Ok(false);
    }
    let source = lines.join("\n");
    let tree = parse(&source)?;
    let mut renamer = Renamer {
        rename,
        source: &source,
        active: false,
        edits: Vec::new(),
    };
    renamer.visit(tree.root_node());

    let mut edits = renamer.edits;
    // right to left on each row, so earlier columns stay valid
    edits.sort_by(|a, b| a.row.cmp(&b.row).then(b.start.cmp(&a.start)));
    let mut changed = false;
    for edit in edits {
        let Some(line) = lines.get_mut(edit.row) else {
            continue;
        };
        if line.get(edit.start..edit.end) != Some(rename.old.as_str()) {
            continue;
        }
        trace!(row = edit.row, column = edit.start, "rename import");
        line.replace_range(edit.start..edit.end, &rename.new);
        changed = true;
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::split_lines;

    fn run(source: &str) -> String {
        let mut lines = split_lines(source);
        rename(&mut lines, &ImportRename::new("old", "new")).unwrap();
        lines.join("\n")
    }

    #[test]
    fn test_plain_import_renames_usages() {
        assert_eq!(
            run("import old\nold.run()\nx = old\n"),
            "import new\nnew.run()\nx = new\n"
        );
    }

    #[test]
    fn test_submodules() {
        assert_eq!(
            run("import old.sub\nold.sub.f()\n"),
            "import new.sub\nnew.sub.f()\n"
        );
        assert_eq!(
            run("from old.sub import thing\nthing()\nold = 1\n"),
            "from new.sub import thing\nthing()\nold = 1\n"
        );
    }

    #[test]
    fn test_aliased_import_keeps_alias() {
        assert_eq!(run("import old as o\no.run()\n"), "import new as o\no.run()\n");
    }

    #[test]
    fn test_keywords_attributes_strings_and_comments() {
        assert_eq!(
            run("import old\nf(old=old.old)  # old\ns = 'old'\n"),
            "import new\nf(old=new.old)  # old\ns = 'old'\n"
        );
    }

    #[test]
    fn test_rebinding_stops_renaming() {
        assert_eq!(
            run("import old\nold = old.x\nold.y\n"),
            "import new\nold = new.x\nold.y\n"
        );
        assert_eq!(
            run("import old\nfrom x import old\nold.y\n"),
            "import new\nfrom x import old\nold.y\n"
        );
        assert_eq!(
            run("import old\ndef old():\n    pass\nold()\n"),
            "import new\ndef old():\n    pass\nold()\n"
        );
    }

    #[test]
    fn test_prefix_is_not_a_match() {
        let source = "import oldish\noldish.x\n";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_several_edits_on_one_line() {
        assert_eq!(
            run("import old, os\nold.a(old.b)\n"),
            "import new, os\nnew.a(new.b)\n"
        );
    }

    #[test]
    fn test_invalid_source() {
        let mut lines = split_lines("import (\n");
        assert!(rename(&mut lines, &ImportRename::new("old", "new")).is_err());
    }
}
