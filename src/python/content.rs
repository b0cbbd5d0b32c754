//! Python modules as two sub-contents
//!
//! A module is split right after the line that closes its docstring:
//!
//! ```text
//! #!/usr/bin/env python          ┐
//! """                            │ docstring frame (head)
//!     pkg.module                 │ ┐
//!     ~~~~~~~~~~                 │ │ docstring content (RST, dedented)
//!     :copyright: 2017 me        │ ┘
//! """                            ┘ docstring frame (tail)
//! from setuptools import setup   ┐
//! setup(name='pkg')              ┘ code content
//! ```
//!
//! Fact line numbers are relative to the sub-content that owns them.
//! `docstring_lineno` is the row of the module where the code part starts.

use super::docstring::{self, Docstring};
use super::imports;
use super::syntax;
use super::{init, setup};
use crate::content::{split_lines, Content, StructuredContent, Substitution, Transform};
use crate::error::{Error, Result};
use crate::facts::schema::{CODE, PY_INFO, PY_INIT, PY_SETUP};
use crate::facts::{InfoNode, NodeSchema};
use crate::registry::Format;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct PyContent {
    format: Format,
    docstring: Option<Docstring>,
    code: StructuredContent,
    /// Row of the module where `code` starts
    code_row: usize,
    /// Whether a line break separates the docstring from `code`
    joined: bool,
}

/// Schema of the whole module for a Python format
fn module_schema(format: Format) -> &'static NodeSchema {
    match format {
        Format::PythonSetup => &PY_SETUP,
        Format::PythonInit => &PY_INIT,
        _ => &PY_INFO,
    }
}

impl PyContent {
    /// Parse a module; `format` selects which code facts are read
    pub fn parse(format: Format, source: &str) -> Result<Self> {
        let tree = syntax::parse(source)?;
        let root = tree.root_node();

        let (docstring, code_start, code_row) = match docstring::find(root) {
            Some(literal) => {
                let end = source[literal.content.end..]
                    .find('\n')
                    .map_or(source.len(), |i| literal.content.end + i);
                let docstring = Docstring::new(
                    &source[..literal.content.start],
                    &source[literal.content.clone()],
                    &source[literal.content.end..end],
                );
                (Some(docstring), end, literal.end_row + 1)
            }
            None => (None, 0, 0),
        };
        let joined = docstring.is_some() && code_start < source.len();
        let code_text = match &docstring {
            Some(_) if joined => &source[code_start + 1..],
            Some(_) => "",
            None => source,
        };

        let facts = match format {
            Format::PythonSetup => setup::extract(root, source, code_row),
            Format::PythonInit => init::extract(root, source, code_row),
            _ => InfoNode::new(&CODE),
        };
        debug!(
            %format,
            docstring = docstring.is_some(),
            code_row,
            "parsed python module"
        );
        Ok(Self {
            format,
            docstring,
            code: StructuredContent::from_source(format, code_text, facts),
            code_row,
            joined,
        })
    }

    pub fn schema(&self) -> &'static NodeSchema {
        module_schema(self.format)
    }

    /// The dedented docstring body, if the module has one
    pub fn docstring(&self) -> Option<&StructuredContent> {
        self.docstring.as_ref().map(|docstring| &docstring.content)
    }

    pub fn code(&self) -> &StructuredContent {
        &self.code
    }

    fn update(&mut self, replacement: &InfoNode) -> Result<()> {
        let schema = self.schema();
        if !schema.is(replacement.schema()) {
            return Err(Error::SchemaMismatch {
                expected: schema.name.to_string(),
                found: replacement.schema().name.to_string(),
            });
        }

        let docstring = replacement.node("docstring");
        match (&self.docstring, docstring) {
            (Some(current), Some(docstring)) => current.content.check(docstring)?,
            (None, Some(docstring)) if docstring.slots().any(|(_, slot)| slot.is_present()) => {
                return Err(Error::UnsupportedFormat {
                    format: self.format.to_string(),
                    operation: "adding a docstring".to_string(),
                });
            }
            _ => {}
        }
        let code = replacement.node("code");
        if let Some(code) = code {
            self.code.check(code)?;
        }

        if let (Some(current), Some(docstring)) = (&mut self.docstring, docstring) {
            current.content.apply(docstring);
        }
        if let Some(code) = code {
            self.code.apply(code);
        }
        Ok(())
    }

    fn substitute(&mut self, substitution: &Substitution) -> bool {
        let docstring = self
            .docstring
            .as_mut()
            .is_some_and(|docstring| docstring.substitute(substitution));
        let code = self.code.substitute(substitution);
        docstring || code
    }

    /// Re-read every fact after literal edits
    fn refresh(&mut self) {
        match Self::parse(self.format, &self.output()) {
            Ok(fresh) => *self = fresh,
            Err(err) => warn!(%err, "module no longer parses, facts left as they were"),
        }
    }
}

impl Content for PyContent {
    fn format(&self) -> Format {
        self.format
    }

    fn info(&self) -> Option<InfoNode> {
        let mut info = InfoNode::new(self.schema());
        if let Some(docstring) = &self.docstring {
            info.set_node("docstring", docstring.content.facts().clone()).ok()?;
        }
        info.set_node("code", self.code.facts().clone()).ok()?;
        info.set("docstring_lineno", self.code_row).ok()?;
        Some(info)
    }

    fn transform(&mut self, transform: &Transform) -> Result<()> {
        if let Some(facts) = &transform.facts {
            self.update(facts)?;
        }
        if let Some(rename) = &transform.import {
            // over the whole module: code may share the line that closes the docstring
            let mut lines = split_lines(&self.output());
            if imports::rename(&mut lines, rename)? {
                *self = Self::parse(self.format, &lines.join("\n"))?;
            }
        }
        if let Some(substitution) = &transform.substitution {
            if self.substitute(substitution) {
                self.refresh();
            }
        }
        Ok(())
    }

    fn output(&self) -> String {
        let code = self.code.lines().join("\n");
        match &self.docstring {
            Some(docstring) if self.joined => format!("{}\n{}", docstring.output(), code),
            Some(docstring) => docstring.output(),
            None => code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::schema::{KWARG, PY_DOCSTRING, RST_TITLE, SETUP, SETUP_KWARGS};
    use crate::python::ImportRename;

    const SETUP_PY: &str = r#"#!/usr/bin/env python
"""
    old_pkg
    ~~~~~~~

    :copyright: 2017 Someone
"""
from setuptools import setup

setup(
    name='old_pkg',
    packages=['old_pkg', 'old_pkg.sub'],
)
"#;

    #[test]
    fn test_round_trip() {
        for source in [SETUP_PY, "", "\n", "'''doc'''", "'''doc'''\n", "import os\n", "x = 1"] {
            let content = PyContent::parse(Format::PythonSetup, source).unwrap();
            assert_eq!(content.output(), source);
        }
    }

    #[test]
    fn test_parts_and_offsets() {
        let content = PyContent::parse(Format::PythonSetup, SETUP_PY).unwrap();
        let info = content.info().unwrap();
        assert!(info.schema().is(&PY_SETUP));
        assert_eq!(info.int("docstring_lineno"), Some(7));
        let title = info.node("docstring").and_then(|d| d.node("title")).unwrap();
        assert_eq!(title.str("text"), Some("old_pkg"));
        assert_eq!(title.lineno(), Some(1));
        let name = info
            .node("code")
            .and_then(|c| c.node("setup"))
            .and_then(|s| s.node("name"))
            .unwrap();
        assert_eq!(name.lineno(), Some(3));
        assert_eq!(content.code().lines()[3], "    name='old_pkg',");
    }

    #[test]
    fn test_structural_update_touches_both_parts() {
        let mut content = PyContent::parse(Format::PythonSetup, SETUP_PY).unwrap();
        let facts = InfoNode::new(&PY_SETUP)
            .with_node(
                "docstring",
                InfoNode::new(&PY_DOCSTRING)
                    .with_node("title", InfoNode::new(&RST_TITLE).with("text", "pkg").unwrap())
                    .unwrap(),
            )
            .and_then(|info| {
                info.with_node(
                    "code",
                    InfoNode::new(&SETUP)
                        .with_node(
                            "setup",
                            InfoNode::new(&SETUP_KWARGS)
                                .with_node("name", InfoNode::new(&KWARG).with("value", "pkg").unwrap())
                                .unwrap(),
                        )
                        .unwrap(),
                )
            })
            .unwrap();
        content.transform(&Transform::new().with_facts(facts)).unwrap();
        let output = content.output();
        assert!(output.contains("\n    pkg\n    ~~~\n"));
        assert!(output.contains("name='pkg',"));
        assert!(output.contains("packages=['old_pkg', 'old_pkg.sub'],"));
    }

    #[test]
    fn test_wrong_schema_is_rejected() {
        let mut content = PyContent::parse(Format::PythonInit, "__version__ = '1'\n").unwrap();
        let err = content
            .transform(&Transform::new().with_facts(InfoNode::new(&PY_SETUP)))
            .unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch { .. }));
    }

    #[test]
    fn test_missing_docstring_cannot_be_patched() {
        let mut content = PyContent::parse(Format::Python, "import os\n").unwrap();
        let facts = InfoNode::new(&PY_INFO)
            .with_node(
                "docstring",
                InfoNode::new(&PY_DOCSTRING)
                    .with_node("title", InfoNode::new(&RST_TITLE).with("text", "T").unwrap())
                    .unwrap(),
            )
            .unwrap();
        let err = content.transform(&Transform::new().with_facts(facts)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
        assert_eq!(content.output(), "import os\n");
    }

    #[test]
    fn test_substitution_refreshes_facts() {
        let mut content = PyContent::parse(Format::PythonSetup, SETUP_PY).unwrap();
        content
            .transform(
                &Transform::new()
                    .with_import_rename(ImportRename::new("old_pkg", "pkg"))
                    .with_substitution(Substitution::new("old_pkg", "new_pkg")),
            )
            .unwrap();
        let info = content.info().unwrap();
        let setup = info.node("code").and_then(|c| c.node("setup")).unwrap();
        assert_eq!(setup.node("name").and_then(|n| n.str("value")), Some("new_pkg"));
        let packages = setup.sequence("packages").unwrap();
        assert_eq!(packages[1].str("value"), Some("new_pkg.sub"));
        let title = info.node("docstring").and_then(|d| d.node("title")).unwrap();
        assert_eq!(title.str("text"), Some("new_pkg"));
    }

    #[test]
    fn test_rename_reaches_code_on_the_docstring_closing_line() {
        let source = "\"\"\"Doc\n===\n\"\"\"; import old\nold.x\n";
        let mut content = PyContent::parse(Format::Python, source).unwrap();
        content
            .transform(&Transform::new().with_import_rename(ImportRename::new("old", "new")))
            .unwrap();
        assert_eq!(content.output(), "\"\"\"Doc\n===\n\"\"\"; import new\nnew.x\n");
    }

    #[test]
    fn test_invalid_python() {
        assert!(matches!(
            PyContent::parse(Format::Python, "def (:\n"),
            Err(Error::Parse { .. })
        ));
    }
}
