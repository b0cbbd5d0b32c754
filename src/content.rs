//! Source-mapped contents
//!
//! A content owns the lines of one file and, for structured formats, the fact tree that
//! was read from them. Every edit happens on the lines in place; `output` only joins
//! them back, it never re-derives text from facts.
//!
//! - [`PlainContent`]: no facts, literal substitution only (plain text, INI, YAML)
//! - [`StructuredContent`]: lines plus a fact tree (RST, and the parts of a Python module)
//! - [`crate::python::PyContent`]: a Python module split into docstring and code parts

pub mod plain;
pub mod structured;
pub mod substitution;

pub use plain::PlainContent;
pub use structured::StructuredContent;
pub use substitution::Substitution;

use crate::error::Result;
use crate::facts::InfoNode;
use crate::python::ImportRename;
use crate::registry::Format;
use std::fmt;

/// A parsed file that can be transformed and serialized back
pub trait Content: fmt::Debug {
    fn format(&self) -> Format;

    /// Snapshot of the current fact tree, `None` for formats without facts
    fn info(&self) -> Option<InfoNode>;

    /// Apply a transform: structural patch, then import rename, then substitution
    fn transform(&mut self, transform: &Transform) -> Result<()>;

    /// The current text
    fn output(&self) -> String;
}

/// The edits of one `transform` call
#[derive(Debug, Clone, Default)]
pub struct Transform {
    pub facts: Option<InfoNode>,
    pub import: Option<ImportRename>,
    pub substitution: Option<Substitution>,
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_facts(mut self, facts: InfoNode) -> Self {
        self.facts = Some(facts);
        self
    }

    pub fn with_import_rename(mut self, rename: ImportRename) -> Self {
        self.import = Some(rename);
        self
    }

    pub fn with_substitution(mut self, substitution: Substitution) -> Self {
        self.substitution = Some(substitution);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_none() && self.import.is_none() && self.substitution.is_none()
    }
}

/// Split text into editable lines; `join("\n")` restores it exactly
pub(crate) fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_round_trip() {
        for text in ["", "\n", "a", "a\n", "a\r\nb\n\n", "\n\nx"] {
            assert_eq!(split_lines(text).join("\n"), text);
        }
    }

    #[test]
    fn test_transform_builder() {
        let transform = Transform::new();
        assert!(transform.is_empty());
        let transform = transform.with_substitution(Substitution::new("a", "b"));
        assert!(!transform.is_empty());
        assert!(transform.facts.is_none());
    }
}
