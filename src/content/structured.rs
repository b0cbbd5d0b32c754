//! Contents with a fact tree

use super::{split_lines, Content, Substitution, Transform};
use crate::error::{Error, Result};
use crate::facts::InfoNode;
use crate::registry::Format;
use crate::rst;
use tracing::debug;

/// Lines plus the facts read from them; fact line numbers index `lines`
#[derive(Debug, Clone)]
pub struct StructuredContent {
    format: Format,
    lines: Vec<String>,
    info: InfoNode,
}

impl StructuredContent {
    pub fn new(format: Format, lines: Vec<String>, info: InfoNode) -> Self {
        Self {
            format,
            lines,
            info,
        }
    }

    pub fn from_source(format: Format, source: &str, info: InfoNode) -> Self {
        Self::new(format, split_lines(source), info)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn facts(&self) -> &InfoNode {
        &self.info
    }

    /// Validate a replacement tree against the facts and lines
    pub fn check(&self, replacement: &InfoNode) -> Result<()> {
        self.info.check(replacement, &self.lines)
    }

    /// Patch lines and merge facts; call [`StructuredContent::check`] first
    pub(crate) fn apply(&mut self, replacement: &InfoNode) {
        self.info.apply(replacement, &mut self.lines);
    }

    pub fn update(&mut self, replacement: &InfoNode) -> Result<()> {
        self.check(replacement)?;
        self.apply(replacement);
        Ok(())
    }

    /// Free-text substitution over every line
    pub fn substitute(&mut self, substitution: &Substitution) -> bool {
        substitution.apply_lines(&mut self.lines)
    }
}

impl Content for StructuredContent {
    fn format(&self) -> Format {
        self.format
    }

    fn info(&self) -> Option<InfoNode> {
        Some(self.info.clone())
    }

    fn transform(&mut self, transform: &Transform) -> Result<()> {
        if transform.import.is_some() {
            return Err(Error::UnsupportedFormat {
                format: self.format.to_string(),
                operation: "import renames".to_string(),
            });
        }
        if let Some(facts) = &transform.facts {
            self.update(facts)?;
        }
        if let Some(substitution) = &transform.substitution {
            if self.substitute(substitution) && self.format == Format::Rst {
                debug!("re-reading facts after substitution");
                self.info = rst::extract(&self.lines, self.info.schema());
            }
        }
        Ok(())
    }

    fn output(&self) -> String {
        self.lines.join("\n")
    }
}
