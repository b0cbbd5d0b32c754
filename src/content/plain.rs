//! Contents without a fact tree

use super::{split_lines, Content, Transform};
use crate::config::SubstitutionConfig;
use crate::error::{Error, Result};
use crate::facts::InfoNode;
use crate::registry::Format;
use crate::{ini, yaml};

/// Lines of a plain text, INI or YAML file
#[derive(Debug, Clone)]
pub struct PlainContent {
    format: Format,
    lines: Vec<String>,
    defaults: SubstitutionConfig,
}

impl PlainContent {
    pub fn new(format: Format, source: &str) -> Self {
        Self {
            format,
            lines: split_lines(source),
            defaults: SubstitutionConfig::default(),
        }
    }

    /// Use `defaults` for substitutions that leave the comment policy open
    pub fn with_defaults(mut self, defaults: SubstitutionConfig) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl Content for PlainContent {
    fn format(&self) -> Format {
        self.format
    }

    fn info(&self) -> Option<InfoNode> {
        None
    }

    fn transform(&mut self, transform: &Transform) -> Result<()> {
        if transform.facts.is_some() {
            return Err(Error::UnsupportedFormat {
                format: self.format.to_string(),
                operation: "structural updates".to_string(),
            });
        }
        if transform.import.is_some() {
            return Err(Error::UnsupportedFormat {
                format: self.format.to_string(),
                operation: "import renames".to_string(),
            });
        }
        if let Some(substitution) = &transform.substitution {
            match self.format {
                Format::Ini => {
                    let comments = substitution.rewrites_comments(self.defaults.ini_comments);
                    ini::substitute(&mut self.lines, substitution, comments);
                }
                Format::Yaml => {
                    let comments = substitution.rewrites_comments(self.defaults.yaml_comments);
                    yaml::substitute(&mut self.lines, substitution, comments);
                }
                _ => {
                    substitution.apply_lines(&mut self.lines);
                }
            }
        }
        Ok(())
    }

    fn output(&self) -> String {
        self.lines.join("\n")
    }
}
