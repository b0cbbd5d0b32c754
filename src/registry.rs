//! Formats and the path registry
//!
//! A [`Format`] knows how to parse text into a [`Content`]. The [`FormatRegistry`]
//! maps file paths to formats through an ordered list of glob patterns: the first
//! pattern that matches wins, and unmatched paths are plain text.

use crate::config::{RecastConfig, SubstitutionConfig};
use crate::content::{Content, PlainContent};
use crate::error::{Error, Result};
use crate::facts::schema::{PY_INFO, PY_INIT, PY_SETUP, RST_SCRIPT};
use crate::facts::NodeSchema;
use crate::python::PyContent;
use crate::rst;
use glob_match::glob_match;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, error};

/// A supported file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    Plain,
    Rst,
    Python,
    PythonSetup,
    PythonInit,
    Ini,
    Yaml,
}

impl Format {
    pub const ALL: [Format; 7] = [
        Format::Plain,
        Format::Rst,
        Format::Python,
        Format::PythonSetup,
        Format::PythonInit,
        Format::Ini,
        Format::Yaml,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Format::Plain => "plain",
            Format::Rst => "rst",
            Format::Python => "python",
            Format::PythonSetup => "python-setup",
            Format::PythonInit => "python-init",
            Format::Ini => "ini",
            Format::Yaml => "yaml",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Format::Plain => "Plain text, literal substitution only",
            Format::Rst => "reStructuredText: first title and field list",
            Format::Python => "Python module: docstring and imports",
            Format::PythonSetup => "Python setup script: setup() keyword arguments",
            Format::PythonInit => "Python package init: __version__",
            Format::Ini => "INI/cfg: values and optionally comments",
            Format::Yaml => "YAML: value scalars and comments",
        }
    }

    /// Schema of the fact tree, `None` for formats without facts
    pub fn schema(&self) -> Option<&'static NodeSchema> {
        match self {
            Format::Rst => Some(&RST_SCRIPT),
            Format::Python => Some(&PY_INFO),
            Format::PythonSetup => Some(&PY_SETUP),
            Format::PythonInit => Some(&PY_INIT),
            Format::Plain | Format::Ini | Format::Yaml => None,
        }
    }

    /// Parse `source`; `defaults` decide the comment policy of substitutions
    pub fn parse(&self, source: &str, defaults: SubstitutionConfig) -> Result<Box<dyn Content>> {
        let content: Box<dyn Content> = match self {
            Format::Rst => Box::new(rst::parse(source)),
            Format::Python | Format::PythonSetup | Format::PythonInit => {
                Box::new(PyContent::parse(*self, source)?)
            }
            Format::Plain | Format::Ini | Format::Yaml => {
                Box::new(PlainContent::new(*self, source).with_defaults(defaults))
            }
        };
        Ok(content)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Format::ALL
            .into_iter()
            .find(|format| format.name() == s)
            .ok_or_else(|| Error::UnsupportedFormat {
                format: s.to_string(),
                operation: "parsing".to_string(),
            })
    }
}

/// Ordered glob patterns to formats
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    patterns: Vec<(String, Format)>,
}

/// Match `pattern` against the file name when it has no `/`, else the whole path
fn matches(pattern: &str, path: &Path) -> bool {
    if pattern.contains('/') {
        let path = path.to_string_lossy().replace('\\', "/");
        return glob_match(pattern, &path);
    }
    path.file_name()
        .map(|name| glob_match(pattern, &name.to_string_lossy()))
        .unwrap_or(false)
}

impl FormatRegistry {
    /// Create a registry without any pattern
    pub fn new() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Append a pattern; earlier patterns take precedence
    pub fn register(&mut self, pattern: impl Into<String>, format: Format) {
        self.patterns.push((pattern.into(), format));
    }

    /// Format of `path`, if some pattern matches it
    pub fn resolve_strict(&self, path: impl AsRef<Path>) -> Option<Format> {
        let path = path.as_ref();
        let found = self
            .patterns
            .iter()
            .find(|(pattern, _)| matches(pattern, path))
            .map(|(_, format)| *format);
        debug!(path = %path.display(), format = ?found, "resolve format");
        found
    }

    /// Format of `path`, plain text when no pattern matches
    pub fn resolve(&self, path: impl AsRef<Path>) -> Format {
        self.resolve_strict(path).unwrap_or(Format::Plain)
    }

    /// Registered patterns in precedence order
    pub fn list(&self) -> &[(String, Format)] {
        &self.patterns
    }

    pub fn from_config(config: &RecastConfig) -> Self {
        let mut registry = Self::new();
        for entry in &config.registry.patterns {
            registry.register(entry.pattern.clone(), entry.format);
        }
        registry
    }

    /// The patterns of the embedded default configuration
    pub fn with_defaults() -> Self {
        match crate::config::load_defaults() {
            Ok(config) => Self::from_config(&config),
            Err(err) => {
                error!(%err, "embedded defaults are invalid");
                Self::new()
            }
        }
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
