//! One file of a project: source text plus its lazily parsed content

use crate::config::SubstitutionConfig;
use crate::content::{Content, Transform};
use crate::error::Result;
use crate::facts::InfoNode;
use crate::registry::{Format, FormatRegistry};
use std::path::Path;
use tracing::debug;

/// Source text of one file and the content parsed from it on first use.
///
/// `publish` never touches storage: the caller decides where the text goes.
#[derive(Debug)]
pub struct Script {
    format: Format,
    source: String,
    defaults: SubstitutionConfig,
    content: Option<Box<dyn Content>>,
}

impl Script {
    pub fn new(format: Format, source: impl Into<String>) -> Self {
        Self {
            format,
            source: source.into(),
            defaults: SubstitutionConfig::default(),
            content: None,
        }
    }

    /// A script whose format is resolved from `path` through `registry`
    pub fn for_path(
        registry: &FormatRegistry,
        path: impl AsRef<Path>,
        source: impl Into<String>,
    ) -> Self {
        Self::new(registry.resolve(path), source)
    }

    pub fn with_defaults(mut self, defaults: SubstitutionConfig) -> Self {
        self.defaults = defaults;
        self.content = None;
        self
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// The text the script was created or last reset with
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Replace the source; the next call parses it again from scratch
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
        self.content = None;
    }

    /// The parsed content, parsing the source on first use
    pub fn content(&mut self) -> Result<&mut dyn Content> {
        let content = match self.content.take() {
            Some(content) => content,
            None => {
                debug!(format = %self.format, "parse script");
                self.format.parse(&self.source, self.defaults)?
            }
        };
        Ok(self.content.insert(content).as_mut())
    }

    /// Current fact tree, `None` for formats without facts
    pub fn info(&mut self) -> Result<Option<InfoNode>> {
        Ok(self.content()?.info())
    }

    /// Apply `transform` and return the rebuilt text
    pub fn publish(&mut self, transform: &Transform) -> Result<String> {
        let content = self.content()?;
        if !transform.is_empty() {
            content.transform(transform)?;
        }
        Ok(content.output())
    }
}
