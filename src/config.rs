//! Configuration
//!
//! `defaults/recast.default.toml` is compiled in and always forms the bottom layer. On top
//! of it [`Loader`] stacks, in call order, a project's `recast.toml`, explicit files and
//! single-key overrides; later layers win key by key.

use crate::error::{Error, Result};
use crate::registry::Format;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

const DEFAULT_TOML: &str = include_str!("../defaults/recast.default.toml");

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RecastConfig {
    pub registry: RegistryConfig,
    pub substitution: SubstitutionConfig,
}

/// Ordered path patterns of the format registry
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    pub patterns: Vec<PatternConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PatternConfig {
    pub pattern: String,
    pub format: Format,
}

/// Whether literal substitution rewrites comments when the caller does not say
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SubstitutionConfig {
    pub ini_comments: bool,
    pub yaml_comments: bool,
}

impl Default for SubstitutionConfig {
    fn default() -> Self {
        Self {
            ini_comments: false,
            yaml_comments: true,
        }
    }
}

/// File name looked up in a project directory by [`Loader::with_project_dir`]
pub const PROJECT_FILE: &str = "recast.toml";

/// Layers project files and overrides over the embedded defaults
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    fn layer(mut self, path: &Path, required: bool) -> Self {
        debug!(path = %path.display(), required, "config layer");
        let source = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer a TOML file that must exist
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), true)
    }

    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), false)
    }

    /// Layer `recast.toml` of a project root, when there is one
    pub fn with_project_dir(self, dir: impl AsRef<Path>) -> Self {
        self.layer(&dir.as_ref().join(PROJECT_FILE), false)
    }

    /// Override a single key, e.g. `substitution.ini_comments`
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Deserialize the layered sources; every registry pattern must be a non-empty glob
    pub fn build(self) -> Result<RecastConfig> {
        let config: RecastConfig = self.builder.build()?.try_deserialize()?;
        if let Some(index) = config
            .registry
            .patterns
            .iter()
            .position(|entry| entry.pattern.trim().is_empty())
        {
            return Err(Error::Config(format!(
                "registry pattern #{} is empty",
                index + 1
            )));
        }
        Ok(config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_defaults() -> Result<RecastConfig> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.substitution, SubstitutionConfig::default());
        assert_eq!(
            config.registry.patterns.first(),
            Some(&PatternConfig {
                pattern: "setup.py".to_string(),
                format: Format::PythonSetup,
            })
        );
        assert_eq!(config.registry.patterns.len(), 9);
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("substitution.ini_comments", true)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert!(config.substitution.ini_comments);
        assert!(config.substitution.yaml_comments);
    }

    #[test]
    fn missing_required_file_fails() {
        let result = Loader::new()
            .with_file("/nonexistent/recast.toml")
            .build();
        assert!(result.is_err());
    }

    fn project_dir(name: &str, toml: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("recast-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(PROJECT_FILE), toml).unwrap();
        dir
    }

    #[test]
    fn empty_pattern_is_rejected() {
        let dir = project_dir(
            "empty-pattern",
            "[registry]\npatterns = [{ pattern = \" \", format = \"ini\" }]\n",
        );
        let result = Loader::new().with_project_dir(&dir).build();
        std::fs::remove_dir_all(&dir).unwrap();
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("#1")));
    }

    #[test]
    fn project_file_is_layered() {
        let dir = project_dir("layered", "[substitution]\nyaml_comments = false\n");
        let config = Loader::new().with_project_dir(&dir).build().unwrap();
        std::fs::remove_dir_all(&dir).unwrap();
        assert!(!config.substitution.yaml_comments);
        assert!(!config.substitution.ini_comments);
        assert_eq!(config.registry.patterns.len(), 9);
    }

    #[test]
    fn optional_file_may_be_absent() {
        assert!(Loader::new()
            .with_optional_file("/nonexistent/recast.toml")
            .build()
            .is_ok());
    }
}
