//! # recast
//!
//! Format-preserving rewriting of project files.
//!
//! Files are parsed into a content that keeps every source line as is, plus (for
//! structured formats) a fact tree describing the values worth rewriting: the title of
//! an RST document, the docstring of a Python module, the keyword arguments of a
//! `setup()` call, the `__version__` of a package. A rewrite is a [`Transform`]: a
//! partial replacement fact tree, an import rename and a literal substitution, applied
//! in that order. Only the lines a fact was read from change; everything else comes
//! back byte for byte.
//!
//! ```ignore
//! use recast::{FormatRegistry, Script, Substitution, Transform};
//!
//! let registry = FormatRegistry::default();
//! let mut script = Script::for_path(&registry, "tox.ini", "[testenv]\ncommands = old_pkg\n");
//! let text = script.publish(&Transform::new().with_substitution(Substitution::new("old_pkg", "pkg")))?;
//! ```
//!
//! Modules:
//!
//! - [`facts`]: field specs, node schemas and the fact tree with its update algorithm
//! - [`content`]: source-mapped contents and transforms
//! - [`rst`], [`python`], [`ini`], [`yaml`]: format readers
//! - [`registry`]: formats and path patterns
//! - [`script`]: lazily parsed files and the publish pipeline
//! - [`config`]: layered configuration
//! - [`naming`]: project, package and URL spellings

pub mod config;
pub mod content;
pub mod error;
pub mod facts;
pub mod ini;
pub mod naming;
pub mod python;
pub mod registry;
pub mod rst;
pub mod script;
pub mod yaml;

pub use content::{Content, Substitution, Transform};
pub use error::{Error, Result};
pub use facts::InfoNode;
pub use python::ImportRename;
pub use registry::{Format, FormatRegistry};
pub use script::Script;
