//! Python sources
//!
//! Modules are parsed with tree-sitter. The parse is strict: a module the grammar
//! reports an error for is rejected with [`crate::error::Error::Parse`] rather than
//! rewritten on a best effort basis.
//!
//! - [`PyContent`]: docstring and code sub-contents of a module
//! - [`ImportRename`]/[`rename`]: package renames in import statements and usages
//! - `setup`/`init`: the facts of `setup.py` and `__init__.py` files

mod content;
mod docstring;
mod imports;
mod init;
mod setup;
pub(crate) mod syntax;

pub use content::PyContent;
pub use imports::{rename, ImportRename};
