//! Typed fact trees
//!
//! Parsers turn a source file into an [`InfoNode`] tree whose leaves remember the line
//! (and for quoted values the column) they were read from. Callers build a partial
//! replacement tree of the same schema and hand it to [`InfoNode::update`], which
//! rewrites only the lines of the facts that changed.
//!
//! - [`field`]: scalar values and validator chains
//! - [`node`]: [`InfoNode`], [`NodeSchema`] and slots
//! - [`schema`]: the built-in node schemas
//! - [`patch`]: per-schema rules that rewrite a fact's source span
//! - `update`: check-then-apply merge of a replacement tree
//! - `json`: JSON/YAML exchange form

pub mod field;
mod json;
pub mod node;
pub mod patch;
pub mod schema;
mod update;

pub use field::{FieldSpec, Validator, Value};
pub use node::{FieldDef, FieldKind, InfoNode, NodeSchema, Slot};
pub use patch::PatchRule;
