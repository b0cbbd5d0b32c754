//! YAML substitution
//!
//! YAML files carry no fact tree. A literal substitution only rewrites value scalars
//! (scalars introduced by `:`, `-`, `,` or `[` that are not themselves mapping keys) and,
//! when requested, comment text. Keys, anchors, tags and indicators are never touched.

pub mod scanner;
mod substitute;

pub use scanner::{scan, ScalarStyle, TokenKind, YamlToken};
pub use substitute::{comment_start, substitute, value_spans};
