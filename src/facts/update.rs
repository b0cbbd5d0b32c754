//! Merging a replacement tree into a parsed tree
//!
//! `update` walks the current tree and a partial replacement of the same schema in
//! lockstep. It runs in two passes over the whole tree:
//!
//! 1. `check`: schemas, sequence lengths and every patch target are verified;
//! 2. `apply`: each node with a patch rule rewrites its line, then the replacement's
//!    present leaves overwrite the current ones.
//!
//! A failing check leaves both the tree and the lines untouched.

use super::node::{FieldKind, InfoNode, Slot};
use crate::error::{Error, Result};
use tracing::debug;

impl InfoNode {
    /// Patch `lines` and merge `replacement` into this node
    pub fn update(&mut self, replacement: &InfoNode, lines: &mut [String]) -> Result<()> {
        self.check(replacement, lines)?;
        self.apply(replacement, lines);
        Ok(())
    }

    /// Merge `replacement` into this node without any backing source text
    pub fn merge(&mut self, replacement: &InfoNode) -> Result<()> {
        self.check_shape(replacement)?;
        self.apply(replacement, &mut []);
        Ok(())
    }

    /// Validate that `replacement` can be applied onto this node and `lines`
    pub fn check(&self, replacement: &InfoNode, lines: &[String]) -> Result<()> {
        self.check_shape(replacement)?;
        self.check_targets(replacement, lines)
    }

    fn check_shape(&self, replacement: &InfoNode) -> Result<()> {
        if !self.schema().is(replacement.schema()) {
            return Err(Error::SchemaMismatch {
                expected: self.schema().name.to_string(),
                found: replacement.schema().name.to_string(),
            });
        }
        for ((def, current), (_, other)) in self.slots().zip(replacement.slots()) {
            match (current, other) {
                (Slot::Node(Some(current)), Slot::Node(Some(other))) => {
                    current.check_shape(other)?
                }
                (Slot::Sequence(Some(current)), Slot::Sequence(Some(other))) => {
                    if current.len() != other.len() {
                        return Err(Error::SequenceLengthMismatch {
                            field: format!("{}.{}", self.schema().name, def.name),
                            expected: current.len(),
                            found: other.len(),
                        });
                    }
                    for (current, other) in current.iter().zip(other) {
                        current.check_shape(other)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn check_targets(&self, replacement: &InfoNode, lines: &[String]) -> Result<()> {
        self.schema().patch.check(self, replacement, lines)?;
        for ((_, current), (_, other)) in self.slots().zip(replacement.slots()) {
            match (current, other) {
                (Slot::Node(Some(current)), Slot::Node(Some(other))) => {
                    current.check_targets(other, lines)?
                }
                (Slot::Sequence(Some(current)), Slot::Sequence(Some(other))) => {
                    for (current, other) in current.iter().zip(other) {
                        current.check_targets(other, lines)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Patch then merge; assumes a successful [`InfoNode::check`]
    pub(crate) fn apply(&mut self, replacement: &InfoNode, lines: &mut [String]) {
        let rule = self.schema().patch;
        rule.apply(self, replacement, lines);

        for (index, (def, other)) in replacement.slots().enumerate() {
            match (self.slot_mut(index), other) {
                (Slot::Leaf(current), Slot::Leaf(Some(value))) => {
                    let positional = matches!(def.kind, FieldKind::Scalar(spec) if spec.positional);
                    if !positional || current.is_none() {
                        *current = Some(rule.stored(def.name, value));
                    }
                }
                (Slot::Node(Some(current)), Slot::Node(Some(other))) => {
                    current.apply(other, lines);
                }
                (Slot::Node(current @ None), Slot::Node(Some(other))) => {
                    debug!(field = def.name, "no parsed fact, taking the replacement as is");
                    *current = Some(other.clone());
                }
                (Slot::Sequence(Some(current)), Slot::Sequence(Some(other))) => {
                    // right to left, so that several elements sharing a line keep their columns
                    for (current, other) in current.iter_mut().zip(other).rev() {
                        current.apply(other, lines);
                    }
                }
                (Slot::Sequence(current @ None), Slot::Sequence(Some(other))) => {
                    debug!(field = def.name, "no parsed sequence, taking the replacement as is");
                    *current = Some(other.clone());
                }
                _ => {}
            }
        }
    }
}
