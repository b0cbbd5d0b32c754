//! Fact nodes
//!
//! An [`InfoNode`] is an instance of a static [`NodeSchema`]. The schema fixes the ordered
//! set of field names and their kinds at definition time; every instance holds exactly one
//! [`Slot`] per declared field, in declaration order. A slot that was never assigned holds
//! the "absent" sentinel, which is what lets a caller build a partial replacement tree.

use super::field::{FieldSpec, Value};
use super::patch::PatchRule;
use crate::error::{Error, Result};
use std::fmt;

/// Static description of a fact node type
#[derive(Debug)]
pub struct NodeSchema {
    pub name: &'static str,
    pub fields: &'static [FieldDef],
    /// How a node of this type rewrites its source line when its leaves change
    pub patch: PatchRule,
}

impl NodeSchema {
    pub fn field(&self, name: &str) -> Option<(usize, &'static FieldDef)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, field)| field.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.name)
    }

    /// Schemas are compared by identity: two node types are the same type only if
    /// they are the same static.
    pub fn is(&self, other: &NodeSchema) -> bool {
        std::ptr::eq(self, other)
    }
}

impl fmt::Display for NodeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A declared field of a node schema
#[derive(Debug)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

#[derive(Debug)]
pub enum FieldKind {
    Scalar(&'static FieldSpec),
    Node(&'static NodeSchema),
    Sequence(&'static NodeSchema),
}

/// Storage of one field. `None` is the "absent" sentinel.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Leaf(Option<Value>),
    Node(Option<Box<InfoNode>>),
    Sequence(Option<Vec<InfoNode>>),
}

impl Slot {
    fn absent(kind: &FieldKind) -> Self {
        match kind {
            FieldKind::Scalar(_) => Slot::Leaf(None),
            FieldKind::Node(_) => Slot::Node(None),
            FieldKind::Sequence(_) => Slot::Sequence(None),
        }
    }

    pub fn is_present(&self) -> bool {
        match self {
            Slot::Leaf(value) => value.is_some(),
            Slot::Node(node) => node.is_some(),
            Slot::Sequence(items) => items.is_some(),
        }
    }
}

/// A structured fact extracted from (or destined for) a source file
#[derive(Clone)]
pub struct InfoNode {
    schema: &'static NodeSchema,
    slots: Vec<Slot>,
}

impl InfoNode {
    /// Create a node with every field absent
    pub fn new(schema: &'static NodeSchema) -> Self {
        let slots = schema
            .fields
            .iter()
            .map(|field| Slot::absent(&field.kind))
            .collect();
        Self { schema, slots }
    }

    pub fn schema(&self) -> &'static NodeSchema {
        self.schema
    }

    pub fn slots(&self) -> impl Iterator<Item = (&'static FieldDef, &Slot)> + '_ {
        self.schema.fields.iter().zip(self.slots.iter())
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut Slot {
        &mut self.slots[index]
    }

    fn path(&self, field: &str) -> String {
        format!("{}.{}", self.schema.name, field)
    }

    fn lookup(&self, name: &str) -> Result<(usize, &'static FieldDef)> {
        self.schema.field(name).ok_or_else(|| Error::UnknownField {
            node: self.schema.name.to_string(),
            field: name.to_string(),
        })
    }

    fn wrong_kind(&self, name: &str) -> Error {
        Error::UnknownField {
            node: self.schema.name.to_string(),
            field: name.to_string(),
        }
    }

    /// Assign a scalar field, running its validator chain first
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self> {
        let (index, def) = self.lookup(name)?;
        let FieldKind::Scalar(spec) = def.kind else {
            return Err(self.wrong_kind(name));
        };
        let value = value.into();
        spec.validate(&self.path(name), &value)?;
        self.slots[index] = Slot::Leaf(Some(value));
        Ok(self)
    }

    /// Builder flavour of [`InfoNode::set`]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Assign a nested node; its schema must be the one the field declares
    pub fn set_node(&mut self, name: &str, node: InfoNode) -> Result<&mut Self> {
        let (index, def) = self.lookup(name)?;
        let FieldKind::Node(schema) = def.kind else {
            return Err(self.wrong_kind(name));
        };
        if !node.schema.is(schema) {
            return Err(Error::SchemaMismatch {
                expected: schema.name.to_string(),
                found: node.schema.name.to_string(),
            });
        }
        self.slots[index] = Slot::Node(Some(Box::new(node)));
        Ok(self)
    }

    pub fn with_node(mut self, name: &str, node: InfoNode) -> Result<Self> {
        self.set_node(name, node)?;
        Ok(self)
    }

    /// Assign an ordered sequence of nodes of the declared item schema
    pub fn set_sequence(&mut self, name: &str, items: Vec<InfoNode>) -> Result<&mut Self> {
        let (index, def) = self.lookup(name)?;
        let FieldKind::Sequence(schema) = def.kind else {
            return Err(self.wrong_kind(name));
        };
        if let Some(bad) = items.iter().find(|item| !item.schema.is(schema)) {
            return Err(Error::SchemaMismatch {
                expected: schema.name.to_string(),
                found: bad.schema.name.to_string(),
            });
        }
        self.slots[index] = Slot::Sequence(Some(items));
        Ok(self)
    }

    pub fn with_sequence(mut self, name: &str, items: Vec<InfoNode>) -> Result<Self> {
        self.set_sequence(name, items)?;
        Ok(self)
    }

    /// Reset a field to the absent sentinel
    pub fn clear(&mut self, name: &str) -> Result<&mut Self> {
        let (index, def) = self.lookup(name)?;
        self.slots[index] = Slot::absent(&def.kind);
        Ok(self)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.schema
            .field(name)
            .is_some_and(|(index, _)| self.slots[index].is_present())
    }

    /// Read a scalar field, falling back to its declared default
    pub fn get(&self, name: &str) -> Option<Value> {
        let (index, def) = self.schema.field(name)?;
        match (&self.slots[index], &def.kind) {
            (Slot::Leaf(Some(value)), _) => Some(value.clone()),
            (Slot::Leaf(None), FieldKind::Scalar(spec)) => spec.default.to_value(),
            _ => None,
        }
    }

    /// Read a scalar field exactly as assigned (no default)
    pub fn value(&self, name: &str) -> Option<&Value> {
        let (index, _) = self.schema.field(name)?;
        match &self.slots[index] {
            Slot::Leaf(value) => value.as_ref(),
            _ => None,
        }
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.value(name).and_then(Value::as_str)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(|v| v.as_int())
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(|v| v.as_bool())
    }

    /// Zero-based line the fact was read from, relative to its owning content
    pub fn lineno(&self) -> Option<usize> {
        self.int("lineno").and_then(|i| usize::try_from(i).ok())
    }

    pub fn node(&self, name: &str) -> Option<&InfoNode> {
        let (index, _) = self.schema.field(name)?;
        match &self.slots[index] {
            Slot::Node(node) => node.as_deref(),
            _ => None,
        }
    }

    pub fn node_mut(&mut self, name: &str) -> Option<&mut InfoNode> {
        let (index, _) = self.schema.field(name)?;
        match &mut self.slots[index] {
            Slot::Node(node) => node.as_deref_mut(),
            _ => None,
        }
    }

    pub fn sequence(&self, name: &str) -> Option<&[InfoNode]> {
        let (index, _) = self.schema.field(name)?;
        match &self.slots[index] {
            Slot::Sequence(items) => items.as_deref(),
            _ => None,
        }
    }

    /// Take a nested node out of this one, leaving the field absent
    pub fn take_node(&mut self, name: &str) -> Option<InfoNode> {
        let (index, _) = self.schema.field(name)?;
        match &mut self.slots[index] {
            Slot::Node(node) => node.take().map(|boxed| *boxed),
            _ => None,
        }
    }
}

impl PartialEq for InfoNode {
    fn eq(&self, other: &Self) -> bool {
        self.schema.is(other.schema) && self.slots == other.slots
    }
}

impl fmt::Debug for InfoNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.schema.name);
        for (def, slot) in self.slots() {
            match slot {
                Slot::Leaf(Some(value)) => out.field(def.name, value),
                Slot::Node(Some(node)) => out.field(def.name, node),
                Slot::Sequence(Some(items)) => out.field(def.name, items),
                _ => continue,
            };
        }
        out.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::schema::{
        KWARG, PY_DOCSTRING, PY_INFO, RST_TITLE, SETUP_KWARGS, SINGLE_LINE_TEXT, TEXT,
    };

    #[test]
    fn test_text_info_modifications() {
        let mut text = InfoNode::new(&TEXT);
        assert!(text.set("text", "test").is_ok());
        assert_eq!(text.str("text"), Some("test"));
        assert!(text.set("text", "").is_ok());
        assert!(text.set("text", 4).is_err());
        assert!(text.set("lineno", 234).is_ok());
        assert_eq!(text.lineno(), Some(234));
        assert!(text.set("lineno", "4").is_err());
        // the failed assignment left the previous value in place
        assert_eq!(text.lineno(), Some(234));
    }

    #[test]
    fn test_rst_title_modifications() {
        let mut title = InfoNode::new(&RST_TITLE);
        assert!(title.set("has_overline", true).is_ok());
        assert!(title.set("text", "").is_err());
        assert!(title.set("text", "multi\nline\ntitle").is_err());
        assert!(title.set("symbol", "_").is_ok());
        assert!(title.set("symbol", "").is_err());
        assert!(title.set("symbol", "4").is_err());
        assert!(title.set("symbol", "==").is_err());
        assert_eq!(title.str("symbol"), Some("_"));
    }

    #[test]
    fn test_defaults_are_read_but_not_stored() {
        let title = InfoNode::new(&RST_TITLE);
        assert_eq!(title.get("symbol"), Some(Value::from("=")));
        assert_eq!(title.flag("has_overline"), Some(false));
        assert!(!title.is_set("symbol"));
        assert_eq!(title.value("symbol"), None);
    }

    #[test]
    fn test_unknown_field() {
        let mut text = InfoNode::new(&TEXT);
        match text.set("colour", "red") {
            Err(Error::UnknownField { node, field }) => {
                assert_eq!(node, "TextInfo");
                assert_eq!(field, "colour");
            }
            other => panic!("expected UnknownField, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_node_schema_is_checked() {
        let mut docstring = InfoNode::new(&PY_DOCSTRING);
        let copyright = InfoNode::new(&SINGLE_LINE_TEXT)
            .with("text", "Copyright 2017")
            .unwrap();
        assert!(docstring.set_node("copyright", copyright).is_ok());
        assert!(matches!(
            docstring.set_node("title", InfoNode::new(&TEXT)),
            Err(Error::SchemaMismatch { .. })
        ));
        assert_eq!(
            docstring.node("copyright").and_then(|n| n.str("text")),
            Some("Copyright 2017")
        );
    }

    #[test]
    fn test_sequence_items_schema_is_checked() {
        let mut setup = InfoNode::new(&SETUP_KWARGS);
        let item = InfoNode::new(&KWARG).with("value", "pkg").unwrap();
        assert!(setup.set_sequence("packages", vec![item]).is_ok());
        assert_eq!(setup.sequence("packages").map(|items| items.len()), Some(1));
        assert!(setup
            .set_sequence("packages", vec![InfoNode::new(&TEXT)])
            .is_err());
        // a sequence field is not a node field
        assert!(setup.set_node("packages", InfoNode::new(&KWARG)).is_err());
    }

    #[test]
    fn test_take_and_clear() {
        let mut info = InfoNode::new(&PY_INFO)
            .with_node("docstring", InfoNode::new(&PY_DOCSTRING))
            .unwrap();
        assert!(info.is_set("docstring"));
        let docstring = info.take_node("docstring");
        assert!(docstring.is_some());
        assert!(!info.is_set("docstring"));

        info.set("docstring_lineno", 3).unwrap();
        info.clear("docstring_lineno").unwrap();
        assert_eq!(info.int("docstring_lineno"), Some(0));
    }
}
