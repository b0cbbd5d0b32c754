//! JSON form of fact trees
//!
//! A node is an object keyed by field name; absent fields are omitted, nested nodes are
//! objects and sequences are arrays. Reading a tree back goes through the same setters
//! as code does, so every leaf is validated.

use super::field::Value;
use super::node::{FieldKind, InfoNode, NodeSchema, Slot};
use crate::error::{Error, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value as Json;

impl Serialize for InfoNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let present: Vec<_> = self.slots().filter(|(_, slot)| slot.is_present()).collect();
        let mut map = serializer.serialize_map(Some(present.len()))?;
        for (def, slot) in present {
            match slot {
                Slot::Leaf(Some(value)) => map.serialize_entry(def.name, value)?,
                Slot::Node(Some(node)) => map.serialize_entry(def.name, node)?,
                Slot::Sequence(Some(items)) => map.serialize_entry(def.name, items)?,
                _ => {}
            }
        }
        map.end()
    }
}

impl InfoNode {
    pub fn to_json(&self) -> Json {
        serde_json::to_value(self).unwrap_or(Json::Null)
    }

    /// Build a (partial) tree of `schema` from its JSON form
    pub fn from_json(schema: &'static NodeSchema, json: &Json) -> Result<InfoNode> {
        let Json::Object(object) = json else {
            return Err(Error::Json(format!(
                "{} must be a JSON object, got {}",
                schema.name, json
            )));
        };
        let mut node = InfoNode::new(schema);
        for (name, json) in object {
            let Some((_, def)) = schema.field(name) else {
                return Err(Error::UnknownField {
                    node: schema.name.to_string(),
                    field: name.clone(),
                });
            };
            if json.is_null() {
                continue;
            }
            match def.kind {
                FieldKind::Scalar(_) => {
                    node.set(name, scalar(schema, name, json)?)?;
                }
                FieldKind::Node(child) => {
                    node.set_node(name, InfoNode::from_json(child, json)?)?;
                }
                FieldKind::Sequence(child) => {
                    let Json::Array(items) = json else {
                        return Err(Error::Json(format!(
                            "{}.{} must be a JSON array",
                            schema.name, name
                        )));
                    };
                    let items = items
                        .iter()
                        .map(|item| InfoNode::from_json(child, item))
                        .collect::<Result<Vec<_>>>()?;
                    node.set_sequence(name, items)?;
                }
            }
        }
        Ok(node)
    }

    pub fn from_json_str(schema: &'static NodeSchema, text: &str) -> Result<InfoNode> {
        let json: Json = serde_json::from_str(text)?;
        InfoNode::from_json(schema, &json)
    }

    /// Same as [`InfoNode::from_json_str`] for a YAML document
    pub fn from_yaml_str(schema: &'static NodeSchema, text: &str) -> Result<InfoNode> {
        let json: Json = serde_yaml::from_str(text)?;
        InfoNode::from_json(schema, &json)
    }
}

fn scalar(schema: &NodeSchema, name: &str, json: &Json) -> Result<Value> {
    match json {
        Json::String(s) => Ok(Value::Str(s.clone())),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => n.as_i64().map(Value::Int).ok_or_else(|| {
            Error::Json(format!("{}.{} cannot hold the number {}", schema.name, name, n))
        }),
        other => Err(Error::Json(format!(
            "{}.{} cannot hold {}",
            schema.name, name, other
        ))),
    }
}
