#![deny(missing_docs)]

//! # Schema Nodes
//!
//! A closed representation of the JSON-Schema subset the generator understands.
//!
//! Raw schema objects are classified once, at load time, into a `SchemaKind`.
//! Every later stage matches exhaustively on that kind instead of probing
//! untyped JSON.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// The primitive `type` keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// `type: string`
    String,
    /// `type: number`
    Number,
    /// `type: integer`
    Integer,
    /// `type: boolean`
    Boolean,
}

/// The shape of a schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// A `$ref` pointer. Takes priority over any sibling shape keywords.
    Ref(String),
    /// `type: object`.
    Object {
        /// Declared properties, in document order. `None` when the keyword is absent.
        properties: Option<IndexMap<String, SchemaNode>>,
        /// Names listed under `required`.
        required: Vec<String>,
        /// The boolean form of `additionalProperties`, if given.
        additional_properties: Option<bool>,
    },
    /// `type: array`.
    Array {
        /// The `items` schema, if present.
        items: Option<Box<SchemaNode>>,
    },
    /// A primitive type.
    Primitive(Primitive),
    /// Several non-null `type` members, e.g. `type: [string, number]`.
    Union(Vec<SchemaNode>),
    /// Absent (`None`) or unrecognised (`Some(name)`) `type`.
    Unknown(Option<String>),
}

/// A single schema node.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    /// The classified shape.
    pub kind: SchemaKind,
    /// Whether `null` is accepted in addition to the shape.
    pub nullable: bool,
    /// Free-form documentation.
    pub description: Option<String>,
}

impl SchemaNode {
    /// Creates a non-nullable node of the given kind.
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            nullable: false,
            description: None,
        }
    }

    /// A node carrying no type information at all.
    pub fn unknown() -> Self {
        Self::new(SchemaKind::Unknown(None))
    }

    /// Returns the `$ref` pointer if this node is a reference.
    pub fn ref_pointer(&self) -> Option<&str> {
        match &self.kind {
            SchemaKind::Ref(pointer) => Some(pointer),
            _ => None,
        }
    }

    /// Classifies a raw JSON schema value.
    ///
    /// Nullability comes from a `type` array containing `"null"` or from the
    /// OpenAPI 3.0 `nullable: true` keyword. Non-object values (e.g. boolean
    /// schemas) classify as `Unknown`.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::unknown();
        };

        let description = map
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string);
        let mut nullable = map
            .get("nullable")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let type_names: Vec<&str> = match map.get("type") {
            Some(Value::String(name)) => vec![name.as_str()],
            Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        };
        if type_names.contains(&"null") {
            nullable = true;
        }
        let members: Vec<&str> = type_names.into_iter().filter(|t| *t != "null").collect();

        let kind = if let Some(pointer) = map.get("$ref").and_then(Value::as_str) {
            SchemaKind::Ref(pointer.to_string())
        } else {
            match members.as_slice() {
                [] => SchemaKind::Unknown(None),
                [single] => kind_for_type(single, map),
                many => SchemaKind::Union(
                    many.iter()
                        .map(|name| SchemaNode::new(kind_for_type(name, map)))
                        .collect(),
                ),
            }
        };

        Self {
            kind,
            nullable,
            description,
        }
    }
}

impl<'de> Deserialize<'de> for SchemaNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(SchemaNode::from_value(&raw))
    }
}

fn kind_for_type(name: &str, map: &Map<String, Value>) -> SchemaKind {
    match name {
        "string" => SchemaKind::Primitive(Primitive::String),
        "number" => SchemaKind::Primitive(Primitive::Number),
        "integer" => SchemaKind::Primitive(Primitive::Integer),
        "boolean" => SchemaKind::Primitive(Primitive::Boolean),
        "object" => SchemaKind::Object {
            properties: map.get("properties").and_then(Value::as_object).map(|props| {
                props
                    .iter()
                    .map(|(key, node)| (key.clone(), SchemaNode::from_value(node)))
                    .collect()
            }),
            required: map
                .get("required")
                .and_then(Value::as_array)
                .map(|names| {
                    names
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            additional_properties: map.get("additionalProperties").and_then(Value::as_bool),
        },
        "array" => SchemaKind::Array {
            items: map
                .get("items")
                .map(|items| Box::new(SchemaNode::from_value(items))),
        },
        other => SchemaKind::Unknown(Some(other.to_string())),
    }
}
