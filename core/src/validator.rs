#![deny(missing_docs)]

//! # Validator IR
//!
//! The structured form of a compiled schema. Renderers turn it into source text
//! for a target language; `Validator::parse` executes it directly against JSON values.
//!
//! Execution semantics follow the rendered zod expressions:
//! - `Number` accepts any JSON number (integers included).
//! - `Any` and `Optional` accept an absent object key; `Nullable` accepts `null`.
//! - `Strip` objects drop undeclared keys, `Strict` objects reject them,
//!   `Passthrough` objects keep them.
//! - `Union` returns the first member that accepts the value.

use crate::error::{AppError, ValidationTarget};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// How an object validator treats keys it does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectMode {
    /// Unknown keys are accepted and removed from the parsed value.
    Strip,
    /// Unknown keys are rejected.
    Strict,
    /// Unknown keys are accepted and kept.
    Passthrough,
}

/// One declared object field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Property name as it appears in JSON.
    pub name: String,
    /// The field's validator (wrapped in `Optional` when not required).
    pub validator: Validator,
    /// Documentation carried into generated comments only.
    pub description: Option<String>,
}

/// A validator expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Validator {
    /// Any string.
    String,
    /// Any number.
    Number,
    /// `true` or `false`.
    Boolean,
    /// Anything, including absence.
    Any,
    /// An object with declared fields.
    Object {
        /// Declared fields, in document order.
        fields: Vec<Field>,
        /// Unknown-key policy.
        mode: ObjectMode,
    },
    /// A homogeneous array.
    Array(Box<Validator>),
    /// The first matching member wins.
    Union(Vec<Validator>),
    /// `null` or the inner validator.
    Nullable(Box<Validator>),
    /// Absent or the inner validator.
    Optional(Box<Validator>),
    /// A named schema. `deferred` marks a reference that must be evaluated lazily.
    Ref {
        /// The referenced component name.
        name: String,
        /// Whether the reference is declared before its target.
        deferred: bool,
    },
}

impl Validator {
    /// The open object used for nested `type: object` nodes.
    pub fn open_object() -> Self {
        Validator::Object {
            fields: Vec::new(),
            mode: ObjectMode::Passthrough,
        }
    }

    /// Wraps `self` so that `null` is also accepted.
    pub fn nullable(self) -> Self {
        Validator::Nullable(Box::new(self))
    }

    /// Wraps `self` so that absence is also accepted.
    pub fn optional(self) -> Self {
        Validator::Optional(Box::new(self))
    }

    /// Whether an object key validated by `self` may be missing.
    pub fn accepts_missing(&self, registry: &SchemaRegistry) -> bool {
        match self {
            Validator::Any | Validator::Optional(_) => true,
            Validator::Nullable(inner) => inner.accepts_missing(registry),
            Validator::Union(members) => members.iter().any(|m| m.accepts_missing(registry)),
            Validator::Ref { name, .. } => registry
                .get(name)
                .is_some_and(|target| !matches!(target, Validator::Ref { .. }) && target.accepts_missing(registry)),
            _ => false,
        }
    }

    /// Validates `value`, returning the parsed value.
    ///
    /// The parsed value differs from the input only where `Strip` objects drop keys.
    pub fn parse(&self, value: &Value, registry: &SchemaRegistry) -> Result<Value, ValidationIssue> {
        let mut path = Vec::new();
        self.parse_at(value, registry, &mut path)
    }

    fn parse_at(
        &self,
        value: &Value,
        registry: &SchemaRegistry,
        path: &mut Vec<String>,
    ) -> Result<Value, ValidationIssue> {
        match self {
            Validator::Any => Ok(value.clone()),
            Validator::String => expect(value.is_string(), "string", value, path),
            Validator::Number => expect(value.is_number(), "number", value, path),
            Validator::Boolean => expect(value.is_boolean(), "boolean", value, path),
            Validator::Nullable(inner) => {
                if value.is_null() {
                    Ok(Value::Null)
                } else {
                    inner.parse_at(value, registry, path)
                }
            }
            Validator::Optional(inner) => inner.parse_at(value, registry, path),
            Validator::Array(item) => {
                let Value::Array(items) = value else {
                    return Err(ValidationIssue::mismatch(path, "array", value));
                };
                let mut out = Vec::with_capacity(items.len());
                for (i, element) in items.iter().enumerate() {
                    path.push(i.to_string());
                    out.push(item.parse_at(element, registry, path)?);
                    path.pop();
                }
                Ok(Value::Array(out))
            }
            Validator::Union(members) => {
                for member in members {
                    let mut scratch = path.clone();
                    if let Ok(parsed) = member.parse_at(value, registry, &mut scratch) {
                        return Ok(parsed);
                    }
                }
                Err(ValidationIssue::new(path, "Invalid input"))
            }
            Validator::Object { fields, mode } => parse_object(fields, *mode, value, registry, path),
            Validator::Ref { name, .. } => match registry.get(name) {
                Some(target) => target.parse_at(value, registry, path),
                None => Err(ValidationIssue::new(
                    path,
                    format!("unknown schema reference `{}`", name),
                )),
            },
        }
    }
}

fn expect(
    ok: bool,
    expected: &str,
    value: &Value,
    path: &[String],
) -> Result<Value, ValidationIssue> {
    if ok {
        Ok(value.clone())
    } else {
        Err(ValidationIssue::mismatch(path, expected, value))
    }
}

fn parse_object(
    fields: &[Field],
    mode: ObjectMode,
    value: &Value,
    registry: &SchemaRegistry,
    path: &mut Vec<String>,
) -> Result<Value, ValidationIssue> {
    let Value::Object(map) = value else {
        return Err(ValidationIssue::mismatch(path, "object", value));
    };

    let mut out = Map::new();
    for field in fields {
        path.push(field.name.clone());
        match map.get(&field.name) {
            Some(v) => {
                let parsed = field.validator.parse_at(v, registry, path)?;
                out.insert(field.name.clone(), parsed);
            }
            None if field.validator.accepts_missing(registry) => {}
            None => return Err(ValidationIssue::new(path, "Required")),
        }
        path.pop();
    }

    let extra: Vec<&String> = map
        .keys()
        .filter(|key| !fields.iter().any(|f| &f.name == *key))
        .collect();
    match mode {
        ObjectMode::Strip => {}
        ObjectMode::Strict => {
            if !extra.is_empty() {
                let keys: Vec<String> = extra.iter().map(|k| format!("'{}'", k)).collect();
                return Err(ValidationIssue::new(
                    path,
                    format!("Unrecognized key(s) in object: {}", keys.join(", ")),
                ));
            }
        }
        ObjectMode::Passthrough => {
            for key in extra {
                out.insert(key.clone(), map[key].clone());
            }
        }
    }
    Ok(Value::Object(out))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Why a value was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Keys and indexes leading to the rejected value.
    pub path: Vec<String>,
    /// Human readable reason.
    pub message: String,
}

impl ValidationIssue {
    fn new(path: &[String], message: impl Into<String>) -> Self {
        Self {
            path: path.to_vec(),
            message: message.into(),
        }
    }

    fn mismatch(path: &[String], expected: &str, value: &Value) -> Self {
        Self::new(
            path,
            format!("expected {}, received {}", expected, json_type_name(value)),
        )
    }

    /// The dotted path, or `$` for the root value.
    pub fn path_string(&self) -> String {
        if self.path.is_empty() {
            "$".to_string()
        } else {
            self.path.join(".")
        }
    }

    /// Converts into the crate error for the given target.
    pub fn into_error(self, target: ValidationTarget) -> AppError {
        AppError::Validation {
            target,
            path: self.path_string(),
            message: self.message,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path_string(), self.message)
    }
}

/// Named validators that `Ref` nodes resolve against.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Validator>,
}

impl SchemaRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a named validator.
    pub fn insert(&mut self, name: impl Into<String>, validator: Validator) {
        self.schemas.insert(name.into(), validator);
    }

    /// Looks up a named validator.
    pub fn get(&self, name: &str) -> Option<&Validator> {
        self.schemas.get(name)
    }

    /// Number of registered validators.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(name: &str, validator: Validator) -> Field {
        Field {
            name: name.into(),
            validator,
            description: None,
        }
    }

    fn user(mode: ObjectMode) -> Validator {
        Validator::Object {
            fields: vec![
                field("id", Validator::String),
                field("age", Validator::Number.optional()),
            ],
            mode,
        }
    }

    #[test]
    fn test_primitives() {
        let reg = SchemaRegistry::new();
        assert!(Validator::String.parse(&json!("a"), &reg).is_ok());
        assert!(Validator::String.parse(&json!(1), &reg).is_err());
        assert!(Validator::Number.parse(&json!(1), &reg).is_ok());
        assert!(Validator::Number.parse(&json!(1.5), &reg).is_ok());
        assert!(Validator::Boolean.parse(&json!(false), &reg).is_ok());
        assert!(Validator::Any.parse(&json!({"x": [1]}), &reg).is_ok());
    }

    #[test]
    fn test_nullable_string() {
        let reg = SchemaRegistry::new();
        let v = Validator::String.nullable();
        assert_eq!(v.parse(&json!("x"), &reg).unwrap(), json!("x"));
        assert_eq!(v.parse(&json!(null), &reg).unwrap(), json!(null));
        let err = v.parse(&json!(3), &reg).unwrap_err();
        assert_eq!(err.message, "expected string, received number");
    }

    #[test]
    fn test_required_and_optional_fields() {
        let reg = SchemaRegistry::new();
        let v = user(ObjectMode::Strip);
        assert!(v.parse(&json!({"id": "1"}), &reg).is_ok());
        let err = v.parse(&json!({"age": 3}), &reg).unwrap_err();
        assert_eq!(err.to_string(), "id: Required");
    }

    #[test]
    fn test_optional_does_not_accept_null() {
        let reg = SchemaRegistry::new();
        let v = user(ObjectMode::Strip);
        let err = v.parse(&json!({"id": "1", "age": null}), &reg).unwrap_err();
        assert_eq!(err.path, vec!["age".to_string()]);
    }

    #[test]
    fn test_object_modes() {
        let reg = SchemaRegistry::new();
        let input = json!({"id": "1", "extra": true});

        let stripped = user(ObjectMode::Strip).parse(&input, &reg).unwrap();
        assert_eq!(stripped, json!({"id": "1"}));

        let kept = user(ObjectMode::Passthrough).parse(&input, &reg).unwrap();
        assert_eq!(kept, input);

        let err = user(ObjectMode::Strict).parse(&input, &reg).unwrap_err();
        assert!(err.message.contains("'extra'"));
        assert!(user(ObjectMode::Strict).parse(&json!({"id": "1"}), &reg).is_ok());
    }

    #[test]
    fn test_array_paths() {
        let reg = SchemaRegistry::new();
        let v = Validator::Array(Box::new(user(ObjectMode::Strip)));
        let err = v
            .parse(&json!([{"id": "a"}, {"id": 2}]), &reg)
            .unwrap_err();
        assert_eq!(err.path_string(), "1.id");
    }

    #[test]
    fn test_union_first_match() {
        let reg = SchemaRegistry::new();
        let v = Validator::Union(vec![Validator::String, Validator::Number]);
        assert!(v.parse(&json!("a"), &reg).is_ok());
        assert!(v.parse(&json!(2), &reg).is_ok());
        assert_eq!(v.parse(&json!(true), &reg).unwrap_err().message, "Invalid input");
    }

    #[test]
    fn test_refs_resolve_through_registry() {
        let mut reg = SchemaRegistry::new();
        reg.insert(
            "Node",
            Validator::Object {
                fields: vec![field(
                    "next",
                    Validator::Ref {
                        name: "Node".into(),
                        deferred: true,
                    }
                    .nullable(),
                )],
                mode: ObjectMode::Strip,
            },
        );
        let v = Validator::Ref {
            name: "Node".into(),
            deferred: false,
        };
        assert!(v
            .parse(&json!({"next": {"next": {"next": null}}}), &reg)
            .is_ok());
        let err = v.parse(&json!({"next": {"next": 1}}), &reg).unwrap_err();
        assert_eq!(err.path_string(), "next.next");
    }

    #[test]
    fn test_unknown_reference() {
        let reg = SchemaRegistry::new();
        let v = Validator::Ref {
            name: "Ghost".into(),
            deferred: false,
        };
        assert!(v.parse(&json!({}), &reg).is_err());
    }

    #[test]
    fn test_any_field_may_be_missing() {
        let reg = SchemaRegistry::new();
        let v = Validator::Object {
            fields: vec![field("meta", Validator::Any)],
            mode: ObjectMode::Strip,
        };
        assert_eq!(v.parse(&json!({}), &reg).unwrap(), json!({}));
    }

    #[test]
    fn test_into_error() {
        let issue = ValidationIssue::new(&[], "expected object, received string");
        let err = issue.into_error(ValidationTarget::Response);
        assert!(matches!(
            err,
            AppError::Validation {
                target: ValidationTarget::Response,
                ..
            }
        ));
    }
}
