#![deny(missing_docs)]

//! # OpenAPI Document Parsing
//!
//! Deserialization layer for the parts of an OpenAPI document the generator reads:
//! `components.schemas`, `components.parameters` and `paths`.
//!
//! YAML is first converted to `serde_json::Value` (mapping keys stringified, order kept)
//! so that unquoted status codes such as `200:` are accepted.

use crate::error::{AppError, AppResult};
use crate::oas::refs::parameter_ref_name;
use crate::oas::schema::SchemaNode;
use indexmap::IndexMap;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// The HTTP methods recognised as operations inside a Path Item.
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Media type consulted for request and response bodies.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// The root input document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaDocument {
    /// The `components` object.
    #[serde(default)]
    pub components: Option<ComponentsNode>,
    /// Path templates mapped to their operations, in document order.
    #[serde(default)]
    pub paths: PathsNode,
}

impl SchemaDocument {
    /// Returns `components.schemas`, or `None` when the document has no schema mapping.
    pub fn schemas(&self) -> Option<&IndexMap<String, SchemaNode>> {
        self.components.as_ref()?.schemas.as_ref()
    }

    /// Resolves a parameter `$ref` against `components.parameters`.
    pub fn resolve_parameter<'a>(&'a self, param: &'a ParameterNode) -> Option<&'a ParameterNode> {
        let Some(pointer) = param.reference.as_deref() else {
            return Some(param);
        };
        let name = parameter_ref_name(pointer)?;
        self.components.as_ref()?.parameters.get(&name)
    }
}

/// The `components` object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComponentsNode {
    /// Named schemas. `None` when the key is missing entirely.
    #[serde(default)]
    pub schemas: Option<IndexMap<String, SchemaNode>>,
    /// Reusable parameters.
    #[serde(default)]
    pub parameters: IndexMap<String, ParameterNode>,
}

/// The Paths Object, with specification extensions (`x-...`) dropped.
#[derive(Debug, Clone, Default)]
pub struct PathsNode {
    /// Path items keyed by path template.
    pub items: IndexMap<String, PathItem>,
}

impl<'de> Deserialize<'de> for PathsNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        let mut items = IndexMap::new();
        for (key, value) in raw {
            if key.starts_with("x-") {
                continue;
            }
            let item = serde_json::from_value::<PathItem>(value).map_err(|e| {
                DeError::custom(format!("Failed to parse path item '{}': {}", key, e))
            })?;
            items.insert(key, item);
        }
        Ok(Self { items })
    }
}

/// One Path Item: its operations keyed by lowercase HTTP method, plus shared parameters.
#[derive(Debug, Clone, Default)]
pub struct PathItem {
    /// Operations in document order.
    pub operations: IndexMap<String, OperationNode>,
    /// Parameters shared by every operation on this path.
    pub parameters: Vec<ParameterNode>,
}

impl<'de> Deserialize<'de> for PathItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        let mut item = PathItem::default();
        for (key, value) in raw {
            let lowered = key.to_ascii_lowercase();
            if HTTP_METHODS.contains(&lowered.as_str()) {
                let op = serde_json::from_value::<OperationNode>(value).map_err(|e| {
                    DeError::custom(format!("Failed to parse '{}' operation: {}", key, e))
                })?;
                item.operations.insert(lowered, op);
            } else if key == "parameters" {
                item.parameters = serde_json::from_value(value).map_err(|e| {
                    DeError::custom(format!("Failed to parse path parameters: {}", e))
                })?;
            }
        }
        Ok(item)
    }
}

/// One HTTP method on one path.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationNode {
    /// The `operationId`.
    pub operation_id: Option<String>,
    /// Short summary, carried into the generated function's comment.
    pub summary: Option<String>,
    /// Operation parameters (all locations).
    #[serde(default)]
    pub parameters: Vec<ParameterNode>,
    /// The request body.
    pub request_body: Option<BodyNode>,
    /// Responses keyed by status code (or `default`).
    #[serde(default)]
    pub responses: IndexMap<String, BodyNode>,
}

impl OperationNode {
    /// The `requestBody.content["application/json"].schema`, if any.
    pub fn json_request_schema(&self) -> Option<&SchemaNode> {
        self.request_body.as_ref()?.json_schema()
    }

    /// The first present of `responses["200"]`, `["201"]`, `["default"]`.
    pub fn success_response(&self) -> Option<&BodyNode> {
        ["200", "201", "default"]
            .iter()
            .find_map(|code| self.responses.get(*code))
    }
}

/// A request body or response object; only its `content` map is read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BodyNode {
    /// Media types mapped to their schema.
    #[serde(default)]
    pub content: IndexMap<String, MediaTypeNode>,
}

impl BodyNode {
    /// The `content["application/json"].schema`, if any.
    pub fn json_schema(&self) -> Option<&SchemaNode> {
        self.content.get(JSON_MEDIA_TYPE)?.schema.as_ref()
    }
}

/// A Media Type object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaTypeNode {
    /// The payload schema.
    pub schema: Option<SchemaNode>,
}

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// `in: query`
    Query,
    /// `in: path`
    Path,
    /// `in: header`
    Header,
    /// `in: cookie`
    Cookie,
    /// Anything else, or absent (e.g. on a `$ref`).
    #[default]
    #[serde(other)]
    Other,
}

/// A Parameter object, or a reference to one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParameterNode {
    /// A `$ref` to `#/components/parameters/<Name>`.
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    /// Parameter name.
    #[serde(default)]
    pub name: String,
    /// Parameter location.
    #[serde(rename = "in", default)]
    pub location: ParameterLocation,
    /// Whether the parameter must be supplied.
    #[serde(default)]
    pub required: bool,
    /// Free-form documentation.
    pub description: Option<String>,
    /// Value schema.
    pub schema: Option<SchemaNode>,
}

/// Parses an OpenAPI document (YAML or JSON).
pub fn parse_document(content: &str) -> AppResult<SchemaDocument> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)
        .map_err(|e| AppError::Input(format!("Failed to parse OpenAPI YAML: {}", e)))?;
    let json = yaml_to_json(yaml);
    if !json.is_object() {
        return Err(AppError::Input(
            "Invalid OpenAPI document: root must be a mapping".into(),
        ));
    }
    serde_json::from_value(json)
        .map_err(|e| AppError::Input(format!("Failed to read OpenAPI document: {}", e)))
}

/// Converts YAML into JSON, stringifying non-string mapping keys and keeping key order.
fn yaml_to_json(value: serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(mapping) => {
            let mut out = serde_json::Map::new();
            for (key, value) in mapping {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    Yaml::Null => "null".to_string(),
                    other => {
                        warn!("Skipping unsupported YAML mapping key: {:?}", other);
                        continue;
                    }
                };
                out.insert(key, yaml_to_json(value));
            }
            Value::Object(out)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::schema::SchemaKind;

    const PETSTORE: &str = r#"
openapi: 3.1.0
info: {title: Pets, version: 1.0.0}
x-top-level: ignored
paths:
  x-internal: {}
  /pets:
    summary: Pets collection
    parameters:
      - name: tenant
        in: query
        schema: {type: string}
    get:
      operationId: listPets
      parameters:
        - $ref: '#/components/parameters/Limit'
      responses:
        200:
          description: ok
          content:
            application/json:
              schema:
                type: array
                items: {$ref: '#/components/schemas/Pet'}
    post:
      operationId: createPet
      requestBody:
        content:
          application/json:
            schema: {$ref: '#/components/schemas/Pet'}
      responses:
        '201':
          description: created
components:
  parameters:
    Limit:
      name: limit
      in: query
      schema: {type: integer}
  schemas:
    Pet:
      type: object
      properties:
        name: {type: string}
"#;

    #[test]
    fn test_parse_paths_and_methods_in_order() {
        let doc = parse_document(PETSTORE).unwrap();
        assert_eq!(doc.paths.items.len(), 1);
        let item = &doc.paths.items["/pets"];
        assert_eq!(
            item.operations.keys().collect::<Vec<_>>(),
            vec!["get", "post"]
        );
        assert_eq!(item.parameters.len(), 1);
        assert_eq!(item.parameters[0].location, ParameterLocation::Query);
    }

    #[test]
    fn test_integer_status_keys_are_stringified() {
        let doc = parse_document(PETSTORE).unwrap();
        let get = &doc.paths.items["/pets"].operations["get"];
        let response = get.success_response().unwrap();
        let schema = response.json_schema().unwrap();
        assert!(matches!(schema.kind, SchemaKind::Array { .. }));
    }

    #[test]
    fn test_request_body_schema() {
        let doc = parse_document(PETSTORE).unwrap();
        let post = &doc.paths.items["/pets"].operations["post"];
        assert_eq!(
            post.json_request_schema().and_then(|s| s.ref_pointer()),
            Some("#/components/schemas/Pet")
        );
        assert!(post.success_response().unwrap().json_schema().is_none());
    }

    #[test]
    fn test_parameter_ref_resolution() {
        let doc = parse_document(PETSTORE).unwrap();
        let get = &doc.paths.items["/pets"].operations["get"];
        let resolved = doc.resolve_parameter(&get.parameters[0]).unwrap();
        assert_eq!(resolved.name, "limit");
        assert_eq!(resolved.location, ParameterLocation::Query);
    }

    #[test]
    fn test_success_response_priority() {
        let doc = parse_document(
            r#"
paths:
  /x:
    get:
      responses:
        default: {description: fallback}
        '201': {description: created}
"#,
        )
        .unwrap();
        let op = &doc.paths.items["/x"].operations["get"];
        // 201 is consulted before default regardless of document order
        assert!(std::ptr::eq(
            op.success_response().unwrap(),
            &op.responses["201"]
        ));
    }

    #[test]
    fn test_missing_components_is_not_a_parse_error() {
        let doc = parse_document("paths: {}").unwrap();
        assert!(doc.schemas().is_none());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = parse_document("paths: [unclosed").unwrap_err();
        assert!(matches!(err, AppError::Input(_)));
    }

    #[test]
    fn test_json_input() {
        let doc = parse_document(r#"{"components": {"schemas": {"A": {"type": "string"}}}}"#)
            .unwrap();
        assert_eq!(doc.schemas().unwrap().len(), 1);
    }
}
