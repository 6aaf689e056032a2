#![deny(missing_docs)]

//! # Client Tree Builder
//!
//! Walks every `(path, method, operation)` triple and produces the client tree
//! together with the synthesized per-operation schemas.

use crate::client::naming::{derive_input_name, segment_key};
use crate::client::tree::{ClientTreeNode, Endpoint};
use crate::error::{AppError, AppResult};
use crate::graph::SchemaOrder;
use crate::oas::document::{OperationNode, ParameterLocation, ParameterNode, PathItem, SchemaDocument};
use crate::oas::refs::schema_ref_name;
use crate::oas::schema::{SchemaKind, SchemaNode};
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Synthesized schemas (query objects and inline bodies), in creation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineSchemaTable {
    entries: IndexMap<String, SchemaNode>,
}

impl InlineSchemaTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `node` under `name`, or under `name` plus the first free numeric
    /// suffix when `name` is taken by a component or an earlier entry.
    /// Returns the name actually used.
    pub fn claim(&mut self, name: String, node: SchemaNode, components: &SchemaOrder) -> String {
        let taken = |candidate: &str| {
            self.entries.contains_key(candidate) || components.contains(candidate)
        };
        let mut chosen = name.clone();
        let mut n = 2;
        while taken(&chosen) {
            chosen = format!("{}{}", name, n);
            n += 1;
        }
        if chosen != name {
            warn!("Inline schema name `{}` is taken; using `{}`", name, chosen);
        }
        self.entries.insert(chosen.clone(), node);
        chosen
    }

    /// Looks up an entry.
    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.entries.get(name)
    }

    /// Entries in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SchemaNode)> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds the client tree for `document`.
///
/// # Arguments
///
/// * `document` - The parsed OpenAPI document.
/// * `components` - The component order; used to resolve `$ref` targets and reserve names.
///
/// # Returns
///
/// * The tree and the inline schema table, or an `Input` error on duplicate `operationId`s
///   or on two paths that map to the same route and method.
pub fn build_client_tree(
    document: &SchemaDocument,
    components: &SchemaOrder,
) -> AppResult<(ClientTreeNode, InlineSchemaTable)> {
    let mut tree = ClientTreeNode::new();
    let mut inline = InlineSchemaTable::new();
    let mut operation_ids = HashSet::new();

    for (path, item) in &document.paths.items {
        let keys: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(segment_key)
            .collect();

        for (method, operation) in &item.operations {
            if let Some(id) = &operation.operation_id {
                if !operation_ids.insert(id.clone()) {
                    return Err(AppError::Input(format!(
                        "Duplicate operationId '{}' detected",
                        id
                    )));
                }
            }

            let endpoint = build_endpoint(
                document, components, &mut inline, path, item, method, operation,
            );
            debug!("Route {} {} -> {:?}", method.to_uppercase(), path, keys);
            if let Some(previous) = tree.insert(&keys, endpoint) {
                return Err(AppError::Input(format!(
                    "Paths '{}' and '{}' both map to client route '{}' for {}",
                    previous.path,
                    path,
                    keys.join("."),
                    method.to_uppercase()
                )));
            }
        }
    }

    tree.resolve_key_collisions();
    info!(
        "Built client tree with {} endpoints and {} inline schemas",
        tree.endpoint_count(),
        inline.len()
    );
    Ok((tree, inline))
}

fn build_endpoint(
    document: &SchemaDocument,
    components: &SchemaOrder,
    inline: &mut InlineSchemaTable,
    path: &str,
    item: &PathItem,
    method: &str,
    operation: &OperationNode,
) -> Endpoint {
    let op_id = operation.operation_id.as_deref();

    // 1. Request body: component ref or inline shape
    let body = operation.json_request_schema().map(|schema| {
        match known_component(schema, components) {
            Some(name) => name,
            None => inline.claim(
                derive_input_name(op_id, method, path, "Input"),
                schema.clone(),
                components,
            ),
        }
    });

    // 2. Query parameters
    let query = query_schema(document, item, operation).map(|schema| {
        inline.claim(
            derive_input_name(op_id, method, path, "Query"),
            schema,
            components,
        )
    });

    // 3. Response: only component refs are typed
    let response = operation
        .success_response()
        .and_then(|r| r.json_schema())
        .and_then(|schema| known_component(schema, components));

    Endpoint {
        method: method.to_string(),
        path: path.to_string(),
        operation_id: operation.operation_id.clone(),
        summary: operation.summary.clone(),
        query,
        body,
        response,
    }
}

fn known_component(schema: &SchemaNode, components: &SchemaOrder) -> Option<String> {
    schema_ref_name(schema.ref_pointer()?).filter(|name| components.contains(name))
}

/// Merges path-level and operation query parameters into one object schema.
/// Operation parameters override path-level ones with the same name.
fn query_schema(
    document: &SchemaDocument,
    item: &PathItem,
    operation: &OperationNode,
) -> Option<SchemaNode> {
    let mut params: IndexMap<&str, &ParameterNode> = IndexMap::new();
    for raw in item.parameters.iter().chain(&operation.parameters) {
        let Some(param) = document.resolve_parameter(raw) else {
            warn!(
                "Skipping unresolvable parameter reference {:?}",
                raw.reference.as_deref().unwrap_or_default()
            );
            continue;
        };
        if param.location == ParameterLocation::Query {
            params.insert(param.name.as_str(), param);
        }
    }
    if params.is_empty() {
        return None;
    }

    let mut properties = IndexMap::new();
    let mut required = Vec::new();
    for (name, param) in params {
        let mut schema = param.schema.clone().unwrap_or_else(SchemaNode::unknown);
        if param.description.is_some() {
            schema.description = param.description.clone();
        }
        if param.required {
            required.push(name.to_string());
        }
        properties.insert(name.to_string(), schema);
    }

    Some(SchemaNode::new(SchemaKind::Object {
        properties: Some(properties),
        required,
        additional_properties: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::document::parse_document;

    const SPEC: &str = r##"
openapi: 3.0.0
components:
  schemas:
    Widget:
      type: object
      properties:
        id: { type: string }
  parameters:
    Limit:
      name: limit
      in: query
      schema: { type: integer }
paths:
  /widgets:
    parameters:
      - $ref: '#/components/parameters/Limit'
      - name: cursor
        in: query
        schema: { type: string }
    get:
      operationId: listWidgets
      parameters:
        - name: cursor
          in: query
          required: true
          description: Opaque cursor
          schema: { type: string }
        - name: X-Trace
          in: header
          schema: { type: string }
      responses:
        '200':
          content:
            application/json:
              schema:
                type: array
                items: { $ref: '#/components/schemas/Widget' }
    post:
      operationId: createWidget
      parameters:
        - name: dryRun
          in: query
          schema: { type: boolean }
      requestBody:
        content:
          application/json:
            schema:
              type: object
              properties:
                name: { type: string }
      responses:
        '201':
          content:
            application/json:
              schema: { $ref: '#/components/schemas/Widget' }
  /widgets/{id}:
    get:
      responses:
        default:
          content:
            application/json:
              schema: { $ref: '#/components/schemas/Widget' }
    put:
      requestBody:
        content:
          application/json:
            schema: { $ref: '#/components/schemas/Widget' }
      responses:
        '200':
          content:
            application/json:
              schema: { $ref: '#/components/schemas/Missing' }
"##;

    fn build(spec: &str) -> AppResult<(ClientTreeNode, InlineSchemaTable)> {
        let doc = parse_document(spec).unwrap();
        let order = SchemaOrder::build(doc.schemas().unwrap());
        build_client_tree(&doc, &order)
    }

    #[test]
    fn test_tree_layout() {
        let (tree, _) = build(SPEC).unwrap();
        assert_eq!(tree.endpoint_count(), 4);
        let widgets = tree.get(&["widgets"]).unwrap();
        assert_eq!(widgets.endpoints.keys().collect::<Vec<_>>(), ["get", "post"]);
        let by_id = tree.get(&["widgets", "byId"]).unwrap();
        assert_eq!(by_id.endpoints.keys().collect::<Vec<_>>(), ["get", "put"]);
        assert_eq!(by_id.endpoints["get"].path, "/widgets/{id}");
    }

    #[test]
    fn test_query_merges_path_level_parameters() {
        let (tree, inline) = build(SPEC).unwrap();
        let list = tree.endpoint(&["widgets"], "get").unwrap();
        assert_eq!(list.query.as_deref(), Some("listWidgetsQuery"));
        assert_eq!(list.body, None);
        assert_eq!(list.response, None);

        let SchemaKind::Object { properties: Some(props), required, .. } =
            &inline.get("listWidgetsQuery").unwrap().kind
        else {
            panic!("Expected object query schema");
        };
        assert_eq!(props.keys().collect::<Vec<_>>(), ["limit", "cursor"]);
        assert_eq!(required, &vec!["cursor".to_string()]);
        assert_eq!(props["cursor"].description.as_deref(), Some("Opaque cursor"));
    }

    #[test]
    fn test_inline_body_and_typed_response() {
        let (tree, inline) = build(SPEC).unwrap();
        let create = tree.endpoint(&["widgets"], "post").unwrap();
        assert_eq!(create.body.as_deref(), Some("createWidgetInput"));
        assert_eq!(create.response.as_deref(), Some("Widget"));
        assert!(inline.get("createWidgetInput").is_some());
        // path-level query params still apply to other methods
        assert_eq!(create.query.as_deref(), Some("createWidgetQuery"));
    }

    #[test]
    fn test_component_body_and_unknown_response() {
        let (tree, inline) = build(SPEC).unwrap();
        let get = tree.endpoint(&["widgets", "byId"], "get").unwrap();
        assert_eq!(get.response.as_deref(), Some("Widget"));
        assert_eq!(get.query, None);

        let put = tree.endpoint(&["widgets", "byId"], "put").unwrap();
        assert_eq!(put.body.as_deref(), Some("Widget"));
        assert_eq!(put.response, None);
        assert_eq!(inline.len(), 3);
    }

    #[test]
    fn test_duplicate_operation_id() {
        let spec = r#"
components: { schemas: {} }
paths:
  /a:
    get: { operationId: same }
  /b:
    get: { operationId: same }
"#;
        let err = build(spec).unwrap_err();
        assert!(matches!(err, AppError::Input(_)));
        assert!(format!("{}", err).contains("Duplicate operationId 'same'"));
    }

    #[test]
    fn test_paths_sharing_a_route() {
        let spec = r#"
components: { schemas: {} }
paths:
  /users/{user_id}:
    get: { operationId: getUserSnake }
  /users/{userId}:
    get: { operationId: getUserCamel }
"#;
        let err = build(spec).unwrap_err();
        assert!(matches!(err, AppError::Input(_)));
        assert_eq!(
            err.to_string(),
            "Input Error: Paths '/users/{user_id}' and '/users/{userId}' both map to client route 'users.byUserId' for GET"
        );

        // Different methods on the same route are siblings.
        let spec = r#"
components: { schemas: {} }
paths:
  /a/{id}:
    get: { operationId: one }
  /a/byId:
    put: { operationId: two }
"#;
        let (tree, _) = build(spec).unwrap();
        assert_eq!(tree.endpoint_count(), 2);
        assert_eq!(tree.endpoint(&["a", "byId"], "get").unwrap().path, "/a/{id}");
        assert_eq!(tree.endpoint(&["a", "byId"], "put").unwrap().path, "/a/byId");
    }

    #[test]
    fn test_inline_name_collision_gets_suffix() {
        let spec = r#"
components:
  schemas:
    saveInput: { type: object, properties: {} }
paths:
  /a:
    post:
      operationId: save
      requestBody:
        content:
          application/json:
            schema: { type: object, properties: { x: { type: string } } }
"#;
        let (tree, inline) = build(spec).unwrap();
        let ep = tree.endpoint(&["a"], "post").unwrap();
        assert_eq!(ep.body.as_deref(), Some("saveInput2"));
        assert!(inline.get("saveInput2").is_some());
    }
}
