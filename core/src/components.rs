#![deny(missing_docs)]

//! # Component Schemas
//!
//! Emits one declaration per named schema, in dependency order.

use crate::compiler::{ForwardRefs, SchemaCompiler};
use crate::error::AppResult;
use crate::graph::SchemaOrder;
use crate::oas::schema::SchemaNode;
use crate::validator::Validator;
use indexmap::IndexMap;
use tracing::debug;

/// A compiled named schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDecl {
    /// The schema name (used verbatim for the rendered `<Name>Schema` identifier).
    pub name: String,
    /// The compiled validator.
    pub validator: Validator,
    /// Whether an earlier (or the same) declaration references this one.
    /// Such declarations are rendered with deferred construction.
    pub deferred: bool,
}

/// Compiles every schema of `schemas` in `order`.
///
/// The returned list contains exactly one entry per name in `order`.
pub fn emit_component_schemas(
    schemas: &IndexMap<String, SchemaNode>,
    order: &SchemaOrder,
    compiler: &SchemaCompiler<'_>,
) -> AppResult<Vec<SchemaDecl>> {
    let mut forward = ForwardRefs::new();
    let mut decls = Vec::with_capacity(order.len());

    for name in order.names() {
        let Some(node) = schemas.get(name) else {
            continue;
        };
        let validator = compiler.compile_schema(name, node, &mut forward)?;
        decls.push(SchemaDecl {
            name: name.clone(),
            validator,
            deferred: false,
        });
    }

    for decl in &mut decls {
        decl.deferred = forward.contains(&decl.name);
    }
    debug!(
        "Emitted {} component schemas ({} deferred)",
        decls.len(),
        forward.len()
    );
    Ok(decls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::CompileOptions;
    use serde_json::json;

    fn schemas(value: serde_json::Value) -> IndexMap<String, SchemaNode> {
        value
            .as_object()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), SchemaNode::from_value(v)))
            .collect()
    }

    #[test]
    fn test_one_declaration_per_schema_in_order() {
        let map = schemas(json!({
            "Pet": { "type": "object", "properties": { "tag": { "$ref": "#/components/schemas/Tag" } } },
            "Tag": { "type": "object", "properties": { "label": { "type": "string" } } },
            "Status": { "type": "string", "enum": ["a"] }
        }));
        let order = SchemaOrder::build(&map);
        let compiler = SchemaCompiler::new(&order, CompileOptions::default());
        let decls = emit_component_schemas(&map, &order, &compiler).unwrap();

        let names: Vec<_> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["Tag", "Pet", "Status"]);
        assert!(decls.iter().all(|d| !d.deferred));
        assert_eq!(decls[2].validator, Validator::Any);
    }

    #[test]
    fn test_cycle_marks_forward_target_deferred() {
        let map = schemas(json!({
            "A": { "type": "object", "properties": { "b": { "$ref": "#/components/schemas/B" } } },
            "B": { "type": "object", "properties": { "a": { "$ref": "#/components/schemas/A" } } }
        }));
        let order = SchemaOrder::build(&map);
        let compiler = SchemaCompiler::new(&order, CompileOptions::default());
        let decls = emit_component_schemas(&map, &order, &compiler).unwrap();

        assert_eq!(decls[0].name, "B");
        assert!(!decls[0].deferred);
        assert_eq!(decls[1].name, "A");
        assert!(decls[1].deferred);
    }

    #[test]
    fn test_self_reference_is_deferred() {
        let map = schemas(json!({
            "Node": { "type": "object", "properties": {
                "next": { "$ref": "#/components/schemas/Node", "nullable": true }
            }}
        }));
        let order = SchemaOrder::build(&map);
        let compiler = SchemaCompiler::new(&order, CompileOptions::default());
        let decls = emit_component_schemas(&map, &order, &compiler).unwrap();
        assert!(decls[0].deferred);
    }
}
