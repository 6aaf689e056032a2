#![deny(missing_docs)]

//! # Schema Compiler
//!
//! Translates `SchemaNode`s into `Validator` expressions.
//!
//! Two entry points exist:
//! - `compile_node`: the nested form used for properties and array items.
//!   Nested `type: object` nodes become open objects; their properties are not expanded.
//! - `compile_schema`: the whole-schema form used for named and inline declarations.
//!   Expands object properties (with `required`/`additionalProperties`) and arrays;
//!   every other top-level shape falls back to `Any`.
//!
//! Forward references are recorded in an explicit `ForwardRefs` accumulator.

use crate::error::{AppError, AppResult};
use crate::graph::SchemaOrder;
use crate::oas::refs::schema_ref_name;
use crate::oas::schema::{Primitive, SchemaKind, SchemaNode};
use crate::validator::{Field, ObjectMode, Validator};
use indexmap::IndexSet;
use tracing::warn;

/// Options controlling degradation behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Turn every permissive fallback into an `AppError::Compile`.
    pub strict: bool,
}

/// Names that are referenced before their own declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardRefs(IndexSet<String>);

impl ForwardRefs {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `name`.
    pub fn insert(&mut self, name: impl Into<String>) {
        self.0.insert(name.into());
    }

    /// Whether `name` was recorded.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Recorded names, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    /// Number of recorded names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Compiles schema nodes against a fixed `SchemaOrder`.
#[derive(Debug, Clone, Copy)]
pub struct SchemaCompiler<'a> {
    order: &'a SchemaOrder,
    options: CompileOptions,
}

impl<'a> SchemaCompiler<'a> {
    /// Creates a compiler.
    pub fn new(order: &'a SchemaOrder, options: CompileOptions) -> Self {
        Self { order, options }
    }

    /// Compiles a whole named (or inline) schema.
    ///
    /// # Arguments
    ///
    /// * `name` - The schema being declared; used for forward-reference detection.
    /// * `node` - The schema.
    /// * `forward` - Accumulates names that must be declared with deferred construction.
    pub fn compile_schema(
        &self,
        name: &str,
        node: &SchemaNode,
        forward: &mut ForwardRefs,
    ) -> AppResult<Validator> {
        let base = match &node.kind {
            SchemaKind::Object {
                properties: Some(properties),
                required,
                additional_properties,
            } => {
                let mut fields = Vec::with_capacity(properties.len());
                for (prop, prop_node) in properties {
                    let mut validator = self.compile_node(name, prop_node, forward)?;
                    if !required.contains(prop) {
                        validator = validator.optional();
                    }
                    fields.push(Field {
                        name: prop.clone(),
                        validator,
                        description: prop_node.description.clone(),
                    });
                }
                let mode = if *additional_properties == Some(false) {
                    ObjectMode::Strict
                } else {
                    ObjectMode::Strip
                };
                Validator::Object { fields, mode }
            }
            SchemaKind::Array { items: Some(items) } => {
                Validator::Array(Box::new(self.compile_node(name, items, forward)?))
            }
            other => {
                self.degrade(name, &format!("top-level {} compiles to any", describe(other)))?;
                return Ok(Validator::Any);
            }
        };
        Ok(if node.nullable { base.nullable() } else { base })
    }

    /// Compiles a nested node (property type or array item).
    pub fn compile_node(
        &self,
        current: &str,
        node: &SchemaNode,
        forward: &mut ForwardRefs,
    ) -> AppResult<Validator> {
        let base = match &node.kind {
            SchemaKind::Union(members) => {
                let mut compiled = Vec::with_capacity(members.len());
                for member in members {
                    compiled.push(self.compile_node(current, member, forward)?);
                }
                Validator::Union(compiled)
            }
            kind => self.compile_kind(current, kind, forward)?,
        };
        Ok(if node.nullable { base.nullable() } else { base })
    }

    fn compile_kind(
        &self,
        current: &str,
        kind: &SchemaKind,
        forward: &mut ForwardRefs,
    ) -> AppResult<Validator> {
        Ok(match kind {
            SchemaKind::Ref(pointer) => self.compile_ref(current, pointer, forward)?,
            SchemaKind::Primitive(Primitive::String) => Validator::String,
            SchemaKind::Primitive(Primitive::Number | Primitive::Integer) => Validator::Number,
            SchemaKind::Primitive(Primitive::Boolean) => Validator::Boolean,
            SchemaKind::Object { .. } => Validator::open_object(),
            SchemaKind::Array { items: Some(items) } => {
                Validator::Array(Box::new(self.compile_node(current, items, forward)?))
            }
            SchemaKind::Array { items: None } => {
                self.degrade(current, "array without `items` accepts any element")?;
                Validator::Array(Box::new(Validator::Any))
            }
            SchemaKind::Union(_) => {
                let node = SchemaNode::new(kind.clone());
                self.compile_node(current, &node, forward)?
            }
            SchemaKind::Unknown(_) => {
                self.degrade(current, &format!("{} compiles to any", describe(kind)))?;
                Validator::Any
            }
        })
    }

    fn compile_ref(
        &self,
        current: &str,
        pointer: &str,
        forward: &mut ForwardRefs,
    ) -> AppResult<Validator> {
        let Some(target) = schema_ref_name(pointer).filter(|name| self.order.contains(name))
        else {
            self.degrade(current, &format!("unresolvable $ref `{}` compiles to any", pointer))?;
            return Ok(Validator::Any);
        };
        let deferred = self.order.is_forward(current, &target);
        if deferred {
            forward.insert(target.clone());
        }
        Ok(Validator::Ref {
            name: target,
            deferred,
        })
    }

    fn degrade(&self, schema: &str, reason: &str) -> AppResult<()> {
        if self.options.strict {
            return Err(AppError::Compile(format!("schema `{}`: {}", schema, reason)));
        }
        warn!("schema `{}`: {}", schema, reason);
        Ok(())
    }
}

fn describe(kind: &SchemaKind) -> String {
    match kind {
        SchemaKind::Ref(pointer) => format!("$ref `{}`", pointer),
        SchemaKind::Object { .. } => "object without `properties`".to_string(),
        SchemaKind::Array { .. } => "array without `items`".to_string(),
        SchemaKind::Primitive(p) => format!("{:?} schema", p).to_lowercase(),
        SchemaKind::Union(_) => "type union".to_string(),
        SchemaKind::Unknown(Some(name)) => format!("unknown type `{}`", name),
        SchemaKind::Unknown(None) => "schema without `type`".to_string(),
    }
}
