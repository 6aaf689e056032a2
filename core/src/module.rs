#![deny(missing_docs)]

//! # Client Module Assembly
//!
//! Runs the whole pipeline over one document:
//! 1. Order the component schemas.
//! 2. Compile them into declarations.
//! 3. Build the client tree and its inline schemas.
//! 4. Compile the inline schemas.
//!
//! The result is a target-independent `ClientModule`; rendering to source text
//! is done by a `ClientTarget`.

use crate::client::{build_client_tree, ClientTreeNode};
use crate::compiler::{CompileOptions, ForwardRefs, SchemaCompiler};
use crate::components::{emit_component_schemas, SchemaDecl};
use crate::error::{AppError, AppResult};
use crate::graph::SchemaOrder;
use crate::oas::document::{parse_document, SchemaDocument};
use crate::render::format::Formatter;
use crate::render::ClientTarget;
use crate::validator::SchemaRegistry;
use tracing::info;

/// Library-side generation options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Fail on schema shapes that would otherwise degrade to `any`.
    pub strict: bool,
}

/// Everything a target needs to render the client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientModule {
    /// Component declarations in dependency order.
    pub components: Vec<SchemaDecl>,
    /// Inline (per-operation) declarations in creation order.
    pub inline: Vec<SchemaDecl>,
    /// The namespace of call functions.
    pub tree: ClientTreeNode,
}

impl ClientModule {
    /// All declarations, keyed by name, for executing validators.
    pub fn registry(&self) -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        for decl in self.components.iter().chain(&self.inline) {
            registry.insert(decl.name.clone(), decl.validator.clone());
        }
        registry
    }

    /// A component declaration by name.
    pub fn component(&self, name: &str) -> Option<&SchemaDecl> {
        self.components.iter().find(|d| d.name == name)
    }

    /// An inline declaration by name.
    pub fn inline_schema(&self, name: &str) -> Option<&SchemaDecl> {
        self.inline.iter().find(|d| d.name == name)
    }
}

/// Builds the `ClientModule` for a parsed document.
///
/// # Errors
///
/// * `AppError::Input` when `components.schemas` is missing or an `operationId` repeats.
/// * `AppError::Compile` in strict mode, for the first schema that would degrade.
pub fn generate_module(
    document: &SchemaDocument,
    options: &GenerateOptions,
) -> AppResult<ClientModule> {
    let schemas = document.schemas().ok_or_else(|| {
        AppError::Input("No components.schemas found in OpenAPI spec".to_string())
    })?;

    let order = SchemaOrder::build(schemas);
    info!("Ordered {} component schemas", order.len());

    let compiler = SchemaCompiler::new(
        &order,
        CompileOptions {
            strict: options.strict,
        },
    );
    let components = emit_component_schemas(schemas, &order, &compiler)?;

    let (tree, inline_table) = build_client_tree(document, &order)?;

    let mut inline = Vec::with_capacity(inline_table.len());
    for (name, node) in inline_table.iter() {
        // Inline names are never in the order, so refs from them are never deferred.
        let mut forward = ForwardRefs::new();
        let validator = compiler.compile_schema(name, node, &mut forward)?;
        inline.push(SchemaDecl {
            name: name.clone(),
            validator,
            deferred: false,
        });
    }

    Ok(ClientModule {
        components,
        inline,
        tree,
    })
}

/// Parses `text`, generates the module, renders it with `target` and formats it.
pub fn generate_source(
    text: &str,
    options: &GenerateOptions,
    target: &dyn ClientTarget,
    formatter: &dyn Formatter,
) -> AppResult<String> {
    let document = parse_document(text)?;
    let module = generate_module(&document, options)?;
    let source = target.render_module(&module)?;
    info!("Rendered {} module ({} bytes)", target.name(), source.len());
    formatter.format(&source)
}
