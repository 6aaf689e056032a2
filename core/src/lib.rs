#![deny(missing_docs)]

//! # Clientgen Core
//!
//! Core library for the OpenAPI -> typed client generator.

/// Shared error types.
pub mod error;

/// OpenAPI (OAS) input model and loading.
pub mod oas;

/// Schema dependency graph and ordering.
pub mod graph;

/// Validator IR and its executable semantics.
pub mod validator;

/// Schema -> validator compilation.
pub mod compiler;

/// Component schema declarations.
pub mod components;

/// Route analysis and the client namespace tree.
pub mod client;

/// Pipeline assembly.
pub mod module;

/// Target-language rendering and formatting.
pub mod render;

/// In-process execution of generated call functions.
pub mod runtime;

pub use client::{build_client_tree, ClientTreeNode, Endpoint, InlineSchemaTable};
pub use compiler::{CompileOptions, ForwardRefs, SchemaCompiler};
pub use components::{emit_component_schemas, SchemaDecl};
pub use error::{AppError, AppResult, ValidationTarget};
pub use graph::{extract_dependencies, SchemaOrder};
pub use module::{generate_module, generate_source, ClientModule, GenerateOptions};
pub use oas::{parse_document, SchemaDocument, SchemaKind, SchemaNode, SpecSource};
pub use render::{BuiltinFormatter, ClientTarget, ExternalFormatter, Formatter, TypeScriptZodTarget};
pub use runtime::{CallInput, Client, ClientConfig, HttpRequest, HttpResponse, Transport};
#[cfg(feature = "client")]
pub use runtime::UreqTransport;
pub use validator::{ObjectMode, SchemaRegistry, ValidationIssue, Validator};
