#![deny(missing_docs)]

//! # OpenAPI Input Module
//!
//! - **document**: Deserialization of paths, operations, parameters and bodies.
//! - **schema**: The closed `SchemaNode` representation of JSON schemas.
//! - **refs**: `$ref` pointer helpers.
//! - **source**: Loading the document from a file or URL.

pub mod document;
pub mod refs;
pub mod schema;
pub mod source;

pub use document::{
    parse_document, BodyNode, OperationNode, ParameterLocation, ParameterNode, PathItem,
    SchemaDocument,
};
pub use refs::schema_ref_name;
pub use schema::{Primitive, SchemaKind, SchemaNode};
pub use source::SpecSource;
