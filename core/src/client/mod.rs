#![deny(missing_docs)]

//! # Client Module
//!
//! Route analysis: naming, the namespace tree, and the builder that fills it.

pub mod builder;
pub mod naming;
pub mod tree;

pub use builder::{build_client_tree, InlineSchemaTable};
pub use tree::{ClientTreeNode, Endpoint};
