#![deny(missing_docs)]

//! # Schema Graph
//!
//! Dependency extraction and cycle-tolerant ordering of named schemas.
//!
//! The order guarantees that for every acyclic edge `A -> B` (A references B),
//! B is placed before A. Cycles are broken by never re-entering a schema that is
//! still on the current search path; the closing edge is simply dropped.

use crate::oas::refs::schema_ref_name;
use crate::oas::schema::{SchemaKind, SchemaNode};
use indexmap::{IndexMap, IndexSet};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Collects the component names referenced anywhere inside `node`.
///
/// Names are de-duplicated and returned in the order their `$ref` first occurs.
/// Pointers that are not of the form `#/components/schemas/<Name>` are ignored.
pub fn extract_dependencies(node: &SchemaNode) -> Vec<String> {
    let mut found = IndexSet::new();
    collect_refs(node, &mut found);
    found.into_iter().collect()
}

fn collect_refs(node: &SchemaNode, found: &mut IndexSet<String>) {
    match &node.kind {
        SchemaKind::Ref(pointer) => {
            if let Some(name) = schema_ref_name(pointer) {
                found.insert(name);
            }
        }
        SchemaKind::Object { properties, .. } => {
            for child in properties.iter().flat_map(|props| props.values()) {
                collect_refs(child, found);
            }
        }
        SchemaKind::Array { items } => {
            if let Some(items) = items {
                collect_refs(items, found);
            }
        }
        SchemaKind::Union(members) => {
            for member in members {
                collect_refs(member, found);
            }
        }
        SchemaKind::Primitive(_) | SchemaKind::Unknown(_) => {}
    }
}

/// A total order over schema names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaOrder {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl SchemaOrder {
    /// Orders `schemas` depth-first, dependencies first.
    ///
    /// Top-level iteration follows the mapping order; dependencies are visited in
    /// the order their references occur. Dangling references are skipped.
    pub fn build(schemas: &IndexMap<String, SchemaNode>) -> Self {
        let graph: IndexMap<String, Vec<String>> = schemas
            .iter()
            .map(|(name, node)| (name.clone(), extract_dependencies(node)))
            .collect();

        let mut visited = HashSet::new();
        let mut names = Vec::with_capacity(graph.len());
        for name in graph.keys() {
            let mut ancestors = HashSet::new();
            visit(name, &graph, &mut ancestors, &mut visited, &mut names);
        }

        debug!("Schema order: {:?}", names);
        Self::from_names(names)
    }

    fn from_names(names: Vec<String>) -> Self {
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { names, index }
    }

    /// The ordered names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Position of `name` in the order.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Whether `name` is an ordered schema.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of ordered schemas.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the order is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether a reference from `current` to `target` must be deferred.
    ///
    /// True when `target` is declared after `current`, and for a schema that
    /// references itself. Unknown names are never forward references.
    pub fn is_forward(&self, current: &str, target: &str) -> bool {
        match (self.index_of(current), self.index_of(target)) {
            (Some(current), Some(target)) => target >= current,
            _ => false,
        }
    }
}

fn visit<'a>(
    name: &'a str,
    graph: &'a IndexMap<String, Vec<String>>,
    ancestors: &mut HashSet<&'a str>,
    visited: &mut HashSet<&'a str>,
    out: &mut Vec<String>,
) {
    if ancestors.contains(name) || visited.contains(name) {
        return;
    }
    ancestors.insert(name);

    if let Some(deps) = graph.get(name) {
        for dep in deps {
            if graph.contains_key(dep.as_str()) {
                visit(dep, graph, ancestors, visited, out);
            }
        }
    }

    ancestors.remove(name);
    visited.insert(name);
    out.push(name.to_string());
}
