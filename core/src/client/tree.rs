#![deny(missing_docs)]

//! # Client Tree
//!
//! The nested namespace of generated call functions.
//! Path segments become `children`; HTTP methods become `endpoints` of the terminal node.

use indexmap::IndexMap;
use tracing::warn;

/// One generated call function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Lowercase HTTP method (`get`, `post`, ...).
    pub method: String,
    /// The literal path template, e.g. `/widgets/{id}`.
    pub path: String,
    /// The source `operationId`, if any.
    pub operation_id: Option<String>,
    /// The operation summary, rendered as a comment.
    pub summary: Option<String>,
    /// Name of the query schema (always inline).
    pub query: Option<String>,
    /// Name of the body schema (component or inline).
    pub body: Option<String>,
    /// Name of the component schema the success response is validated against.
    pub response: Option<String>,
}

impl Endpoint {
    /// The upper-cased method sent on the wire.
    pub fn http_method(&self) -> String {
        self.method.to_uppercase()
    }
}

/// A node of the client namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientTreeNode {
    /// Functions at this node, keyed by lowercase method.
    pub endpoints: IndexMap<String, Endpoint>,
    /// Sub-namespaces keyed by transformed path segment.
    pub children: IndexMap<String, ClientTreeNode>,
}

impl ClientTreeNode {
    /// An empty root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `endpoint` under `endpoints[endpoint.method]` of the node at `keys`,
    /// creating intermediate nodes. Returns the endpoint it replaced, if any.
    pub fn insert(&mut self, keys: &[String], endpoint: Endpoint) -> Option<Endpoint> {
        let mut node = self;
        for key in keys {
            node = node.children.entry(key.clone()).or_default();
        }
        node.endpoints.insert(endpoint.method.clone(), endpoint)
    }

    /// The node at `keys`, if present.
    pub fn get(&self, keys: &[&str]) -> Option<&ClientTreeNode> {
        keys.iter()
            .try_fold(self, |node, key| node.children.get(*key))
    }

    /// The endpoint for `method` at `keys`. The method is matched case-insensitively.
    pub fn endpoint(&self, keys: &[&str], method: &str) -> Option<&Endpoint> {
        self.get(keys)?.endpoints.get(&method.to_lowercase())
    }

    /// Total number of endpoints in this subtree.
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
            + self
                .children
                .values()
                .map(ClientTreeNode::endpoint_count)
                .sum::<usize>()
    }

    /// Renames children whose key equals a method key on the same node, so the
    /// rendered object literal has unique keys. `get` becomes `getPath`.
    pub fn resolve_key_collisions(&mut self) {
        let colliding: Vec<String> = self
            .children
            .keys()
            .filter(|key| self.endpoints.contains_key(*key))
            .cloned()
            .collect();

        for key in colliding {
            let mut renamed = format!("{}Path", key);
            while self.endpoints.contains_key(&renamed) || self.children.contains_key(&renamed) {
                renamed.push_str("Path");
            }
            warn!(
                "Tree key `{}` collides with an HTTP method; renamed to `{}`",
                key, renamed
            );
            if let Some(index) = self.children.get_index_of(&key) {
                if let Some(child) = self.children.shift_remove(&key) {
                    self.children.shift_insert(index, renamed, child);
                }
            }
        }

        for child in self.children.values_mut() {
            child.resolve_key_collisions();
        }
    }
}
