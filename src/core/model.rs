//! Graph model handles
//!
//! Nodes, relationships and indexes are lightweight handles owned by
//! the database; their records live in the store.

use std::fmt;
use serde::{Deserialize, Serialize};

/// Identifier of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Identifier of a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelationshipId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// A node in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Node {
    id: NodeId,
}

impl Node {
    pub(crate) fn new(id: NodeId) -> Self {
        Node { id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }
}

/// A directed, typed edge between two nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: RelationshipId,
    pub start: NodeId,
    pub end: NodeId,
    pub rel_type: String,
}

impl Relationship {
    /// The node this relationship points to
    pub fn end_node(&self) -> Node {
        Node::new(self.end)
    }

    /// The node this relationship starts from
    pub fn start_node(&self) -> Node {
        Node::new(self.start)
    }
}

/// A named mapping from (field, key) to a set of nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Index {
    name: String,
}

impl Index {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Index { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Catalog record describing an index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct IndexMeta {
    pub name: String,
    /// Creation time in milliseconds since the Unix epoch
    pub created_at: i64,
}
