//! Transaction scopes for the graph store
//!
//! A scope buffers every write and applies the whole buffer in one
//! multi-tree sled transaction on [`Transaction::commit`]. A scope that
//! is dropped without committing (for example because an error was
//! propagated with `?`) rolls back by discarding its buffer.

use std::collections::HashSet;

use bincode::serialize;
use log::debug;
use sled::transaction::{TransactionError, TransactionResult};
use sled::Transactional;

use crate::core::errors::{GraphError, Result};
use crate::core::model::{Index, IndexMeta, Node, NodeId, Relationship, RelationshipId};
use crate::core::value::Properties;
use crate::storage::graph::{GraphDb, RelationshipRecord};
use crate::storage::keys;

/// Tree a buffered write targets
#[derive(Debug, Clone, Copy)]
enum Space {
    Nodes,
    Relationships,
    Adjacency,
    IndexCatalog,
    IndexEntries,
}

#[derive(Debug)]
struct Write {
    space: Space,
    key: Vec<u8>,
    value: Vec<u8>,
}

/// A scoped acquisition of write access to a [`GraphDb`]
pub struct Transaction<'db> {
    db: &'db GraphDb,
    writes: Vec<Write>,
    created_nodes: HashSet<NodeId>,
    created_indexes: HashSet<String>,
    finished: bool,
}

impl<'db> Transaction<'db> {
    pub(crate) fn new(db: &'db GraphDb) -> Self {
        Transaction {
            db,
            writes: Vec::new(),
            created_nodes: HashSet::new(),
            created_indexes: HashSet::new(),
            finished: false,
        }
    }

    /// Number of writes buffered so far
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    fn push(&mut self, space: Space, key: impl Into<Vec<u8>>, value: Vec<u8>) {
        self.writes.push(Write {
            space,
            key: key.into(),
            value,
        });
    }

    /// Create a node carrying `properties`
    pub fn create_node(&mut self, properties: &Properties) -> Result<Node> {
        let id = NodeId(self.db.generate_id()?);
        self.push(Space::Nodes, keys::node_key(id), serialize(properties)?);
        self.created_nodes.insert(id);
        Ok(Node::new(id))
    }

    fn node_visible(&self, id: NodeId) -> Result<bool> {
        Ok(self.created_nodes.contains(&id) || self.db.contains_node(id)?)
    }

    /// Create a relationship of `rel_type` from `start` to `end`
    ///
    /// Both endpoints must be committed or created earlier in this scope.
    /// Self-loops are allowed.
    pub fn create_relationship(
        &mut self,
        start: Node,
        end: Node,
        rel_type: &str,
        properties: &Properties,
    ) -> Result<Relationship> {
        if rel_type.is_empty() {
            return Err(GraphError::InvalidArgument("relationship type must not be empty".to_string()));
        }
        keys::check_component("relationship type", rel_type)?;
        for node in [start, end] {
            if !self.node_visible(node.id())? {
                return Err(GraphError::NodeNotFound(node.id()));
            }
        }

        let id = RelationshipId(self.db.generate_id()?);
        let record = RelationshipRecord {
            start: start.id(),
            end: end.id(),
            rel_type: rel_type.to_string(),
            properties: properties.clone(),
        };
        self.push(Space::Relationships, keys::relationship_key(id), serialize(&record)?);
        self.push(
            Space::Adjacency,
            keys::adjacency_key(start.id(), rel_type, id),
            end.id().0.to_be_bytes().to_vec(),
        );

        Ok(Relationship {
            id,
            start: start.id(),
            end: end.id(),
            rel_type: record.rel_type,
        })
    }

    /// Create a new index
    ///
    /// Fails with [`GraphError::IndexAlreadyExists`] if an index with this
    /// name is committed or was created earlier in this scope.
    pub fn create_index(&mut self, name: &str) -> Result<Index> {
        if name.is_empty() {
            return Err(GraphError::InvalidArgument("index name must not be empty".to_string()));
        }
        keys::check_component("index name", name)?;
        if self.created_indexes.contains(name) || self.db.index_exists(name)? {
            return Err(GraphError::IndexAlreadyExists(name.to_string()));
        }

        let meta = IndexMeta {
            name: name.to_string(),
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        self.push(Space::IndexCatalog, name.as_bytes(), serialize(&meta)?);
        self.created_indexes.insert(name.to_string());
        debug!("Created index {}", name);
        Ok(Index::new(name))
    }

    /// Look up an index by name, including indexes created in this scope
    pub fn get_index(&self, name: &str) -> Result<Index> {
        if self.created_indexes.contains(name) {
            return Ok(Index::new(name));
        }
        self.db.index(name)
    }

    /// Add `node` under `(field, key)` in `index`
    pub fn index_put(&mut self, index: &Index, field: &str, key: &str, node: Node) -> Result<()> {
        keys::check_component("index field", field)?;
        keys::check_component("index key", key)?;
        self.push(
            Space::IndexEntries,
            keys::index_entry_key(index.name(), field, key, node.id()),
            Vec::new(),
        );
        Ok(())
    }

    /// Apply all buffered writes atomically
    pub fn commit(mut self) -> Result<()> {
        self.finished = true;
        let writes = std::mem::take(&mut self.writes);

        let result: TransactionResult<()> = self.db.trees().transaction(
            |(nodes, relationships, adjacency, catalog, entries)| {
                for write in &writes {
                    let tree = match write.space {
                        Space::Nodes => nodes,
                        Space::Relationships => relationships,
                        Space::Adjacency => adjacency,
                        Space::IndexCatalog => catalog,
                        Space::IndexEntries => entries,
                    };
                    tree.insert(write.key.as_slice(), write.value.as_slice())?;
                }
                Ok(())
            },
        );

        match result {
            Ok(()) => {
                debug!("Committed transaction with {} writes", writes.len());
                Ok(())
            }
            Err(TransactionError::Storage(e)) => Err(GraphError::Storage(e)),
            Err(TransactionError::Abort(())) => Err(GraphError::TransactionAborted(format!(
                "commit of {} writes aborted",
                writes.len()
            ))),
        }
    }

    /// Discard all buffered writes
    pub fn rollback(mut self) {
        self.finished = true;
        debug!("Rolled back transaction with {} writes", self.writes.len());
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            debug!("Dropping uncommitted transaction, discarding {} writes", self.writes.len());
        }
    }
}
