//! Embedded graph store built on sled
//!
//! Every entity kind lives in its own tree. Reads go straight to the
//! trees and therefore only see committed state; all writes are
//! buffered in a [`Transaction`] and applied atomically on commit.

use std::path::{Path as StdPath, PathBuf};

use bincode::deserialize;
use log::{debug, info};
use sled::{Db, Tree};

use crate::core::errors::{GraphError, Result};
use crate::core::model::{Index, IndexMeta, Node, NodeId, Relationship, RelationshipId};
use crate::core::value::Properties;
use crate::storage::config::StoreConfig;
use crate::storage::keys;
use crate::storage::transaction::Transaction;

const NODES_TREE: &str = "nodes";
const RELATIONSHIPS_TREE: &str = "relationships";
const ADJACENCY_TREE: &str = "adjacency";
const INDEX_CATALOG_TREE: &str = "index_catalog";
const INDEX_ENTRIES_TREE: &str = "index_entries";

/// Stored form of a relationship
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub(crate) struct RelationshipRecord {
    pub start: NodeId,
    pub end: NodeId,
    pub rel_type: String,
    pub properties: Properties,
}

/// Handle to an open graph database
pub struct GraphDb {
    db: Db,
    path: Option<PathBuf>,
    pub(crate) nodes: Tree,
    pub(crate) relationships: Tree,
    pub(crate) adjacency: Tree,
    pub(crate) index_catalog: Tree,
    pub(crate) index_entries: Tree,
}

impl GraphDb {
    /// Open (or create) a graph database at the given path
    pub fn open<P: AsRef<StdPath>>(path: P) -> Result<Self> {
        Self::open_with(&StoreConfig::at(path.as_ref()))
    }

    /// Open a graph database with explicit store tuning
    pub fn open_with(config: &StoreConfig) -> Result<Self> {
        let db = config.to_sled().open()?;
        let path = (!config.temporary).then(|| config.path.clone());

        let store = GraphDb {
            nodes: db.open_tree(NODES_TREE)?,
            relationships: db.open_tree(RELATIONSHIPS_TREE)?,
            adjacency: db.open_tree(ADJACENCY_TREE)?,
            index_catalog: db.open_tree(INDEX_CATALOG_TREE)?,
            index_entries: db.open_tree(INDEX_ENTRIES_TREE)?,
            db,
            path,
        };

        info!(
            "Opened graph database at {} ({} nodes, {} relationships)",
            store.location(),
            store.node_count(),
            store.relationship_count()
        );
        Ok(store)
    }

    /// Flush everything to disk and release the database
    pub fn close(self) -> Result<()> {
        let flushed = self.db.flush()?;
        info!("Closed graph database at {} ({} bytes flushed)", self.location(), flushed);
        Ok(())
    }

    /// Begin a new transaction scope
    pub fn begin(&self) -> Transaction<'_> {
        Transaction::new(self)
    }

    /// Run `f` inside a transaction, committing on success
    ///
    /// An error returned by `f` rolls the scope back and is returned.
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T>,
    {
        let mut tx = self.begin();
        match f(&mut tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                tx.rollback();
                Err(e)
            }
        }
    }

    fn location(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => "<temporary>".to_string(),
        }
    }

    pub(crate) fn generate_id(&self) -> Result<u64> {
        Ok(self.db.generate_id()?)
    }

    /// Number of committed nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of committed relationships
    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    /// Check whether a committed node exists
    pub fn contains_node(&self, id: NodeId) -> Result<bool> {
        Ok(self.nodes.contains_key(keys::node_key(id))?)
    }

    /// Properties of a committed node
    pub fn node_properties(&self, node: Node) -> Result<Properties> {
        let bytes = self
            .nodes
            .get(keys::node_key(node.id()))?
            .ok_or(GraphError::NodeNotFound(node.id()))?;
        Ok(deserialize(&bytes)?)
    }

    /// Properties of a committed relationship, `None` if it does not exist
    pub fn relationship_properties(&self, id: RelationshipId) -> Result<Option<Properties>> {
        match self.relationships.get(keys::relationship_key(id))? {
            Some(bytes) => {
                let record: RelationshipRecord = deserialize(&bytes)?;
                Ok(Some(record.properties))
            }
            None => Ok(None),
        }
    }

    /// Outgoing relationships of `node` with the given type, in creation order
    ///
    /// The iterator is lazy; taking only the first element reads a single entry.
    pub fn outgoing_relationships(&self, node: Node, rel_type: &str) -> Result<Relationships> {
        keys::check_component("relationship type", rel_type)?;
        Ok(Relationships {
            start: node.id(),
            rel_type: rel_type.to_string(),
            inner: self.adjacency.scan_prefix(keys::adjacency_prefix(node.id(), rel_type)),
        })
    }

    /// Check whether an index has been committed
    pub fn index_exists(&self, name: &str) -> Result<bool> {
        Ok(self.index_catalog.contains_key(name.as_bytes())?)
    }

    /// Look up a committed index by name
    pub fn index(&self, name: &str) -> Result<Index> {
        match self.index_catalog.get(name.as_bytes())? {
            Some(bytes) => {
                let meta: IndexMeta = deserialize(&bytes)?;
                Ok(Index::new(meta.name))
            }
            None => Err(GraphError::IndexNotFound(name.to_string())),
        }
    }

    /// Nodes stored under `(field, key)` in `index`
    pub fn index_get(&self, index: &Index, field: &str, key: &str) -> Result<IndexHits> {
        keys::check_component("index field", field)?;
        keys::check_component("index key", key)?;
        Ok(IndexHits {
            inner: self
                .index_entries
                .scan_prefix(keys::index_entry_prefix(index.name(), field, key)),
        })
    }

    pub(crate) fn trees(&self) -> (&Tree, &Tree, &Tree, &Tree, &Tree) {
        (
            &self.nodes,
            &self.relationships,
            &self.adjacency,
            &self.index_catalog,
            &self.index_entries,
        )
    }
}

impl Drop for GraphDb {
    fn drop(&mut self) {
        debug!("Releasing graph database handle for {}", self.location());
    }
}

/// Lazy sequence of outgoing relationships
pub struct Relationships {
    start: NodeId,
    rel_type: String,
    inner: sled::Iter,
}

impl Iterator for Relationships {
    type Item = Result<Relationship>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next()?;
        Some(item.map_err(GraphError::from).and_then(|(key, value)| {
            Ok(Relationship {
                id: keys::relationship_id_from_adjacency(&key)?,
                start: self.start,
                end: NodeId(keys::decode_id(&value)?),
                rel_type: self.rel_type.clone(),
            })
        }))
    }
}

/// Lazy sequence of nodes found in an index
pub struct IndexHits {
    inner: sled::Iter,
}

impl Iterator for IndexHits {
    type Item = Result<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next()?;
        Some(
            item.map_err(GraphError::from)
                .and_then(|(key, _)| keys::node_id_from_index_entry(&key).map(Node::new)),
        )
    }
}
