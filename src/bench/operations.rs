//! Timed operations
//!
//! Each function is one unit of work whose wall-clock cost the runner
//! measures. They take the database handle explicitly and return
//! nothing the timer uses.

use crate::bench::fixtures::{open_or_create_index, INDEX_FIELD, REL_TYPE};
use crate::core::errors::Result;
use crate::core::model::{Index, Node};
use crate::core::value::Properties;
use crate::storage::GraphDb;

/// How the traversal benchmark moves through the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalMode {
    /// Every step takes the first outgoing edge of the start node, so the
    /// hop target is the same after the first step
    #[default]
    RepeatedHop,
    /// Every step moves to the target of the current node's first edge
    Walk,
}

/// Open and immediately close an empty transaction scope
pub fn empty_transaction(db: &GraphDb) -> Result<()> {
    db.begin().commit()
}

/// Create `count` nodes carrying `properties` in one scope
pub fn create_nodes(db: &GraphDb, count: usize, properties: &Properties) -> Result<()> {
    db.transaction(|tx| {
        for _ in 0..count {
            tx.create_node(properties)?;
        }
        Ok(())
    })
}

/// Create two anchor nodes and `count` relationships between them in one scope
pub fn create_relations(db: &GraphDb, count: usize, properties: &Properties) -> Result<()> {
    db.transaction(|tx| {
        let source = tx.create_node(&Properties::new())?;
        let target = tx.create_node(&Properties::new())?;
        for _ in 0..count {
            tx.create_relationship(source, target, REL_TYPE, properties)?;
        }
        Ok(())
    })
}

/// Index one shared node under keys `"0".."count-1"` of `index_name`
pub fn index_nodes(db: &GraphDb, index_name: &str, count: usize) -> Result<()> {
    db.transaction(|tx| {
        let index = open_or_create_index(tx, index_name)?;
        let node = tx.create_node(&Properties::new())?;
        for i in 0..count {
            tx.index_put(&index, INDEX_FIELD, &i.to_string(), node)?;
        }
        Ok(())
    })
}

/// Fetch keys `"0".."count-1"` from `index`, taking only the first hit of each
///
/// Returns how many keys had at least one hit.
pub fn lookup_nodes(db: &GraphDb, index: &Index, count: usize) -> Result<usize> {
    let tx = db.begin();
    let mut found = 0;
    for i in 0..count {
        if let Some(hit) = db.index_get(index, INDEX_FIELD, &i.to_string())?.next() {
            hit?;
            found += 1;
        }
    }
    tx.commit()?;
    Ok(found)
}

/// Take `steps` "first outgoing edge" hops starting at `start`
///
/// Returns the node reached by the last hop. A node without outgoing
/// edges leaves the position unchanged.
pub fn traverse(db: &GraphDb, start: Node, steps: usize, mode: TraversalMode) -> Result<Node> {
    let mut position = start;
    for _ in 0..steps {
        let from = match mode {
            TraversalMode::RepeatedHop => start,
            TraversalMode::Walk => position,
        };
        if let Some(rel) = db.outgoing_relationships(from, REL_TYPE)?.next() {
            position = rel?.end_node();
        }
    }
    Ok(position)
}
