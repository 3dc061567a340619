//! Fixture generation
//!
//! Builds the graph state a timed operation needs. Fixtures are always
//! built outside the timed region.

use log::debug;
use rand::Rng;

use crate::core::errors::{GraphError, Result};
use crate::core::model::{Index, Node};
use crate::core::value::{Properties, Value};
use crate::storage::{GraphDb, Transaction};

/// Relationship type used by every benchmark
pub const REL_TYPE: &str = "REL";
/// Name of the benchmark index
pub const INDEX_NAME: &str = "idx";
/// Field all index entries are stored under
pub const INDEX_FIELD: &str = "k";

/// The fixed property mapping put on created nodes and relationships
pub fn benchmark_properties() -> Properties {
    let mut props = Properties::new();
    props.insert("a".to_string(), Value::List(vec![Value::String(String::new())]));
    props.insert("b".to_string(), Value::Integer(-1));
    props
}

/// Create `name`, or fall back to the existing index of that name
///
/// Only [`GraphError::IndexAlreadyExists`] triggers the fallback; any
/// other error is returned.
pub fn open_or_create_index(tx: &mut Transaction<'_>, name: &str) -> Result<Index> {
    match tx.create_index(name) {
        Ok(index) => Ok(index),
        Err(GraphError::IndexAlreadyExists(_)) => {
            debug!("Index {} already exists, reusing it", name);
            tx.get_index(name)
        }
        Err(e) => Err(e),
    }
}

/// Random graph traversed by the traversal benchmark
#[derive(Debug, Clone)]
pub struct RandomGraph {
    /// First node created, where traversals begin
    pub start: Node,
    pub node_count: usize,
    /// `node_count / 10`, truncated, so graphs under 10 nodes have no edges
    pub edges_per_node: usize,
    pub relationship_count: usize,
}

impl RandomGraph {
    /// Build `node_count` nodes, each with `node_count / 10` outgoing
    /// relationships to uniformly random targets, in one transaction
    ///
    /// Self-loops are allowed.
    pub fn build<R: Rng>(db: &GraphDb, node_count: usize, rng: &mut R) -> Result<Self> {
        if node_count == 0 {
            return Err(GraphError::InvalidArgument("graph needs at least one node".to_string()));
        }
        let edges_per_node = node_count / 10;
        let empty = Properties::new();

        let (start, relationship_count) = db.transaction(|tx| {
            let nodes = (0..node_count)
                .map(|_| tx.create_node(&empty))
                .collect::<Result<Vec<_>>>()?;

            let mut created = 0;
            for &node in &nodes {
                for _ in 0..edges_per_node {
                    let target = nodes[rng.gen_range(0..node_count)];
                    tx.create_relationship(node, target, REL_TYPE, &empty)?;
                    created += 1;
                }
            }
            Ok((nodes[0], created))
        })?;

        debug!(
            "Built random graph: {} nodes, {} relationships",
            node_count, relationship_count
        );
        Ok(RandomGraph {
            start,
            node_count,
            edges_per_node,
            relationship_count,
        })
    }
}

/// Index state required by the lookup benchmark
#[derive(Debug, Clone)]
pub struct LookupFixture {
    pub index: Index,
    pub count: usize,
}

impl LookupFixture {
    /// Make sure `index_name` holds keys `0..count`
    ///
    /// When the indexing benchmark already ran nothing is written; otherwise
    /// all keys are added, pointing at one shared node.
    pub fn prepare(db: &GraphDb, index_name: &str, count: usize) -> Result<Self> {
        if db.index_exists(index_name)? && count > 0 {
            let index = db.index(index_name)?;
            let last_key = (count - 1).to_string();
            if db.index_get(&index, INDEX_FIELD, &last_key)?.next().is_some() {
                return Ok(LookupFixture { index, count });
            }
        }

        let index = db.transaction(|tx| {
            let index = open_or_create_index(tx, index_name)?;
            let node = tx.create_node(&Properties::new())?;
            for i in 0..count {
                tx.index_put(&index, INDEX_FIELD, &i.to_string(), node)?;
            }
            Ok(index)
        })?;
        debug!("Populated index {} with {} keys", index_name, count);

        Ok(LookupFixture { index, count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoreConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn temp_db() -> GraphDb {
        GraphDb::open_with(&StoreConfig::temporary()).unwrap()
    }

    #[test]
    fn test_benchmark_properties() {
        let props = benchmark_properties();
        assert_eq!(props.len(), 2);
        assert_eq!(props["b"], Value::Integer(-1));
        assert_eq!(props["a"], Value::List(vec![Value::String(String::new())]));
    }

    #[test]
    fn test_random_graph_of_fifty_nodes() {
        let db = temp_db();
        let mut rng = StdRng::seed_from_u64(7);
        let graph = RandomGraph::build(&db, 50, &mut rng).unwrap();

        assert_eq!(graph.edges_per_node, 5);
        assert_eq!(graph.relationship_count, 250);
        assert_eq!(db.node_count(), 50);
        assert_eq!(db.relationship_count(), 250);
        assert_eq!(db.outgoing_relationships(graph.start, REL_TYPE).unwrap().count(), 5);
    }

    #[test]
    fn test_small_graph_truncates_to_no_edges() {
        let db = temp_db();
        let mut rng = StdRng::seed_from_u64(1);
        let graph = RandomGraph::build(&db, 9, &mut rng).unwrap();

        assert_eq!(graph.edges_per_node, 0);
        assert_eq!(db.relationship_count(), 0);
    }

    #[test]
    fn test_empty_graph_rejected() {
        let db = temp_db();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            RandomGraph::build(&db, 0, &mut rng),
            Err(GraphError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_open_or_create_index_twice_returns_same_index() {
        let db = temp_db();
        let first = db.transaction(|tx| open_or_create_index(tx, INDEX_NAME)).unwrap();
        let second = db.transaction(|tx| open_or_create_index(tx, INDEX_NAME)).unwrap();
        assert_eq!(first, second);

        // and within a single scope
        let mut tx = db.begin();
        let a = open_or_create_index(&mut tx, "other").unwrap();
        let b = open_or_create_index(&mut tx, "other").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_open_or_create_index_propagates_other_errors() {
        let db = temp_db();
        let mut tx = db.begin();
        assert!(matches!(
            open_or_create_index(&mut tx, "bad\0name"),
            Err(GraphError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_lookup_fixture_populates_once() {
        let db = temp_db();
        let fixture = LookupFixture::prepare(&db, INDEX_NAME, 20).unwrap();
        assert_eq!(fixture.index.name(), INDEX_NAME);
        let nodes_after_first = db.node_count();

        LookupFixture::prepare(&db, INDEX_NAME, 20).unwrap();
        assert_eq!(db.node_count(), nodes_after_first);

        for i in 0..20 {
            let key = i.to_string();
            assert!(db.index_get(&fixture.index, INDEX_FIELD, &key).unwrap().next().is_some());
        }
    }

    #[test]
    fn test_lookup_fixture_fills_partial_index() {
        let db = temp_db();
        LookupFixture::prepare(&db, INDEX_NAME, 5).unwrap();
        assert!(db.index_exists(INDEX_NAME).unwrap());
        let nodes_before = db.node_count();

        // the index exists but key "19" is missing, so every key is written again
        let fixture = LookupFixture::prepare(&db, INDEX_NAME, 20).unwrap();
        assert_eq!(fixture.count, 20);
        assert_eq!(db.node_count(), nodes_before + 1);
        for i in 0..20 {
            let key = i.to_string();
            assert!(db.index_get(&fixture.index, INDEX_FIELD, &key).unwrap().next().is_some());
        }
        assert_eq!(db.index_get(&fixture.index, INDEX_FIELD, "0").unwrap().count(), 2);
    }
}
