//! Key layouts for the sled trees backing the graph store
//!
//! Ids are encoded big-endian so that sled's lexicographic order
//! matches numeric order. Composite keys use a NUL byte between
//! variable-length components, which is why names, types, fields
//! and keys may not contain one.

use crate::core::errors::{GraphError, Result};
use crate::core::model::{NodeId, RelationshipId};

const SEPARATOR: u8 = 0;

/// Key of a node record: `node_id`
pub fn node_key(id: NodeId) -> [u8; 8] {
    id.0.to_be_bytes()
}

/// Key of a relationship record: `rel_id`
pub fn relationship_key(id: RelationshipId) -> [u8; 8] {
    id.0.to_be_bytes()
}

/// Prefix of all outgoing edges of a type: `start_id | rel_type | 0`
pub fn adjacency_prefix(start: NodeId, rel_type: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(8 + rel_type.len() + 1);
    key.extend_from_slice(&start.0.to_be_bytes());
    key.extend_from_slice(rel_type.as_bytes());
    key.push(SEPARATOR);
    key
}

/// Adjacency key: `start_id | rel_type | 0 | rel_id`
pub fn adjacency_key(start: NodeId, rel_type: &str, id: RelationshipId) -> Vec<u8> {
    let mut key = adjacency_prefix(start, rel_type);
    key.extend_from_slice(&id.0.to_be_bytes());
    key
}

/// Recover the relationship id from the tail of an adjacency key
pub fn relationship_id_from_adjacency(key: &[u8]) -> Result<RelationshipId> {
    trailing_u64(key).map(RelationshipId)
}

/// Prefix of all entries for one key of an index: `name | 0 | field | 0 | key | 0`
pub fn index_entry_prefix(name: &str, field: &str, key: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(name.len() + field.len() + key.len() + 3);
    for part in [name, field, key] {
        out.extend_from_slice(part.as_bytes());
        out.push(SEPARATOR);
    }
    out
}

/// Index entry key: `name | 0 | field | 0 | key | 0 | node_id`
pub fn index_entry_key(name: &str, field: &str, key: &str, node: NodeId) -> Vec<u8> {
    let mut out = index_entry_prefix(name, field, key);
    out.extend_from_slice(&node.0.to_be_bytes());
    out
}

/// Recover the node id from the tail of an index entry key
pub fn node_id_from_index_entry(key: &[u8]) -> Result<NodeId> {
    trailing_u64(key).map(NodeId)
}

/// Decode an 8 byte big-endian id stored as a value
pub fn decode_id(bytes: &[u8]) -> Result<u64> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| GraphError::Corrupt(format!("expected 8 byte id, found {} bytes", bytes.len())))?;
    Ok(u64::from_be_bytes(raw))
}

/// Reject components that would break the composite key layout
pub fn check_component(what: &str, value: &str) -> Result<()> {
    if value.as_bytes().contains(&SEPARATOR) {
        return Err(GraphError::InvalidArgument(format!(
            "{} must not contain a NUL byte: {:?}",
            what, value
        )));
    }
    Ok(())
}

fn trailing_u64(key: &[u8]) -> Result<u64> {
    if key.len() < 8 {
        return Err(GraphError::Corrupt(format!("key too short: {} bytes", key.len())));
    }
    decode_id(&key[key.len() - 8..])
}
