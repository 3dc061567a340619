//! graphbench: latency and throughput of basic graph database operations
//!
//! This crate provides a small embedded graph store on top of sled
//! and a benchmark harness timing transactions, node and relationship
//! creation, indexing, index lookups and traversals against it.

pub mod bench;
pub mod core;
pub mod storage;

pub use bench::{BenchmarkKind, BenchmarkResult, Suite, SuiteConfig};
pub use crate::core::errors::{GraphError, Result};
pub use crate::core::model::{Index, Node, NodeId, Relationship, RelationshipId};
pub use crate::core::value::{Properties, Value};
pub use storage::{GraphDb, StoreConfig, Transaction};
