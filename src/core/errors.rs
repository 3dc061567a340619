//! Error types for graphbench
//!
//! This module defines the errors that can occur while running
//! the embedded graph store or the benchmark suite on top of it.

use thiserror::Error;
use crate::core::model::NodeId;

/// Errors that can occur during store and benchmark operations
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Storage error: {0}")]
    Storage(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Index already exists: {0}")]
    IndexAlreadyExists(String),

    #[error("Index not found: {0}")]
    IndexNotFound(String),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Transaction aborted: {0}")]
    TransactionAborted(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Result type for store and benchmark operations
pub type Result<T> = std::result::Result<T, GraphError>;
