pub mod config;
pub mod graph;
pub mod keys;
pub mod transaction;

pub use config::StoreConfig;
pub use graph::{GraphDb, IndexHits, Relationships};
pub use transaction::Transaction;
