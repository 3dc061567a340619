use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::bench::runner::Measurement;

/// The measured operations, in suite order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkKind {
    Transaction,
    NodeCreation,
    RelationCreation,
    Traversal,
    Indexing,
    Lookup,
}

impl BenchmarkKind {
    /// Every benchmark in the order the suite runs them
    pub const ALL: [BenchmarkKind; 6] = [
        BenchmarkKind::Transaction,
        BenchmarkKind::NodeCreation,
        BenchmarkKind::RelationCreation,
        BenchmarkKind::Traversal,
        BenchmarkKind::Indexing,
        BenchmarkKind::Lookup,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BenchmarkKind::Transaction => "transaction",
            BenchmarkKind::NodeCreation => "node_creation",
            BenchmarkKind::RelationCreation => "relation_creation",
            BenchmarkKind::Traversal => "traversal",
            BenchmarkKind::Indexing => "indexing",
            BenchmarkKind::Lookup => "lookup",
        }
    }
}

impl fmt::Display for BenchmarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A benchmark result for a single operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkResult {
    pub kind: BenchmarkKind,
    /// Seconds per item
    pub unit_cost: f64,
    pub repetitions: usize,
    /// Items per repetition
    pub items: usize,
    #[serde(with = "duration_secs")]
    pub total: Duration,
    /// Size of the fixture graph, for traversal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_nodes: Option<usize>,
}

impl BenchmarkResult {
    pub fn new(kind: BenchmarkKind, measurement: Measurement) -> Self {
        BenchmarkResult {
            kind,
            unit_cost: measurement.unit_cost,
            repetitions: measurement.repetitions,
            items: measurement.items,
            total: measurement.total,
            graph_nodes: None,
        }
    }

    pub fn with_graph_nodes(mut self, nodes: usize) -> Self {
        self.graph_nodes = Some(nodes);
        self
    }

    /// Milliseconds per item
    pub fn millis_per_item(&self) -> f64 {
        1000.0 * self.unit_cost
    }

    /// Items per second
    pub fn items_per_second(&self) -> f64 {
        1.0 / self.unit_cost
    }
}

mod duration_secs {
    use std::time::Duration;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }
}
