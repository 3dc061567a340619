//! Report formatting
//!
//! Turns benchmark results into text. Formatters are pure: the suite
//! decides where the strings go.

use chrono::{DateTime, Utc};
use colored::*;
use prettytable::{Cell, Row, Table};
use serde_json::json;
use uuid::Uuid;

use crate::bench::result::{BenchmarkKind, BenchmarkResult};
use crate::core::errors::{GraphError, Result};

/// Identity of one suite run
#[derive(Debug, Clone)]
pub struct RunInfo {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
}

impl RunInfo {
    pub fn new() -> Self {
        RunInfo {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
        }
    }
}

impl Default for RunInfo {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait implemented by every output format
pub trait Formatter {
    /// Text printed before the first benchmark
    fn format_header(&self, run: &RunInfo) -> Option<String>;

    /// Text printed as soon as one benchmark finishes
    fn format_result(&self, run: &RunInfo, result: &BenchmarkResult) -> Result<Option<String>>;

    /// Text printed after the last benchmark
    fn format_summary(&self, run: &RunInfo, results: &[BenchmarkResult]) -> Result<Option<String>>;
}

/// Available output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Table,
}

impl ReportFormat {
    /// Build the formatter; `header` only affects text output
    pub fn formatter(self, colored: bool, header: bool) -> Box<dyn Formatter> {
        match self {
            ReportFormat::Text => Box::new(TextFormatter { colored, header }),
            ReportFormat::Json => Box::new(JsonFormatter),
            ReportFormat::Table => Box::new(TableFormatter),
        }
    }
}

/// The fixed-width report line for one result
pub fn format_line(result: &BenchmarkResult) -> String {
    let msec = result.millis_per_item();
    let rate = result.items_per_second();
    let reps = result.repetitions;
    let n = result.items;
    match result.kind {
        BenchmarkKind::Transaction => format!(
            "Transaction costs:         {:.3} msec/trans      {:.1} trans/sec    ({} repetitions).",
            msec, rate, reps
        ),
        BenchmarkKind::NodeCreation => format!(
            "Node creation costs:       {:.3} msec/node,      {:.1} nodes/sec ({} repetitions, {} nodes)",
            msec, rate, reps, n
        ),
        BenchmarkKind::RelationCreation => format!(
            "Relation creation costs:   {:.3} msec/relation,  {:.1} rels/sec  ({} repetitions, {} relations)",
            msec, rate, reps, n
        ),
        BenchmarkKind::Traversal => format!(
            "Traversal costs:           {:.3} msec/node,      {:.1} nodes/sec ({} repetitions, {} traversals on {} nodes)",
            msec,
            rate,
            reps,
            n,
            result.graph_nodes.unwrap_or(0)
        ),
        BenchmarkKind::Indexing => format!(
            "Node indexing costs:       {:.3} msec/node,      {:.1} nodes/sec ({} repetitions, {} nodes)",
            msec, rate, reps, n
        ),
        BenchmarkKind::Lookup => format!(
            "Lookup node costs:         {:.3} msec/node,      {:.1} nodes/sec ({} repetitions, {} nodes)",
            msec, rate, reps, n
        ),
    }
}

/// Plain text, one line per benchmark
///
/// The run header is off by default so the output is only the
/// fixed-width result lines.
pub struct TextFormatter {
    colored: bool,
    header: bool,
}

impl TextFormatter {
    pub fn new() -> Self {
        TextFormatter {
            colored: true,
            header: false,
        }
    }

    pub fn without_colors() -> Self {
        TextFormatter {
            colored: false,
            header: false,
        }
    }

    /// Also print a title line naming the run
    pub fn with_header(mut self) -> Self {
        self.header = true;
        self
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for TextFormatter {
    fn format_header(&self, run: &RunInfo) -> Option<String> {
        if !self.header {
            return None;
        }
        let title = format!(
            "Graph benchmark {} ({})",
            run.run_id,
            run.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        if self.colored {
            Some(format!("{}", title.as_str().bold()))
        } else {
            Some(title)
        }
    }

    fn format_result(&self, _run: &RunInfo, result: &BenchmarkResult) -> Result<Option<String>> {
        Ok(Some(format_line(result)))
    }

    fn format_summary(&self, _run: &RunInfo, _results: &[BenchmarkResult]) -> Result<Option<String>> {
        Ok(None)
    }
}

/// One JSON object per result, one per line
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_header(&self, _run: &RunInfo) -> Option<String> {
        None
    }

    fn format_result(&self, run: &RunInfo, result: &BenchmarkResult) -> Result<Option<String>> {
        let value = json!({
            "run_id": run.run_id.to_string(),
            "started_at": run.started_at.to_rfc3339(),
            "benchmark": result,
            "msec_per_item": result.millis_per_item(),
            "items_per_sec": result.items_per_second(),
        });

        serde_json::to_string(&value)
            .map(Some)
            .map_err(|e| GraphError::InvalidState(format!("Failed to encode result: {}", e)))
    }

    fn format_summary(&self, _run: &RunInfo, _results: &[BenchmarkResult]) -> Result<Option<String>> {
        Ok(None)
    }
}

/// A single table printed once every benchmark has run
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_header(&self, _run: &RunInfo) -> Option<String> {
        None
    }

    fn format_result(&self, _run: &RunInfo, _result: &BenchmarkResult) -> Result<Option<String>> {
        Ok(None)
    }

    fn format_summary(&self, run: &RunInfo, results: &[BenchmarkResult]) -> Result<Option<String>> {
        let mut table = Table::new();
        table.set_titles(Row::new(vec![
            Cell::new("Benchmark"),
            Cell::new("msec/item"),
            Cell::new("items/sec"),
            Cell::new("Repetitions"),
            Cell::new("Items"),
            Cell::new("Total (s)"),
        ]));

        for result in results {
            table.add_row(Row::new(vec![
                Cell::new(result.kind.name()),
                Cell::new(&format!("{:.3}", result.millis_per_item())),
                Cell::new(&format!("{:.1}", result.items_per_second())),
                Cell::new(&result.repetitions.to_string()),
                Cell::new(&result.items.to_string()),
                Cell::new(&format!("{:.3}", result.total.as_secs_f64())),
            ]));
        }

        Ok(Some(format!("Run {}\n{}", run.run_id, table)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::runner::Measurement;
    use std::time::Duration;

    fn result(kind: BenchmarkKind, unit_cost: f64, repetitions: usize, items: usize) -> BenchmarkResult {
        BenchmarkResult::new(
            kind,
            Measurement {
                total: Duration::from_secs_f64(unit_cost * (repetitions * items) as f64),
                repetitions,
                items,
                unit_cost,
            },
        )
    }

    #[test]
    fn test_node_line_for_two_millis() {
        let line = format_line(&result(BenchmarkKind::NodeCreation, 0.002, 1, 1000));
        assert!(line.contains("2.000 msec/node"), "{}", line);
        assert!(line.contains("500.0 nodes/sec"), "{}", line);
        assert!(line.ends_with("(1 repetitions, 1000 nodes)"), "{}", line);
    }

    #[test]
    fn test_transaction_line() {
        let line = format_line(&result(BenchmarkKind::Transaction, 0.0005, 10, 1));
        assert_eq!(
            line,
            "Transaction costs:         0.500 msec/trans      2000.0 trans/sec    (10 repetitions)."
        );
    }

    #[test]
    fn test_traversal_line_mentions_graph_size() {
        let r = result(BenchmarkKind::Traversal, 0.001, 10, 1000).with_graph_nodes(50);
        let line = format_line(&r);
        assert!(line.ends_with("(10 repetitions, 1000 traversals on 50 nodes)"), "{}", line);
    }

    #[test]
    fn test_labels_align() {
        let lines: Vec<String> = BenchmarkKind::ALL
            .iter()
            .map(|kind| format_line(&result(*kind, 0.001, 1, 1).with_graph_nodes(1)))
            .collect();
        for line in &lines {
            assert_eq!(line.find("1.000 msec"), Some(27), "{}", line);
        }
    }

    #[test]
    fn test_zero_cost_prints_infinite_rate() {
        let line = format_line(&result(BenchmarkKind::Lookup, 0.0, 1, 1));
        assert!(line.contains("inf nodes/sec"), "{}", line);
    }

    #[test]
    fn test_json_result_is_one_line() {
        let run = RunInfo::new();
        let text = JsonFormatter
            .format_result(&run, &result(BenchmarkKind::Indexing, 0.001, 2, 3))
            .unwrap()
            .unwrap();
        assert!(!text.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["benchmark"]["kind"], "indexing");
        assert_eq!(value["benchmark"]["repetitions"], 2);
        assert_eq!(value["run_id"], run.run_id.to_string());
    }

    #[test]
    fn test_table_only_in_summary() {
        let run = RunInfo::new();
        let results = vec![
            result(BenchmarkKind::Transaction, 0.001, 1, 1),
            result(BenchmarkKind::Lookup, 0.002, 1, 1),
        ];
        let formatter = TableFormatter;
        assert!(formatter.format_result(&run, &results[0]).unwrap().is_none());

        let table = formatter.format_summary(&run, &results).unwrap().unwrap();
        assert!(table.contains("transaction"));
        assert!(table.contains("lookup"));
    }

    #[test]
    fn test_no_header_by_default() {
        let run = RunInfo::new();
        assert!(TextFormatter::new().format_header(&run).is_none());
        assert!(TextFormatter::without_colors().format_header(&run).is_none());
        assert!(ReportFormat::Text.formatter(false, false).format_header(&run).is_none());
    }

    #[test]
    fn test_plain_header_has_run_id() {
        let run = RunInfo::new();
        let header = TextFormatter::without_colors().with_header().format_header(&run).unwrap();
        assert!(header.contains(&run.run_id.to_string()));
        assert!(header.starts_with("Graph benchmark "));

        let from_format = ReportFormat::Text.formatter(false, true).format_header(&run);
        assert_eq!(from_format, Some(header));
    }
}
