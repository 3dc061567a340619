use graphbench::bench::{BenchmarkKind, Phase, ReportFormat, ScriptedClock, Suite, SuiteConfig};
use graphbench::{GraphDb, GraphError, StoreConfig};
use tempfile::tempdir;

fn small_config(dir: &std::path::Path) -> SuiteConfig {
    SuiteConfig {
        store: StoreConfig::at(dir.join("benchmark_db")),
        repetitions: 2,
        count: 50,
        graph_nodes: 50,
        seed: Some(7),
        colored: false,
        ..SuiteConfig::default()
    }
}

#[test]
fn full_run_reports_every_benchmark_in_order() {
    let dir = tempdir().unwrap();
    let config = small_config(dir.path());
    let path = config.store.path.clone();
    let mut suite = Suite::new(config);
    let mut out = Vec::new();

    let results = suite.run(&mut out).unwrap();
    assert_eq!(suite.phase(), Phase::Closed);

    let kinds: Vec<_> = results.iter().map(|r| r.kind).collect();
    assert_eq!(kinds, BenchmarkKind::ALL.to_vec());
    for result in &results {
        assert!(result.unit_cost >= 0.0);
        assert_eq!(result.repetitions, 2);
    }
    assert_eq!(results[0].items, 1);
    assert_eq!(results[3].graph_nodes, Some(50));

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    // exactly one line per benchmark, no header
    assert_eq!(lines.len(), 6, "{}", text);
    assert!(lines[0].starts_with("Transaction costs:"));
    assert!(lines[1].starts_with("Node creation costs:"));
    assert!(lines[2].starts_with("Relation creation costs:"));
    assert!(lines[3].starts_with("Traversal costs:"));
    assert!(lines[3].ends_with("(2 repetitions, 50 traversals on 50 nodes)"));
    assert!(lines[4].starts_with("Node indexing costs:"));
    assert!(lines[5].starts_with("Lookup node costs:"));
    assert_eq!(suite.results(), results.as_slice());

    // the handle was released and everything committed is on disk
    let db = GraphDb::open(&path).unwrap();
    // 2 runs x 50 nodes, 2 runs x 2 anchors, 50 graph nodes, 2 shared index nodes
    assert_eq!(db.node_count(), 100 + 4 + 50 + 2);
    assert_eq!(db.relationship_count(), 2 * 50 + 250);
    let index = db.index("idx").unwrap();
    for i in 0..50 {
        assert!(db.index_get(&index, "k", &i.to_string()).unwrap().next().is_some());
    }
}

#[test]
fn second_run_starts_from_fresh_database() {
    let dir = tempdir().unwrap();
    for _ in 0..2 {
        let mut suite = Suite::new(small_config(dir.path()));
        suite.run(&mut Vec::new()).unwrap();
    }

    let db = GraphDb::open(dir.path().join("benchmark_db")).unwrap();
    assert_eq!(db.node_count(), 156);
}

#[test]
fn scripted_clock_drives_reported_costs() {
    let dir = tempdir().unwrap();
    let config = SuiteConfig {
        repetitions: 1,
        count: 1000,
        ..small_config(dir.path())
    };
    // start/end readings for each of the six benchmarks, 2 seconds apart
    let readings: Vec<f64> = (0..6).flat_map(|i| [i as f64 * 10.0, i as f64 * 10.0 + 2.0]).collect();
    let mut suite = Suite::with_clock(config, ScriptedClock::from_secs(&readings));
    let mut out = Vec::new();

    let results = suite.run(&mut out).unwrap();
    let nodes = &results[1];
    assert_eq!(nodes.kind, BenchmarkKind::NodeCreation);
    assert!((nodes.unit_cost - 0.002).abs() < 1e-12);

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Node creation costs:       2.000 msec/node,      500.0 nodes/sec (1 repetitions, 1000 nodes)"), "{}", text);
    assert!(text.contains("Transaction costs:         2000.000 msec/trans      0.5 trans/sec    (1 repetitions)."), "{}", text);
}

#[test]
fn json_format_emits_one_object_per_benchmark() {
    let dir = tempdir().unwrap();
    let config = SuiteConfig {
        format: ReportFormat::Json,
        ..small_config(dir.path())
    };
    let mut suite = Suite::new(config);
    let mut out = Vec::new();
    suite.run(&mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    let kinds: Vec<String> = text
        .lines()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            value["benchmark"]["kind"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["transaction", "node_creation", "relation_creation", "traversal", "indexing", "lookup"]
    );
}

#[test]
fn table_format_prints_single_summary() {
    let dir = tempdir().unwrap();
    let config = SuiteConfig {
        format: ReportFormat::Table,
        ..small_config(dir.path())
    };
    let mut suite = Suite::new(config);
    let mut out = Vec::new();
    suite.run(&mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("Run "));
    for kind in BenchmarkKind::ALL {
        assert!(text.contains(kind.name()), "{}", text);
    }
}

#[test]
fn lookup_alone_builds_its_own_index() {
    let dir = tempdir().unwrap();
    let mut suite = Suite::new(small_config(dir.path()));
    let mut out = Vec::new();

    let result = suite
        .scoped(|suite| suite.run_benchmark(BenchmarkKind::Lookup, &mut out))
        .unwrap();
    assert_eq!(result.items, 50);
    assert_eq!(suite.phase(), Phase::Closed);
}

#[test]
fn header_printed_only_when_requested() {
    let dir = tempdir().unwrap();
    let config = SuiteConfig {
        header: true,
        ..small_config(dir.path())
    };
    let mut suite = Suite::new(config);
    let mut out = Vec::new();
    suite.run(&mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 7, "{}", text);
    assert!(lines[0].starts_with("Graph benchmark "));
    assert!(lines[1].starts_with("Transaction costs:"));
}

#[test]
fn zero_repetitions_fails_and_still_closes() {
    let dir = tempdir().unwrap();
    let config = SuiteConfig {
        repetitions: 0,
        ..small_config(dir.path())
    };
    let path = config.store.path.clone();
    let mut suite = Suite::new(config);
    let mut out = Vec::new();

    let err = suite.run(&mut out).unwrap_err();
    assert!(matches!(err, GraphError::InvalidArgument(_)), "{}", err);
    assert_eq!(suite.phase(), Phase::Closed);
    assert!(suite.results().is_empty());
    assert!(out.is_empty());

    let db = GraphDb::open(&path).unwrap();
    assert_eq!(db.node_count(), 0);
}

#[test]
fn failing_benchmark_mid_run_keeps_earlier_results() {
    let dir = tempdir().unwrap();
    let config = SuiteConfig {
        graph_nodes: 0,
        ..small_config(dir.path())
    };
    let path = config.store.path.clone();
    let mut suite = Suite::new(config);
    let mut out = Vec::new();

    let err = suite.run(&mut out).unwrap_err();
    assert!(matches!(err, GraphError::InvalidArgument(_)), "{}", err);
    assert_eq!(suite.phase(), Phase::Closed);

    // traversal fails while building its graph, after three benchmarks ran
    let kinds: Vec<_> = suite.results().iter().map(|r| r.kind).collect();
    assert_eq!(kinds, BenchmarkKind::ALL[..3].to_vec());
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 3);

    // writes committed before the failure survive the close
    let db = GraphDb::open(&path).unwrap();
    assert_eq!(db.node_count(), 2 * 50 + 2 * 2);
    assert_eq!(db.relationship_count(), 2 * 50);
}
