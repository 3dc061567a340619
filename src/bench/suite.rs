//! Benchmark suite
//!
//! Sequences the benchmarks against one database handle:
//! `Unopened -> Open -> Closed`. The handle is opened once, shared by
//! every benchmark, and closed exactly once, including when a
//! benchmark fails.

use std::fs;
use std::io::{self, Write};
use std::path::Path as StdPath;

use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::bench::clock::{Clock, MonotonicClock};
use crate::bench::fixtures::{self, LookupFixture, RandomGraph, INDEX_NAME};
use crate::bench::operations::{self, TraversalMode};
use crate::bench::report::{Formatter, ReportFormat, RunInfo};
use crate::bench::result::{BenchmarkKind, BenchmarkResult};
use crate::bench::runner::Runner;
use crate::core::errors::{GraphError, Result};
use crate::storage::{GraphDb, StoreConfig};

/// Parameters of a suite run
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// Store location and tuning; the directory is wiped on open
    pub store: StoreConfig,
    /// Back-to-back runs of each timed operation
    pub repetitions: usize,
    /// Items handled by one run (nodes, relationships, keys, hops)
    pub count: usize,
    /// Size of the random traversal graph
    pub graph_nodes: usize,
    /// Seed for the traversal graph, random when `None`
    pub seed: Option<u64>,
    pub traversal: TraversalMode,
    pub format: ReportFormat,
    pub colored: bool,
    /// Print a title line naming the run before the text results
    pub header: bool,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        SuiteConfig {
            store: StoreConfig::default(),
            repetitions: 10,
            count: 1000,
            graph_nodes: 50,
            seed: None,
            traversal: TraversalMode::default(),
            format: ReportFormat::default(),
            colored: true,
            header: false,
        }
    }
}

/// Lifecycle of the suite's database handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unopened,
    Open,
    Closed,
}

/// Delete a database directory left behind by a previous run
///
/// A missing directory is fine; any other failure is returned.
pub fn remove_stale_database(path: &StdPath) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            info!("Removed stale database at {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// A benchmark suite bound to one database handle
pub struct Suite<C: Clock = MonotonicClock> {
    config: SuiteConfig,
    runner: Runner<C>,
    formatter: Box<dyn Formatter>,
    run: RunInfo,
    rng: StdRng,
    db: Option<GraphDb>,
    phase: Phase,
    results: Vec<BenchmarkResult>,
}

impl Suite<MonotonicClock> {
    pub fn new(config: SuiteConfig) -> Self {
        Suite::with_clock(config, MonotonicClock::new())
    }
}

impl<C: Clock> Suite<C> {
    /// A suite timing with `clock`
    pub fn with_clock(config: SuiteConfig, clock: C) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Suite {
            formatter: config.format.formatter(config.colored, config.header),
            runner: Runner::new(clock),
            run: RunInfo::new(),
            rng,
            db: None,
            phase: Phase::Unopened,
            results: Vec::new(),
            config,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Results measured so far, in run order
    pub fn results(&self) -> &[BenchmarkResult] {
        &self.results
    }

    /// The open database handle
    pub fn database(&self) -> Result<&GraphDb> {
        match (&self.db, self.phase) {
            (Some(db), Phase::Open) => Ok(db),
            (_, phase) => Err(GraphError::InvalidState(format!(
                "database is not open (phase {:?})",
                phase
            ))),
        }
    }

    /// Wipe any stale database directory and open a fresh handle
    pub fn open(&mut self) -> Result<()> {
        if self.phase != Phase::Unopened {
            return Err(GraphError::InvalidState(format!(
                "cannot open suite in phase {:?}",
                self.phase
            )));
        }
        if !self.config.store.temporary {
            remove_stale_database(&self.config.store.path)?;
        }

        self.db = Some(GraphDb::open_with(&self.config.store)?);
        self.phase = Phase::Open;
        info!("Benchmark run {} opened its database", self.run.run_id);
        Ok(())
    }

    /// Flush and close the database handle
    ///
    /// Legal exactly once, after a successful [`Suite::open`].
    pub fn close(&mut self) -> Result<()> {
        if self.phase != Phase::Open {
            return Err(GraphError::InvalidState(format!(
                "cannot close suite in phase {:?}",
                self.phase
            )));
        }
        self.phase = Phase::Closed;
        match self.db.take() {
            Some(db) => db.close(),
            None => Ok(()),
        }
    }

    /// Open, run `f`, and close regardless of `f`'s outcome
    ///
    /// An error from `f` wins over an error from closing.
    pub fn scoped<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        self.open()?;
        let outcome = f(self);
        let closed = self.close();

        match (outcome, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                warn!("Failed to close database after error: {}", close_err);
                Err(e)
            }
        }
    }

    /// Run every benchmark in order, writing results to `out` as they finish
    pub fn run(&mut self, out: &mut dyn Write) -> Result<Vec<BenchmarkResult>> {
        self.scoped(|suite| {
            if let Some(header) = suite.formatter.format_header(&suite.run) {
                writeln!(out, "{}", header)?;
            }
            for kind in BenchmarkKind::ALL {
                suite.run_benchmark(kind, out)?;
            }
            if let Some(summary) = suite.formatter.format_summary(&suite.run, &suite.results)? {
                writeln!(out, "{}", summary)?;
            }
            Ok(suite.results.clone())
        })
    }

    /// Build fixtures for `kind`, time it, and report the result
    pub fn run_benchmark(&mut self, kind: BenchmarkKind, out: &mut dyn Write) -> Result<BenchmarkResult> {
        let result = self.measure(kind)?;
        info!(
            "{}: {:.6} s/item over {} repetitions of {} items",
            kind, result.unit_cost, result.repetitions, result.items
        );

        if let Some(line) = self.formatter.format_result(&self.run, &result)? {
            writeln!(out, "{}", line)?;
        }
        self.results.push(result.clone());
        Ok(result)
    }

    fn measure(&mut self, kind: BenchmarkKind) -> Result<BenchmarkResult> {
        let db = match (&self.db, self.phase) {
            (Some(db), Phase::Open) => db,
            (_, phase) => {
                return Err(GraphError::InvalidState(format!(
                    "cannot run {} in phase {:?}",
                    kind, phase
                )))
            }
        };
        let runner = &self.runner;
        let repetitions = self.config.repetitions;
        let count = self.config.count;

        let result = match kind {
            BenchmarkKind::Transaction => {
                let m = runner.measure(repetitions, 1, || operations::empty_transaction(db))?;
                BenchmarkResult::new(kind, m)
            }
            BenchmarkKind::NodeCreation => {
                let props = fixtures::benchmark_properties();
                let m = runner.measure(repetitions, count, || operations::create_nodes(db, count, &props))?;
                BenchmarkResult::new(kind, m)
            }
            BenchmarkKind::RelationCreation => {
                let props = fixtures::benchmark_properties();
                let m = runner.measure(repetitions, count, || {
                    operations::create_relations(db, count, &props)
                })?;
                BenchmarkResult::new(kind, m)
            }
            BenchmarkKind::Traversal => {
                let graph = RandomGraph::build(db, self.config.graph_nodes, &mut self.rng)?;
                let mode = self.config.traversal;
                let m = runner.measure(repetitions, count, || {
                    operations::traverse(db, graph.start, count, mode).map(|_| ())
                })?;
                BenchmarkResult::new(kind, m).with_graph_nodes(graph.node_count)
            }
            BenchmarkKind::Indexing => {
                let m = runner.measure(repetitions, count, || {
                    operations::index_nodes(db, INDEX_NAME, count)
                })?;
                BenchmarkResult::new(kind, m)
            }
            BenchmarkKind::Lookup => {
                let fixture = LookupFixture::prepare(db, INDEX_NAME, count)?;
                let m = runner.measure(repetitions, count, || {
                    let found = operations::lookup_nodes(db, &fixture.index, fixture.count)?;
                    if found < fixture.count {
                        warn!("Lookup found {} of {} keys", found, fixture.count);
                    }
                    Ok(())
                })?;
                BenchmarkResult::new(kind, m)
            }
        };
        Ok(result)
    }
}

impl<C: Clock> Drop for Suite<C> {
    fn drop(&mut self) {
        if self.phase == Phase::Open {
            if let Err(e) = self.close() {
                warn!("Failed to close database on drop: {}", e);
            }
        }
    }
}
