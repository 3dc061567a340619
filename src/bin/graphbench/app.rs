use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, ValueEnum};
use env_logger::Env;

use graphbench::bench::{ReportFormat, Suite, SuiteConfig, TraversalMode};
use graphbench::StoreConfig;

/// Available output formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Fixed-width text lines
    Text,

    /// One JSON object per benchmark
    Json,

    /// Summary table
    Table,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ReportFormat::Text,
            OutputFormat::Json => ReportFormat::Json,
            OutputFormat::Table => ReportFormat::Table,
        }
    }
}

#[derive(Parser)]
#[command(name = "graphbench")]
#[command(about = "Measure the cost of basic graph database operations", long_about = None)]
pub struct Cli {
    /// Verbosity level; any level also prints the run header
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Scratch database directory, wiped on every run
    #[arg(long, default_value = "benchmark_db")]
    db_path: PathBuf,

    /// Back-to-back runs of each benchmark
    #[arg(short, long, default_value_t = 10)]
    repetitions: usize,

    /// Items per run (nodes, relationships, keys, hops)
    #[arg(short, long, default_value_t = 1000)]
    count: usize,

    /// Nodes in the random traversal graph
    #[arg(long, default_value_t = 50)]
    graph_nodes: usize,

    /// Seed for the traversal graph
    #[arg(long)]
    seed: Option<u64>,

    /// Follow edges during traversal instead of repeating the first hop
    #[arg(long)]
    walk: bool,

    /// Output format (text, json, table)
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    fn suite_config(&self) -> SuiteConfig {
        SuiteConfig {
            store: StoreConfig::at(&self.db_path),
            repetitions: self.repetitions,
            count: self.count,
            graph_nodes: self.graph_nodes,
            seed: self.seed,
            traversal: if self.walk {
                TraversalMode::Walk
            } else {
                TraversalMode::RepeatedHop
            },
            format: self.format.into(),
            colored: !self.no_color,
            header: self.verbose > 0,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}

/// Initialize env_logger; `RUST_LOG` overrides the `-v` level
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();
}

/// Run the whole suite and print its results to stdout
pub fn run(cli: Cli) -> Result<()> {
    let config = cli.suite_config();
    let path = config.store.path.clone();
    let mut suite = Suite::new(config);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let outcome = suite
        .run(&mut out)
        .with_context(|| format!("benchmark run against {} failed", path.display()));

    out.flush()?;

    outcome.map(|_| ())
}
