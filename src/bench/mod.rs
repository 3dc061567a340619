//! Benchmarking harness
//!
//! Fixtures, timed operations, the repetition runner, report
//! formatting and the suite that sequences them.

pub mod clock;
pub mod fixtures;
pub mod operations;
pub mod report;
pub mod result;
pub mod runner;
pub mod suite;

pub use clock::{Clock, MonotonicClock, ScriptedClock};
pub use operations::TraversalMode;
pub use report::{Formatter, ReportFormat, RunInfo};
pub use result::{BenchmarkKind, BenchmarkResult};
pub use runner::{Measurement, Runner};
pub use suite::{Phase, Suite, SuiteConfig};
