//! Repetition runner
//!
//! Times an operation run back-to-back a fixed number of times and
//! derives the mean cost of one item. There is no warm-up and no
//! outlier trimming: the unit cost is the total elapsed time divided
//! by repetitions and by items per repetition.

use std::time::Duration;

use log::debug;

use crate::bench::clock::{Clock, MonotonicClock};
use crate::core::errors::{GraphError, Result};

/// Outcome of a timed run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Total elapsed time over all repetitions
    pub total: Duration,
    pub repetitions: usize,
    /// Items processed by one repetition
    pub items: usize,
    /// Seconds per item
    pub unit_cost: f64,
}

/// Runs operations repeatedly against a clock
pub struct Runner<C: Clock = MonotonicClock> {
    clock: C,
}

impl Runner<MonotonicClock> {
    /// A runner timing with the system's monotonic clock
    pub fn monotonic() -> Self {
        Runner::new(MonotonicClock::new())
    }
}

impl<C: Clock> Runner<C> {
    pub fn new(clock: C) -> Self {
        Runner { clock }
    }

    /// Run `op` `repetitions` times and return the total elapsed time
    ///
    /// The first error returned by `op` aborts the run.
    pub fn time<F>(&self, repetitions: usize, mut op: F) -> Result<Duration>
    where
        F: FnMut() -> Result<()>,
    {
        let start = self.clock.now();
        for _ in 0..repetitions {
            op()?;
        }
        let end = self.clock.now();

        // A misbehaving clock saturates to zero rather than going negative
        Ok(end.saturating_sub(start))
    }

    /// Time `op` and derive the cost of a single item
    pub fn measure<F>(&self, repetitions: usize, items: usize, op: F) -> Result<Measurement>
    where
        F: FnMut() -> Result<()>,
    {
        if repetitions == 0 {
            return Err(GraphError::InvalidArgument("repetitions must be at least 1".to_string()));
        }
        if items == 0 {
            return Err(GraphError::InvalidArgument("item count must be at least 1".to_string()));
        }

        let total = self.time(repetitions, op)?;
        let unit_cost = total.as_secs_f64() / repetitions as f64 / items as f64;
        debug!(
            "Measured {} repetitions of {} items in {:?} ({:.9} s/item)",
            repetitions, items, total, unit_cost
        );

        Ok(Measurement {
            total,
            repetitions,
            items,
            unit_cost,
        })
    }
}
