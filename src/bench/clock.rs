use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Source of monotonic time readings
pub trait Clock {
    /// Time elapsed since the clock's origin
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock replaying a fixed sequence of readings
///
/// Once the script is exhausted the last reading repeats, so time stops.
#[derive(Debug, Default)]
pub struct ScriptedClock {
    readings: RefCell<VecDeque<Duration>>,
    last: RefCell<Duration>,
}

impl ScriptedClock {
    pub fn new<I: IntoIterator<Item = Duration>>(readings: I) -> Self {
        ScriptedClock {
            readings: RefCell::new(readings.into_iter().collect()),
            last: RefCell::new(Duration::ZERO),
        }
    }

    /// Readings in seconds, for compact test setup
    pub fn from_secs(readings: &[f64]) -> Self {
        Self::new(readings.iter().map(|s| Duration::from_secs_f64(*s)))
    }

    /// Readings not consumed yet
    pub fn remaining(&self) -> usize {
        self.readings.borrow().len()
    }
}

impl Clock for ScriptedClock {
    fn now(&self) -> Duration {
        let mut last = self.last.borrow_mut();
        if let Some(next) = self.readings.borrow_mut().pop_front() {
            *last = next;
        }
        *last
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}
