//! Time management utilities
//!
//! Time sources feed the loop driver with monotonic seconds. [`FixedTimestep`]
//! turns sampled elapsed time into a bounded number of fixed-size update steps
//! and [`RateCounter`] produces the per-second UPS/FPS figures.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Tolerance absorbing floating-point rounding in sampled times (seconds)
pub const TIME_EPSILON: f64 = 1e-9;

/// Monotonic source of the current time in fractional seconds
pub trait TimeSource {
    /// Sample the current time
    fn now(&mut self) -> f64;
}

/// Wall clock backed by [`Instant`]
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    /// Create a clock whose zero is the moment of creation
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl TimeSource for SystemClock {
    fn now(&mut self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Externally driven clock.
///
/// Clones share the same reading, so a test can keep one handle and move the
/// other into the loop driver.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    seconds: Rc<Cell<f64>>,
}

impl ManualClock {
    /// Create a clock reading `start` seconds
    pub fn new(start: f64) -> Self {
        Self {
            seconds: Rc::new(Cell::new(start)),
        }
    }

    /// Jump to an absolute reading
    pub fn set(&self, seconds: f64) {
        self.seconds.set(seconds);
    }

    /// Move the reading forward
    pub fn advance(&self, seconds: f64) {
        self.seconds.set(self.seconds.get() + seconds);
    }

    /// Current reading without sampling
    pub fn get(&self) -> f64 {
        self.seconds.get()
    }
}

impl TimeSource for ManualClock {
    fn now(&mut self) -> f64 {
        self.seconds.get()
    }
}

/// Clock that advances by a fixed amount every time it is sampled.
///
/// The first sample reads zero. Used for simulated runs where the loop should
/// observe a steady frame time regardless of real elapsed time.
#[derive(Debug, Clone)]
pub struct SteppedClock {
    step: f64,
    samples: u64,
}

impl SteppedClock {
    /// Create a clock advancing `step` seconds per sample
    pub fn new(step: f64) -> Self {
        Self { step, samples: 0 }
    }

    /// Number of samples taken so far
    pub fn samples(&self) -> u64 {
        self.samples
    }
}

impl TimeSource for SteppedClock {
    fn now(&mut self) -> f64 {
        let reading = self.samples as f64 * self.step;
        self.samples += 1;
        reading
    }
}

/// Lag accumulator for a fixed-timestep update loop.
///
/// The step size is latched at construction; later changes to the target rate
/// need a new accumulator.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    seconds_per_step: f64,
    max_steps: u32,
    lag: f64,
    steps_taken: u32,
}

impl FixedTimestep {
    /// Create an accumulator for `target_ups` steps per second, running at most
    /// `max_steps` catch-up steps per outer iteration
    pub fn new(target_ups: u32, max_steps: u32) -> Self {
        Self {
            seconds_per_step: 1.0 / f64::from(target_ups.max(1)),
            max_steps,
            lag: 0.0,
            steps_taken: 0,
        }
    }

    /// Duration of one update step in seconds
    pub fn seconds_per_step(&self) -> f64 {
        self.seconds_per_step
    }

    /// Upper bound on steps per outer iteration
    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    /// Unconsumed simulation time in seconds
    pub fn lag(&self) -> f64 {
        self.lag
    }

    /// Steps consumed since the last [`accumulate`](Self::accumulate)
    pub fn steps_taken(&self) -> u32 {
        self.steps_taken
    }

    /// Begin an outer iteration by adding sampled elapsed time to the lag
    pub fn accumulate(&mut self, elapsed: f64) {
        self.lag += elapsed.max(0.0);
        self.steps_taken = 0;
    }

    /// Consume one step if enough lag is pending and the bound allows it
    pub fn next_step(&mut self) -> bool {
        if self.steps_taken >= self.max_steps {
            return false;
        }
        if self.lag + TIME_EPSILON < self.seconds_per_step {
            return false;
        }
        self.lag = (self.lag - self.seconds_per_step).max(0.0);
        self.steps_taken += 1;
        true
    }

    /// Close the outer iteration.
    ///
    /// When the step bound was hit with a full step or more still pending, the
    /// remaining lag is dropped. Returns the discarded amount in seconds.
    pub fn finish_iteration(&mut self) -> f64 {
        if self.steps_taken >= self.max_steps && self.lag + TIME_EPSILON >= self.seconds_per_step {
            let discarded = self.lag;
            self.lag = 0.0;
            return discarded;
        }
        0.0
    }
}

/// Counts events and snapshots them into a per-second rate
#[derive(Debug, Clone)]
pub struct RateCounter {
    count: u32,
    rate: u32,
    last_sample: f64,
}

impl RateCounter {
    /// Create a counter whose first sampling window opens at `start`
    pub fn new(start: f64) -> Self {
        Self {
            count: 0,
            rate: 0,
            last_sample: start,
        }
    }

    /// Record one event
    pub fn tick(&mut self) {
        self.count += 1;
    }

    /// Events recorded since the last snapshot
    pub fn pending(&self) -> u32 {
        self.count
    }

    /// Most recent snapshot
    pub fn rate(&self) -> u32 {
        self.rate
    }

    /// Take a snapshot if at least one second passed since the previous one.
    ///
    /// Returns the new rate when a snapshot was taken.
    pub fn sample(&mut self, current: f64) -> Option<u32> {
        if current - self.last_sample + TIME_EPSILON < 1.0 {
            return None;
        }
        self.rate = self.count;
        self.count = 0;
        self.last_sample = current;
        Some(self.rate)
    }
}
