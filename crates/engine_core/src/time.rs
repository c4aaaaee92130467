//! Fixed-timestep clock for the simulation loop.
//!
//! Wall-clock frames are accumulated and drained in fixed ticks so the
//! locomotion core always integrates with the same `dt`, no matter how
//! uneven the outer loop runs.

use std::time::{Duration, Instant};

/// Drives fixed simulation ticks from variable frame times.
#[derive(Debug)]
pub struct TickClock {
    last_frame: Instant,
    accumulator: Duration,
    fixed_dt: Duration,
    tick_count: u64,
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(60.0)
    }
}

impl TickClock {
    /// Create a clock ticking at the given rate in Hz.
    pub fn new(hz: f64) -> Self {
        Self {
            last_frame: Instant::now(),
            accumulator: Duration::ZERO,
            fixed_dt: Duration::from_secs_f64(1.0 / hz),
            tick_count: 0,
        }
    }

    /// Accumulate wall-clock time at the start of a frame.
    pub fn update(&mut self) {
        let now = Instant::now();
        self.accumulator += now - self.last_frame;
        self.last_frame = now;
    }

    /// Consume one fixed tick if enough time has accumulated.
    pub fn should_tick(&mut self) -> bool {
        if self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            self.tick_count += 1;
            true
        } else {
            false
        }
    }

    /// Fixed timestep in seconds.
    pub fn dt(&self) -> f32 {
        self.fixed_dt.as_secs_f32()
    }

    /// Ticks consumed since creation.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}
