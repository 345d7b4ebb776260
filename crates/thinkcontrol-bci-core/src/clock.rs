//! Injected time sources
//!
//! The decoder never reads ambient time. Signal phase comes from
//! [`Clock::elapsed_secs`] and history timestamps from [`Clock::wall_time`],
//! so a test can replay a session exactly by driving a [`ManualClock`].

use core::cell::Cell;

use crate::types::ClockTime;

/// Time source for the decoder.
pub trait Clock {
    /// Seconds since the clock's origin; drives the synthetic oscillators.
    fn elapsed_secs(&self) -> f64;

    /// Local time of day used to stamp history entries.
    fn wall_time(&self) -> ClockTime;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn elapsed_secs(&self) -> f64 {
        (**self).elapsed_secs()
    }

    fn wall_time(&self) -> ClockTime {
        (**self).wall_time()
    }
}

/// Hand-driven clock for deterministic replay.
#[derive(Debug, Default)]
pub struct ManualClock {
    elapsed_secs: Cell<f64>,
    wall_time: Cell<ClockTime>,
}

impl ManualClock {
    /// Create a clock at zero elapsed time, showing `wall_time`.
    #[must_use]
    pub fn new(wall_time: ClockTime) -> Self {
        Self {
            elapsed_secs: Cell::new(0.0),
            wall_time: Cell::new(wall_time),
        }
    }

    /// Move elapsed time forward.
    pub fn advance(&self, secs: f64) {
        self.elapsed_secs.set(self.elapsed_secs.get() + secs);
    }

    /// Change the displayed time of day.
    pub fn set_wall_time(&self, wall_time: ClockTime) {
        self.wall_time.set(wall_time);
    }
}

impl Clock for ManualClock {
    fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs.get()
    }

    fn wall_time(&self) -> ClockTime {
        self.wall_time.get()
    }
}
