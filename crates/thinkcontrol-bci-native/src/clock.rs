//! Host time source
//!
//! Elapsed time follows `tokio::time::Instant`, so a paused test runtime
//! also freezes the synthetic oscillators. The time of day comes from the
//! local wall clock via `chrono`.

use chrono::{Local, Timelike};
use thinkcontrol_bci_core::{Clock, ClockTime};
use tokio::time::Instant;

/// Clock backed by the host's monotonic and wall clocks.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Start a clock whose elapsed time counts from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed_secs(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn wall_time(&self) -> ClockTime {
        let now = Local::now();
        // hour() < 24 and minute() < 60
        ClockTime::new(now.hour() as u8, now.minute() as u8)
    }
}
