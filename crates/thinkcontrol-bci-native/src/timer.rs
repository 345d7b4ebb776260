//! Cancellable repeating tick timer
//!
//! One tokio task per arming fires a callback at a fixed period. Every
//! arming gets a fresh [`CancellationToken`]; [`RepeatingTimer::cancel`]
//! invalidates it synchronously before aborting the task. A callback that
//! was already woken when the timer was cancelled must check
//! [`RepeatingTimer::is_current`] (under the same lock that guards the
//! timer) and bail out, so no work runs after `cancel` returns.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::error::{LoopError, LoopResult};

/// Identifies one arming of a [`RepeatingTimer`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CancellationToken {
    generation: u64,
}

/// Fixed-period timer driving the control loop.
#[derive(Debug)]
pub struct RepeatingTimer {
    period: Duration,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl RepeatingTimer {
    /// Create a disarmed timer.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            generation: 0,
            task: None,
        }
    }

    /// Firing period
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Whether a task is currently scheduled
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.task.is_some()
    }

    /// Whether `token` belongs to the live arming.
    #[must_use]
    pub fn is_current(&self, token: CancellationToken) -> bool {
        self.task.is_some() && token.generation == self.generation
    }

    /// Schedule `on_fire` every period, starting one period from now.
    ///
    /// Any previous arming is cancelled first. The task ends when `on_fire`
    /// returns `false` or the timer is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::NoRuntime`] when called outside a tokio runtime.
    pub fn arm<F>(&mut self, mut on_fire: F) -> LoopResult<CancellationToken>
    where
        F: FnMut(CancellationToken) -> bool + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| LoopError::NoRuntime)?;
        self.cancel();

        let token = CancellationToken {
            generation: self.generation,
        };
        let period = self.period;
        self.task = Some(runtime.spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !on_fire(token) {
                    break;
                }
            }
        }));
        Ok(token)
    }

    /// Invalidate the current token and abort the task.
    ///
    /// Returns `true` if the timer was armed.
    pub fn cancel(&mut self) -> bool {
        self.generation = self.generation.wrapping_add(1);
        match self.task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for RepeatingTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
