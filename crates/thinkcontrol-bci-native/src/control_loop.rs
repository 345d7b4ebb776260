//! Closed-loop BCI control session.
//!
//! [`ControlLoop`] owns the run state (Idle/Running) and drives a
//! [`DecoderCore`] from a [`RepeatingTimer`]. After every tick or forced
//! classification it publishes a [`TickUpdate`] on a broadcast channel for
//! the rendering side to consume.
//!
//! # Concurrency
//!
//! All operations take the same mutex, so a tick never overlaps `reset`,
//! `force_classify`, `start` or `stop`. `stop` invalidates the timer's
//! cancellation token while holding that mutex; a firing that was already
//! in flight sees the stale token when it acquires the lock and does
//! nothing.
//!
//! # Example
//!
//! ```rust,ignore
//! use thinkcontrol_bci_core::DecoderConfig;
//! use thinkcontrol_bci_native::ControlLoop;
//!
//! let session = ControlLoop::seeded(DecoderConfig::default(), 42)?;
//! let mut updates = session.subscribe();
//! session.start()?;
//!
//! while let Ok(update) = updates.recv().await {
//!     for hit in &update.events {
//!         flash_zone(hit.side(), hit.highlight_ms());
//!     }
//!     draw_cursor(update.snapshot.cursor_position);
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, trace};

use thinkcontrol_bci_core::{
    Channel, Clock, DecoderConfig, DecoderCore, HistoryEntry, HitEvent, RunState, Snapshot,
    Transition,
};

use crate::clock::SystemClock;
use crate::error::LoopResult;
use crate::timer::{CancellationToken, RepeatingTimer};

/// Buffered updates per subscriber before the slowest one starts lagging
pub const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// Message published after every tick or forced classification.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TickUpdate {
    /// Publication counter, starting at 1
    pub sequence: u64,
    /// Whether this came from `force_classify` rather than the timer
    pub forced: bool,
    /// State after the operation
    pub snapshot: Snapshot,
    /// Hit events to render
    pub events: Vec<HitEvent>,
    /// History entry written by the operation, if any
    pub recorded: Option<HistoryEntry>,
}

struct Shared<R, C> {
    core: DecoderCore<R, C>,
    run_state: RunState,
    timer: RepeatingTimer,
    sequence: u64,
}

impl<R, C> Shared<R, C> {
    fn publish(
        &mut self,
        transition: Transition,
        forced: bool,
        updates: &broadcast::Sender<TickUpdate>,
    ) -> TickUpdate {
        self.sequence += 1;
        let update = TickUpdate {
            sequence: self.sequence,
            forced,
            snapshot: transition.snapshot,
            events: transition.hit.into_iter().collect(),
            recorded: transition.recorded,
        };

        for hit in &update.events {
            debug!("{} at {:.1} (highlight {}ms)", hit, update.snapshot.cursor_position, hit.highlight_ms());
        }
        if let Some(entry) = &update.recorded {
            debug!(
                "Logged {} {} {}% ({})",
                entry.timestamp,
                entry.label,
                entry.confidence_percent,
                if entry.correct { "correct" } else { "incorrect" }
            );
        }

        // Having no subscribers is fine; a renderer may attach later.
        let _ = updates.send(update.clone());
        update
    }
}

/// Closed-loop session with a run state and a tick subscription.
pub struct ControlLoop<R, C> {
    shared: Arc<Mutex<Shared<R, C>>>,
    updates: broadcast::Sender<TickUpdate>,
}

impl<R, C> Clone for ControlLoop<R, C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            updates: self.updates.clone(),
        }
    }
}

impl ControlLoop<StdRng, SystemClock> {
    /// Session with a seeded random source and the system clock.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid.
    pub fn seeded(config: DecoderConfig, seed: u64) -> LoopResult<Self> {
        Self::new(config, StdRng::seed_from_u64(seed), SystemClock::new())
    }

    /// Session with an OS-seeded random source and the system clock.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid.
    pub fn from_entropy(config: DecoderConfig) -> LoopResult<Self> {
        Self::new(config, StdRng::from_entropy(), SystemClock::new())
    }
}

impl<R, C> ControlLoop<R, C>
where
    R: Rng + Send + 'static,
    C: Clock + Send + 'static,
{
    /// Create an idle session.
    ///
    /// # Errors
    ///
    /// Returns [`crate::LoopError::Config`] if `config` is invalid.
    pub fn new(config: DecoderConfig, rng: R, clock: C) -> LoopResult<Self> {
        let period = Duration::from_millis(config.tick_interval_ms);
        let core = DecoderCore::new(config, rng, clock)?;
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);

        Ok(Self {
            shared: Arc::new(Mutex::new(Shared {
                core,
                run_state: RunState::Idle,
                timer: RepeatingTimer::new(period),
                sequence: 0,
            })),
            updates,
        })
    }

    /// Begin ticking at the configured cadence. No effect if already running.
    ///
    /// # Errors
    ///
    /// Returns [`crate::LoopError::NoRuntime`] when called outside a tokio
    /// runtime; the session stays idle.
    pub fn start(&self) -> LoopResult<()> {
        let mut shared = self.lock();
        if shared.run_state.is_running() {
            debug!("Start ignored: control loop already running");
            return Ok(());
        }

        let weak = Arc::downgrade(&self.shared);
        let updates = self.updates.clone();
        shared.timer.arm(move |token| fire(&weak, &updates, token))?;
        shared.run_state = RunState::Running;

        info!(
            "Control loop started ({}ms cadence)",
            shared.timer.period().as_millis()
        );
        Ok(())
    }

    /// Force a classification, log it and publish the result.
    ///
    /// Valid in either run state.
    pub fn force_classify(&self) -> TickUpdate {
        let mut shared = self.lock();
        let transition = shared.core.force_classify();
        let update = shared.publish(transition, true, &self.updates);
        info!(
            "Forced classification: {} ({}%)",
            update.snapshot.current_label,
            (update.snapshot.confidence * 100.0).round()
        );
        update
    }

    /// Re-center the cursor, zero the counters and clear the history.
    ///
    /// The run state, sample windows and classification are left as they
    /// are. Nothing is published.
    pub fn reset(&self) -> Snapshot {
        let mut shared = self.lock();
        let snapshot = shared.core.reset();
        info!("Control loop reset ({:?})", shared.run_state);
        snapshot
    }
}

impl<R, C> ControlLoop<R, C> {
    /// Stop ticking. No effect if already idle.
    ///
    /// No tick runs after this returns until the next `start`.
    pub fn stop(&self) {
        let mut shared = self.lock();
        if !shared.run_state.is_running() {
            debug!("Stop ignored: control loop already idle");
            return;
        }
        shared.timer.cancel();
        shared.run_state = RunState::Idle;
        info!("Control loop stopped after {} updates", shared.sequence);
    }

    /// State as of the last completed operation
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.lock().core.snapshot()
    }

    /// Current run state
    #[must_use]
    pub fn run_state(&self) -> RunState {
        self.lock().run_state
    }

    /// Receive every update published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TickUpdate> {
        self.updates.subscribe()
    }

    /// Copy of a channel's sample window, oldest first.
    #[must_use]
    pub fn window(&self, channel: Channel) -> Vec<f64> {
        self.lock().core.window(channel).iter().collect()
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> DecoderConfig {
        self.lock().core.config().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Shared<R, C>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Timer callback: run one tick if the token is still live.
fn fire<R: Rng, C: Clock>(
    shared: &Weak<Mutex<Shared<R, C>>>,
    updates: &broadcast::Sender<TickUpdate>,
    token: CancellationToken,
) -> bool {
    let Some(strong) = shared.upgrade() else {
        return false;
    };
    let mut shared = strong.lock().unwrap_or_else(PoisonError::into_inner);
    if !shared.timer.is_current(token) {
        trace!("Dropping tick from a cancelled timer");
        return false;
    }

    let transition = shared.core.tick();
    let update = shared.publish(transition, false, updates);
    debug!(
        "Tick {}: {} {:.2} cursor {:.1}",
        update.sequence,
        update.snapshot.current_label,
        update.snapshot.confidence,
        update.snapshot.cursor_position
    );
    true
}
