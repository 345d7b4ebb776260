//! Per-tick decoder transition
//!
//! [`DecoderCore`] owns every piece of loop state together with the injected
//! random source and clock. Each operation mutates that state and returns
//! the emitted events; presentation is left to whoever consumes the
//! [`Transition`].
//!
//! # Tick order
//!
//! ```text
//! SignalSynthesizer::generate → MotorImageryClassifier::tick
//!     → CursorIntegrator::integrate → HistoryBuffer::maybe_record
//! ```

use rand::Rng;

use crate::classifier::MotorImageryClassifier;
use crate::clock::Clock;
use crate::config::DecoderConfig;
use crate::cursor::CursorIntegrator;
use crate::error::ConfigError;
use crate::history::HistoryBuffer;
use crate::signal::{ChannelSample, SampleWindow, SignalSynthesizer};
use crate::types::{Channel, ClassificationState, CursorState, HistoryEntry, HitEvent, Snapshot};

/// Outcome of a tick or forced classification.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    /// State after the operation
    pub snapshot: Snapshot,
    /// Hit scored by the cursor, if any
    pub hit: Option<HitEvent>,
    /// History entry written by the operation, if any
    pub recorded: Option<HistoryEntry>,
    /// Synthesized sample (normal ticks only)
    pub sample: Option<ChannelSample>,
}

/// The closed decoder loop without any scheduling.
pub struct DecoderCore<R, C> {
    config: DecoderConfig,
    synthesizer: SignalSynthesizer,
    classifier: MotorImageryClassifier,
    cursor: CursorIntegrator,
    history: HistoryBuffer,
    rng: R,
    clock: C,
}

impl<R: Rng, C: Clock> DecoderCore<R, C> {
    /// Build the loop state from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any configuration value is out of domain.
    pub fn new(config: DecoderConfig, rng: R, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            synthesizer: SignalSynthesizer::new(),
            classifier: MotorImageryClassifier::new(config.initial_label, config.persistence),
            cursor: CursorIntegrator::new(config.hit_scoring, config.highlight_ms),
            history: HistoryBuffer::new(config.record_probability, config.correct_probability),
            config,
            rng,
            clock,
        })
    }

    /// Run one tick of the loop.
    pub fn tick(&mut self) -> Transition {
        let time_secs = self.clock.elapsed_secs();
        let label = self.classifier.state().label;
        let sample = self.synthesizer.generate(time_secs, label, &mut self.rng);

        let classification = self.classifier.tick(&mut self.rng);
        let update = self.cursor.integrate(&classification);
        let recorded = self
            .history
            .maybe_record(&classification, &mut self.rng, &self.clock);

        Transition {
            snapshot: self.snapshot(),
            hit: update.hit,
            recorded,
            sample: Some(sample),
        }
    }

    /// Operator-triggered classification, logged unconditionally.
    ///
    /// Does not synthesize a sample and works whether or not a timer is
    /// driving [`DecoderCore::tick`].
    pub fn force_classify(&mut self) -> Transition {
        let classification = self.classifier.force_classify(&mut self.rng);
        let update = self.cursor.integrate(&classification);
        let entry = self.history.record(&classification, &mut self.rng, &self.clock);

        Transition {
            snapshot: self.snapshot(),
            hit: update.hit,
            recorded: Some(entry),
            sample: None,
        }
    }

    /// Re-center the cursor, zero the counters and clear the history.
    ///
    /// The sample windows and the classification are left as they are.
    pub fn reset(&mut self) -> Snapshot {
        self.cursor.reset();
        self.history.reset();
        self.snapshot()
    }
}

impl<R, C> DecoderCore<R, C> {
    /// Current read-only view
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(
            &self.cursor.state(),
            &self.classifier.state(),
            self.history.to_vec(),
        )
    }

    /// Current classification
    #[must_use]
    pub fn classification(&self) -> ClassificationState {
        self.classifier.state()
    }

    /// Current cursor state
    #[must_use]
    pub fn cursor(&self) -> CursorState {
        self.cursor.state()
    }

    /// Rolling sample window of a channel
    #[must_use]
    pub fn window(&self, channel: Channel) -> &SampleWindow {
        self.synthesizer.window(channel)
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Injected clock
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }
}

// ============================================================================
// Tests
// ============================================================================
