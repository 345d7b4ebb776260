//! Motor imagery classifier with label persistence
//!
//! The simulated classifier keeps its previous label with probability
//! `persistence` on every tick. Without that hysteresis the label would
//! change almost every tick and the cursor would never travel far in one
//! direction. Confidence is redrawn on every tick regardless, modelling
//! fluctuating signal quality rather than certainty about the label.

use rand::Rng;

use crate::types::{ClassificationState, Label};

/// Lowest confidence produced by a normal tick
pub const TICK_CONFIDENCE_MIN: f64 = 0.5;
/// Highest confidence produced by a normal tick
pub const TICK_CONFIDENCE_MAX: f64 = 0.9;
/// Lowest confidence produced by a forced classification
pub const FORCED_CONFIDENCE_MIN: f64 = 0.6;
/// Highest confidence produced by a forced classification
pub const FORCED_CONFIDENCE_MAX: f64 = 0.9;

/// Binary left/right classifier over the synthetic signal.
#[derive(Clone, Debug)]
pub struct MotorImageryClassifier {
    state: ClassificationState,
    persistence: f64,
}

impl MotorImageryClassifier {
    /// Create a classifier starting at `initial_label` with 0.5 confidence.
    ///
    /// `persistence` must already be validated to lie in [0, 1].
    #[must_use]
    pub fn new(initial_label: Label, persistence: f64) -> Self {
        Self {
            state: ClassificationState::new(initial_label, ClassificationState::INITIAL.confidence),
            persistence,
        }
    }

    /// Current classification
    #[must_use]
    pub fn state(&self) -> ClassificationState {
        self.state
    }

    /// Advance one tick.
    ///
    /// Keeps the label with probability `persistence`, otherwise draws a
    /// uniform label (which may equal the old one). Confidence is uniform in
    /// [`TICK_CONFIDENCE_MIN`, `TICK_CONFIDENCE_MAX`].
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> ClassificationState {
        let label = if rng.gen_bool(self.persistence) {
            self.state.label
        } else {
            random_label(rng)
        };
        let confidence = rng.gen_range(TICK_CONFIDENCE_MIN..=TICK_CONFIDENCE_MAX);
        self.state = ClassificationState::new(label, confidence);
        self.state
    }

    /// Operator-triggered classification that bypasses persistence.
    ///
    /// Always draws a fresh uniform label with confidence in
    /// [`FORCED_CONFIDENCE_MIN`, `FORCED_CONFIDENCE_MAX`].
    pub fn force_classify<R: Rng + ?Sized>(&mut self, rng: &mut R) -> ClassificationState {
        let label = random_label(rng);
        let confidence = rng.gen_range(FORCED_CONFIDENCE_MIN..=FORCED_CONFIDENCE_MAX);
        self.state = ClassificationState::new(label, confidence);
        self.state
    }
}

fn random_label<R: Rng + ?Sized>(rng: &mut R) -> Label {
    if rng.gen_bool(0.5) {
        Label::Right
    } else {
        Label::Left
    }
}
