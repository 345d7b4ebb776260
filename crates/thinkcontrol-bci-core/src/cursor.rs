//! Cursor integration and target-zone scoring
//!
//! The cursor moves `confidence × 5` units per tick toward the classified
//! side and is clamped to the track. Positions strictly below 15 or strictly
//! above 85 are inside a target zone.

use crate::config::HitScoring;
use crate::types::{ClassificationState, CursorState, HitEvent, Label};

/// Step size per unit of confidence
pub const STEP_GAIN: f64 = 5.0;

/// Positions below this score a left hit
pub const LEFT_HIT_THRESHOLD: f64 = 15.0;

/// Positions above this score a right hit
pub const RIGHT_HIT_THRESHOLD: f64 = 85.0;

/// Result of one integration step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CursorUpdate {
    /// Position after the step
    pub position: f64,
    /// Hit scored on this step, if any
    pub hit: Option<HitEvent>,
}

/// Integrates classifier output into cursor motion.
#[derive(Clone, Debug)]
pub struct CursorIntegrator {
    state: CursorState,
    scoring: HitScoring,
    highlight_ms: u32,
    /// Target zone occupied after the previous step (edge-triggered scoring)
    occupied: Option<Label>,
}

impl CursorIntegrator {
    /// Create an integrator at the track center.
    #[must_use]
    pub fn new(scoring: HitScoring, highlight_ms: u32) -> Self {
        Self {
            state: CursorState::INITIAL,
            scoring,
            highlight_ms,
            occupied: None,
        }
    }

    /// Current cursor state
    #[must_use]
    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Move the cursor by one classification and score any hit.
    pub fn integrate(&mut self, classification: &ClassificationState) -> CursorUpdate {
        let step = classification.confidence.clamp(0.0, 1.0) * STEP_GAIN;
        let position = match classification.label {
            Label::Left => self.state.position - step,
            Label::Right => self.state.position + step,
        };
        self.state.position = position.clamp(CursorState::MIN_POSITION, CursorState::MAX_POSITION);

        let zone = target_zone(self.state.position);
        let scores = match self.scoring {
            HitScoring::Continuous => zone.is_some(),
            HitScoring::EdgeTriggered => zone.is_some() && zone != self.occupied,
        };
        self.occupied = zone;

        let hit = match zone {
            Some(Label::Left) if scores => {
                self.state.hits_left = self.state.hits_left.saturating_add(1);
                Some(HitEvent::Left {
                    highlight_ms: self.highlight_ms,
                })
            }
            Some(Label::Right) if scores => {
                self.state.hits_right = self.state.hits_right.saturating_add(1);
                Some(HitEvent::Right {
                    highlight_ms: self.highlight_ms,
                })
            }
            _ => None,
        };

        CursorUpdate {
            position: self.state.position,
            hit,
        }
    }

    /// Return to the center with zeroed counters.
    pub fn reset(&mut self) {
        self.state = CursorState::INITIAL;
        self.occupied = None;
    }
}

/// Target zone containing `position`, if any.
fn target_zone(position: f64) -> Option<Label> {
    if position < LEFT_HIT_THRESHOLD {
        Some(Label::Left)
    } else if position > RIGHT_HIT_THRESHOLD {
        Some(Label::Right)
    } else {
        None
    }
}

// ============================================================================
// Tests
// ============================================================================
