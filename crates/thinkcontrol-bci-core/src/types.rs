//! Core data types for the ThinkControl decoder loop
//!
//! These types are shared between the `no_std` decoder core and the host
//! control loop. All are `Copy` or bounded so a snapshot never allocates.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::history::HISTORY_CAPACITY;

// ============================================================================
// EEG Channel Types
// ============================================================================

/// Sensorimotor EEG channel following the 10-20 system.
///
/// The decoder only watches the three electrodes over motor cortex:
/// C3 (left hemisphere), C4 (right hemisphere) and Cz (midline).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Channel {
    /// Central left (motor cortex, right hand)
    C3 = 0,
    /// Central right (motor cortex, left hand)
    C4 = 1,
    /// Central midline (non-discriminative)
    Cz = 2,
}

impl Channel {
    /// All channels in order
    pub const ALL: [Self; 3] = [Self::C3, Self::C4, Self::Cz];

    /// Number of channels
    pub const COUNT: usize = 3;

    /// Get the array index for this channel
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Get the 10-20 system name for this channel
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::C3 => "C3",
            Self::C4 => "C4",
            Self::Cz => "Cz",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Channel {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", self.name());
    }
}

// ============================================================================
// Classification Types
// ============================================================================

/// Binary motor-imagery class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// Left hand imagery
    Left,
    /// Right hand imagery
    Right,
}

impl Label {
    /// Both labels
    pub const ALL: [Self; 2] = [Self::Left, Self::Right];

    /// The other class
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Short lowercase name, accepted by [`Label::from_str`]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Human-readable class name for log rows
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Left => "Left Hand",
            Self::Right => "Right Hand",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Label {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("left") || s.eq_ignore_ascii_case("l") {
            Ok(Self::Left)
        } else if s.eq_ignore_ascii_case("right") || s.eq_ignore_ascii_case("r") {
            Ok(Self::Right)
        } else {
            Err(ConfigError::UnknownLabel)
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Label {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", self.name());
    }
}

/// Current classifier output: label plus confidence.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationState {
    /// Winning class
    pub label: Label,
    /// Confidence in [0, 1]
    pub confidence: f64,
}

impl ClassificationState {
    /// State before the first classification
    pub const INITIAL: Self = Self {
        label: Label::Left,
        confidence: 0.5,
    };

    /// Create a state, clamping confidence into [0, 1].
    ///
    /// NaN confidence collapses to 0.
    #[must_use]
    pub fn new(label: Label, confidence: f64) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self { label, confidence }
    }

    /// Probability split as `(left, right)`.
    ///
    /// The winning side receives `confidence`, the other side the remainder.
    #[must_use]
    pub fn probabilities(&self) -> (f64, f64) {
        match self.label {
            Label::Left => (self.confidence, 1.0 - self.confidence),
            Label::Right => (1.0 - self.confidence, self.confidence),
        }
    }

    /// Confidence as a rounded integer percentage.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn confidence_percent(&self) -> u8 {
        // Confidence is clamped to [0, 1] so the result fits in 0..=100.
        libm::round(self.confidence * 100.0) as u8
    }
}

impl Default for ClassificationState {
    fn default() -> Self {
        Self::INITIAL
    }
}

// ============================================================================
// Cursor Types
// ============================================================================

/// Coarse cursor region used for the position readout.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CursorZone {
    /// Position below 40
    Left,
    /// Position within [40, 60]
    Center,
    /// Position above 60
    Right,
}

impl CursorZone {
    /// Upper bound (exclusive) of the left zone
    pub const LEFT_BELOW: f64 = 40.0;
    /// Lower bound (exclusive) of the right zone
    pub const RIGHT_ABOVE: f64 = 60.0;

    /// Zone containing `position`
    #[must_use]
    pub fn of(position: f64) -> Self {
        if position < Self::LEFT_BELOW {
            Self::Left
        } else if position > Self::RIGHT_ABOVE {
            Self::Right
        } else {
            Self::Center
        }
    }

    /// Readout text
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "Left Zone",
            Self::Center => "Center",
            Self::Right => "Right Zone",
        }
    }
}

/// Cursor position and hit counters.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CursorState {
    /// Position in [0, 100]
    pub position: f64,
    /// Hits scored in the left target zone
    pub hits_left: u32,
    /// Hits scored in the right target zone
    pub hits_right: u32,
}

impl CursorState {
    /// Left edge of the track
    pub const MIN_POSITION: f64 = 0.0;
    /// Right edge of the track
    pub const MAX_POSITION: f64 = 100.0;
    /// Starting position (track center)
    pub const INITIAL_POSITION: f64 = 50.0;

    /// State at startup and after reset
    pub const INITIAL: Self = Self {
        position: Self::INITIAL_POSITION,
        hits_left: 0,
        hits_right: 0,
    };

    /// Coarse zone of the current position
    #[must_use]
    pub fn zone(&self) -> CursorZone {
        CursorZone::of(self.position)
    }
}

impl Default for CursorState {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Target-zone hit emitted by the cursor integrator.
///
/// The renderer highlights the zone for `highlight_ms` and clears it on its
/// own schedule.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HitEvent {
    /// Cursor is in the left target zone
    #[serde(rename = "HitLeft")]
    Left {
        /// Highlight duration
        highlight_ms: u32,
    },
    /// Cursor is in the right target zone
    #[serde(rename = "HitRight")]
    Right {
        /// Highlight duration
        highlight_ms: u32,
    },
}

impl HitEvent {
    /// Default highlight duration for a hit flash
    pub const DEFAULT_HIGHLIGHT_MS: u32 = 500;

    /// Side of the track that was hit
    #[must_use]
    pub const fn side(self) -> Label {
        match self {
            Self::Left { .. } => Label::Left,
            Self::Right { .. } => Label::Right,
        }
    }

    /// How long the renderer should keep the zone highlighted
    #[must_use]
    pub const fn highlight_ms(self) -> u32 {
        match self {
            Self::Left { highlight_ms } | Self::Right { highlight_ms } => highlight_ms,
        }
    }
}

impl fmt::Display for HitEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left { .. } => f.write_str("HitLeft"),
            Self::Right { .. } => f.write_str("HitRight"),
        }
    }
}

// ============================================================================
// History Types
// ============================================================================

/// Wall-clock time of day, 24-hour, minute resolution.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClockTime {
    /// Hour (0-23)
    pub hour: u8,
    /// Minute (0-59)
    pub minute: u8,
}

impl ClockTime {
    /// Create a time of day, wrapping out-of-range fields.
    #[must_use]
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self {
            hour: hour % 24,
            minute: minute % 60,
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// One logged classification.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the entry was recorded
    pub timestamp: ClockTime,
    /// Classified label
    pub label: Label,
    /// Confidence as integer percent (0-100)
    pub confidence_percent: u8,
    /// Whether the classification matched the (simulated) ground truth
    pub correct: bool,
}

// ============================================================================
// Loop State
// ============================================================================

/// Run state of the control loop.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// No recurring tick scheduled
    #[default]
    Idle,
    /// Ticking at the configured cadence
    Running,
}

impl RunState {
    /// Whether the loop is ticking
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Read-only projection of decoder state for rendering.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    /// Cursor position in [0, 100]
    pub cursor_position: f64,
    /// Coarse zone of the cursor
    pub cursor_zone: CursorZone,
    /// Left target hits
    pub hits_left: u32,
    /// Right target hits
    pub hits_right: u32,
    /// Current label
    pub current_label: Label,
    /// Current confidence in [0, 1]
    pub confidence: f64,
    /// Probability bar value for the left class
    pub left_probability: f64,
    /// Probability bar value for the right class
    pub right_probability: f64,
    /// Logged classifications, newest first
    pub history: heapless::Vec<HistoryEntry, HISTORY_CAPACITY>,
}

impl Snapshot {
    /// Build a snapshot from its parts.
    #[must_use]
    pub fn new(
        cursor: &CursorState,
        classification: &ClassificationState,
        history: heapless::Vec<HistoryEntry, HISTORY_CAPACITY>,
    ) -> Self {
        let (left_probability, right_probability) = classification.probabilities();
        Self {
            cursor_position: cursor.position,
            cursor_zone: cursor.zone(),
            hits_left: cursor.hits_left,
            hits_right: cursor.hits_right,
            current_label: classification.label,
            confidence: classification.confidence,
            left_probability,
            right_probability,
            history,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_indices() {
        for (i, channel) in Channel::ALL.iter().enumerate() {
            assert_eq!(channel.index(), i);
        }
        assert_eq!(Channel::ALL.len(), Channel::COUNT);
    }

    #[test]
    fn test_label_parsing() {
        assert_eq!("left".parse::<Label>(), Ok(Label::Left));
        assert_eq!(" Right ".parse::<Label>(), Ok(Label::Right));
        assert_eq!("R".parse::<Label>(), Ok(Label::Right));
        assert_eq!("up".parse::<Label>(), Err(ConfigError::UnknownLabel));
        assert_eq!("".parse::<Label>(), Err(ConfigError::UnknownLabel));
    }

    #[test]
    fn test_label_opposite() {
        assert_eq!(Label::Left.opposite(), Label::Right);
        assert_eq!(Label::Right.opposite(), Label::Left);
    }

    #[test]
    fn test_classification_confidence_clamped() {
        assert_eq!(ClassificationState::new(Label::Left, 1.7).confidence, 1.0);
        assert_eq!(ClassificationState::new(Label::Left, -0.2).confidence, 0.0);
        assert_eq!(ClassificationState::new(Label::Left, f64::NAN).confidence, 0.0);
    }

    #[test]
    fn test_probabilities_follow_label() {
        let left = ClassificationState::new(Label::Left, 0.75);
        assert_eq!(left.probabilities(), (0.75, 0.25));

        let right = ClassificationState::new(Label::Right, 0.75);
        assert_eq!(right.probabilities(), (0.25, 0.75));
    }

    #[test]
    fn test_confidence_percent_rounds() {
        assert_eq!(ClassificationState::new(Label::Left, 0.704).confidence_percent(), 70);
        assert_eq!(ClassificationState::new(Label::Left, 0.706).confidence_percent(), 71);
        assert_eq!(ClassificationState::new(Label::Right, 1.0).confidence_percent(), 100);
    }

    #[test]
    fn test_cursor_zone_boundaries() {
        assert_eq!(CursorZone::of(39.9), CursorZone::Left);
        assert_eq!(CursorZone::of(40.0), CursorZone::Center);
        assert_eq!(CursorZone::of(60.0), CursorZone::Center);
        assert_eq!(CursorZone::of(60.1), CursorZone::Right);
    }

    #[test]
    fn test_clock_time_display() {
        use std::string::ToString;

        assert_eq!(ClockTime::new(9, 5).to_string(), "09:05");
        assert_eq!(ClockTime::new(23, 59).to_string(), "23:59");
        assert_eq!(ClockTime::new(24, 60), ClockTime::new(0, 0));
    }

    #[test]
    fn test_hit_event_accessors() {
        let hit = HitEvent::Right { highlight_ms: 500 };
        assert_eq!(hit.side(), Label::Right);
        assert_eq!(hit.highlight_ms(), 500);
    }
}
