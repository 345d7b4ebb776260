//! Error types for the ThinkControl decoder core
//!
//! The core performs no I/O, so the only failures it can report are
//! configuration values outside their valid domain. Everything computed
//! after construction is clamped or evicted instead of failing.

use core::fmt;

use serde::Serialize;

// ============================================================================
// Configuration Errors
// ============================================================================

/// An injected configuration value is out of domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ConfigError {
    /// Tick cadence must be a positive number of milliseconds
    InvalidTickInterval {
        /// The rejected interval
        interval_ms: u64,
    },
    /// A probability is non-finite or outside [0, 1]
    ProbabilityOutOfRange {
        /// Name of the configuration field
        parameter: &'static str,
        /// The rejected value
        value: f64,
    },
    /// Hit highlight must last at least one millisecond
    InvalidHighlight {
        /// The rejected duration
        duration_ms: u32,
    },
    /// Label text did not name a known class
    UnknownLabel,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTickInterval { interval_ms } => {
                write!(f, "Invalid tick interval: {interval_ms}ms (must be > 0)")
            }
            Self::ProbabilityOutOfRange { parameter, value } => {
                write!(f, "Probability {parameter} = {value} outside [0, 1]")
            }
            Self::InvalidHighlight { duration_ms } => {
                write!(f, "Invalid highlight duration: {duration_ms}ms (must be > 0)")
            }
            Self::UnknownLabel => write!(f, "Unknown label (expected \"left\" or \"right\")"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::InvalidTickInterval { interval_ms } => {
                defmt::write!(f, "Bad tick: {}ms", interval_ms);
            }
            Self::ProbabilityOutOfRange { parameter, .. } => {
                defmt::write!(f, "Bad probability: {}", parameter);
            }
            Self::InvalidHighlight { duration_ms } => {
                defmt::write!(f, "Bad highlight: {}ms", duration_ms);
            }
            Self::UnknownLabel => defmt::write!(f, "Unknown label"),
        }
    }
}

/// Check that `value` is a usable probability.
///
/// # Errors
///
/// Returns [`ConfigError::ProbabilityOutOfRange`] for NaN, infinities and
/// values outside [0, 1].
pub fn check_probability(parameter: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::ProbabilityOutOfRange { parameter, value })
    }
}

// ============================================================================
// Tests
// ============================================================================
