//! Decoder configuration
//!
//! All tunables of the closed loop live here. Values are validated once at
//! construction; after that every operation of the core is total.

use serde::{Deserialize, Serialize};

use crate::error::{check_probability, ConfigError};
use crate::types::{HitEvent, Label};

/// When the cursor integrator scores a hit.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitScoring {
    /// Score on every tick the cursor sits beyond a threshold
    #[default]
    Continuous,
    /// Score only on the tick the cursor enters a target zone
    EdgeTriggered,
}

/// Decoder loop configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Nominal tick cadence (ms)
    pub tick_interval_ms: u64,
    /// Probability the classifier keeps its previous label on a tick
    pub persistence: f64,
    /// Probability a normal tick is written to the history log
    pub record_probability: f64,
    /// Probability a logged entry is marked correct
    pub correct_probability: f64,
    /// Hit scoring policy
    pub hit_scoring: HitScoring,
    /// Highlight duration attached to hit events (ms)
    pub highlight_ms: u32,
    /// Label before the first classification
    pub initial_label: Label,
}

impl DecoderConfig {
    /// Default tick cadence (ms)
    pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;
    /// Default label persistence
    pub const DEFAULT_PERSISTENCE: f64 = 0.7;
    /// Default history sampling probability
    pub const DEFAULT_RECORD_PROBABILITY: f64 = 0.1;
    /// Default simulated accuracy
    pub const DEFAULT_CORRECT_PROBABILITY: f64 = 0.7;

    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-domain field as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidTickInterval {
                interval_ms: self.tick_interval_ms,
            });
        }
        check_probability("persistence", self.persistence)?;
        check_probability("record_probability", self.record_probability)?;
        check_probability("correct_probability", self.correct_probability)?;
        if self.highlight_ms == 0 {
            return Err(ConfigError::InvalidHighlight {
                duration_ms: self.highlight_ms,
            });
        }
        Ok(())
    }

    /// Set the tick cadence
    #[must_use]
    pub fn tick_interval_ms(mut self, interval_ms: u64) -> Self {
        self.tick_interval_ms = interval_ms;
        self
    }

    /// Set the label persistence
    #[must_use]
    pub fn persistence(mut self, persistence: f64) -> Self {
        self.persistence = persistence;
        self
    }

    /// Set the history sampling probability
    #[must_use]
    pub fn record_probability(mut self, probability: f64) -> Self {
        self.record_probability = probability;
        self
    }

    /// Set the hit scoring policy
    #[must_use]
    pub fn hit_scoring(mut self, scoring: HitScoring) -> Self {
        self.hit_scoring = scoring;
        self
    }

    /// Set the starting label
    #[must_use]
    pub fn initial_label(mut self, label: Label) -> Self {
        self.initial_label = label;
        self
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: Self::DEFAULT_TICK_INTERVAL_MS,
            persistence: Self::DEFAULT_PERSISTENCE,
            record_probability: Self::DEFAULT_RECORD_PROBABILITY,
            correct_probability: Self::DEFAULT_CORRECT_PROBABILITY,
            hit_scoring: HitScoring::Continuous,
            highlight_ms: HitEvent::DEFAULT_HIGHLIGHT_MS,
            initial_label: Label::Left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DecoderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_interval_ms, 100);
        assert_eq!(config.highlight_ms, 500);
        assert_eq!(config.hit_scoring, HitScoring::Continuous);
    }

    #[test]
    fn test_zero_tick_interval_rejected() {
        let config = DecoderConfig::default().tick_interval_ms(0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidTickInterval { interval_ms: 0 })
        );
    }

    #[test]
    fn test_probability_fields_checked() {
        let config = DecoderConfig::default().persistence(1.2);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ProbabilityOutOfRange { parameter: "persistence", .. })
        ));

        let config = DecoderConfig::default().record_probability(-0.5);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ProbabilityOutOfRange { parameter: "record_probability", .. })
        ));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: DecoderConfig =
            serde_json::from_str(r#"{"persistence": 0.9, "hit_scoring": "edge_triggered", "initial_label": "right"}"#)
                .expect("valid json");
        assert_eq!(config.persistence, 0.9);
        assert_eq!(config.hit_scoring, HitScoring::EdgeTriggered);
        assert_eq!(config.initial_label, Label::Right);
        assert_eq!(config.tick_interval_ms, DecoderConfig::DEFAULT_TICK_INTERVAL_MS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_negative_tick_interval_is_a_parse_error() {
        let result = serde_json::from_str::<DecoderConfig>(r#"{"tick_interval_ms": -5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_highlight_rejected() {
        let config = DecoderConfig {
            highlight_ms: 0,
            ..DecoderConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidHighlight { duration_ms: 0 })
        );
    }
}
