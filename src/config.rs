// Session configuration
// The closed config surface upstream collaborators hand the engine, with an
// explicit validation step that produces typed internals before play starts

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sequence::generator::{GeneratorConfig, GroupingMode};
use crate::sequence::rhythm::RhythmPattern;
use crate::sequence::scale::{OctaveRange, Scale};
use crate::sequence::types::ExpectedNote;
use crate::timing::analyzer::RecalibrationPolicy;
use crate::timing::thresholds::ThresholdConfig;

/// Errors raised while validating a configuration. These fail fast before a
/// session starts; nothing here is recoverable at runtime.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown scale: {0}")]
    UnknownScale(String),

    #[error("unknown grouping mode: {0}")]
    UnknownGroupingMode(String),

    #[error("unknown pitch class: {0}")]
    UnknownPitchClass(String),

    #[error("rhythm pattern has no durations")]
    EmptyRhythmPattern,

    #[error("invalid note duration: {0} beats")]
    InvalidNoteDuration(f64),

    #[error("tempo out of range: {0} bpm")]
    TempoOutOfRange(f64),

    #[error("invalid octave range: {low}..={high}")]
    InvalidOctaveRange { low: i32, high: i32 },

    #[error("invalid goal: {0}")]
    InvalidGoal(String),
}

/// Optional end-of-session target
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Goal {
    /// Beats the performer should complete
    pub beats: f64,

    /// Minimum note accuracy in [0, 1]
    pub accuracy: f64,
}

/// The raw, serializable configuration. Call `validate()` to turn it into
/// typed internals; field shapes are not trusted until then.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Built-in scale name, e.g. "c_major"
    pub scale: String,

    /// Grouping mode name, e.g. "single_note"
    pub grouping_mode: String,

    /// Allowed note durations in beats
    pub rhythm_pattern: Vec<f64>,

    pub bpm: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<Goal>,

    /// Pre-authored sequence; bypasses the generator when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_sequence: Option<Vec<ExpectedNote>>,

    pub training_wheels_enabled: bool,

    #[serde(default = "OctaveRange::right_hand")]
    pub right_hand_octaves: OctaveRange,

    #[serde(default = "OctaveRange::left_hand")]
    pub left_hand_octaves: OctaveRange,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            scale: "c_major".to_string(),
            grouping_mode: "single_note".to_string(),
            rhythm_pattern: vec![1.0],
            bpm: 60.0,
            goal: None,
            fixed_sequence: None,
            training_wheels_enabled: true,
            right_hand_octaves: OctaveRange::right_hand(),
            left_hand_octaves: OctaveRange::left_hand(),
        }
    }
}

/// A configuration that has passed validation
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub generator: GeneratorConfig,
    pub goal: Option<Goal>,
    pub fixed_sequence: Option<Vec<ExpectedNote>>,
    pub training_wheels_enabled: bool,
    pub thresholds: ThresholdConfig,
    pub recalibration: RecalibrationPolicy,
}

impl SessionConfig {
    /// Validate every field, rejecting unknown identifiers and out-of-range
    /// values with the matching `ConfigError`.
    pub fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        if !self.bpm.is_finite() || !(20.0..=300.0).contains(&self.bpm) {
            return Err(ConfigError::TempoOutOfRange(self.bpm));
        }

        let scale = Scale::by_name(&self.scale)?;
        let grouping = GroupingMode::from_name(&self.grouping_mode)?;
        let rhythm = RhythmPattern::new(self.rhythm_pattern.clone())?;
        let right_hand =
            OctaveRange::new(self.right_hand_octaves.low, self.right_hand_octaves.high)?;
        let left_hand = OctaveRange::new(self.left_hand_octaves.low, self.left_hand_octaves.high)?;

        if let Some(goal) = &self.goal {
            if !goal.beats.is_finite() || goal.beats <= 0.0 {
                return Err(ConfigError::InvalidGoal(format!(
                    "beats must be positive, got {}",
                    goal.beats
                )));
            }
            if !goal.accuracy.is_finite() || !(0.0..=1.0).contains(&goal.accuracy) {
                return Err(ConfigError::InvalidGoal(format!(
                    "accuracy must be within 0..=1, got {}",
                    goal.accuracy
                )));
            }
        }

        Ok(ValidatedConfig {
            generator: GeneratorConfig {
                scale,
                grouping,
                rhythm,
                bpm: self.bpm,
                right_hand,
                left_hand,
            },
            goal: self.goal,
            fixed_sequence: self.fixed_sequence.clone(),
            training_wheels_enabled: self.training_wheels_enabled,
            thresholds: ThresholdConfig::default(),
            recalibration: RecalibrationPolicy::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = SessionConfig::default();
        let validated = config.validate().unwrap();

        assert_eq!(validated.generator.grouping, GroupingMode::SingleNote);
        assert_eq!(validated.generator.scale.len(), 7);
        assert!(validated.training_wheels_enabled);
    }

    #[test]
    fn test_unknown_scale_rejected() {
        let config = SessionConfig {
            scale: "q_mixolydian".to_string(),
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownScale(_))
        ));
    }

    #[test]
    fn test_unknown_grouping_rejected() {
        let config = SessionConfig {
            grouping_mode: "cluster".to_string(),
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownGroupingMode(_))
        ));
    }

    #[test]
    fn test_empty_rhythm_rejected() {
        let config = SessionConfig {
            rhythm_pattern: vec![],
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyRhythmPattern)
        ));
    }

    #[test]
    fn test_bad_tempo_rejected() {
        for bpm in [0.0, -10.0, 500.0, f64::NAN] {
            let config = SessionConfig {
                bpm,
                ..SessionConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::TempoOutOfRange(_))
            ));
        }
    }

    #[test]
    fn test_bad_goal_rejected() {
        let config = SessionConfig {
            goal: Some(Goal {
                beats: 0.0,
                accuracy: 0.9,
            }),
            ..SessionConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidGoal(_))));

        let config = SessionConfig {
            goal: Some(Goal {
                beats: 32.0,
                accuracy: 1.5,
            }),
            ..SessionConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidGoal(_))));
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = SessionConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored: SessionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.scale, "c_major");
        assert!((restored.bpm - 60.0).abs() < 1e-9);
    }
}
