// Rhythm patterns
// A finite set of allowed note durations, expressed in beats

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// The set of note durations (in beats) the generator may draw from.
/// A pattern of `[1.0]` yields straight quarter notes; `[0.5, 1.0, 2.0]`
/// mixes eighths, quarters, and halves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RhythmPattern {
    durations: Vec<f64>,
}

impl RhythmPattern {
    /// Validate and build a pattern. Durations must be finite, positive,
    /// and no longer than two whole notes.
    pub fn new(durations: Vec<f64>) -> Result<Self, ConfigError> {
        if durations.is_empty() {
            return Err(ConfigError::EmptyRhythmPattern);
        }
        for &beats in &durations {
            if !beats.is_finite() || beats <= 0.0 || beats > 8.0 {
                return Err(ConfigError::InvalidNoteDuration(beats));
            }
        }
        Ok(RhythmPattern { durations })
    }

    /// Straight quarter notes
    pub fn quarter_notes() -> Self {
        RhythmPattern {
            durations: vec![1.0],
        }
    }

    pub fn durations(&self) -> &[f64] {
        &self.durations
    }

    /// Shortest duration in the pattern, in beats
    pub fn shortest(&self) -> f64 {
        self.durations.iter().copied().fold(f64::MAX, f64::min)
    }
}
