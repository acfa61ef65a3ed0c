// Timing thresholds
// BPM-proportional classification windows and the continuous timing score

use serde::{Deserialize, Serialize};

/// Threshold multipliers applied to the beat duration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Fraction of a beat inside which an attempt counts as accurate
    pub accurate_frac: f64,

    /// Fraction of a beat ahead of which an attempt must be replayed
    pub early_frac: f64,

    /// Fraction of a beat behind which an attempt becomes a pause
    pub late_frac: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        ThresholdConfig {
            accurate_frac: 0.05,
            early_frac: 0.10,
            late_frac: 0.15,
        }
    }
}

/// Classification windows in seconds, derived once from tempo
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimingThresholds {
    /// Seconds per beat (60 / bpm)
    pub beat_duration: f64,

    /// |drift| at or below this is accurate
    pub accurate: f64,

    /// Drift below the negation of this requires a replay
    pub early: f64,

    /// Drift above this is a pause
    pub late: f64,
}

impl TimingThresholds {
    pub fn from_bpm(bpm: f64) -> Self {
        Self::with_config(bpm, &ThresholdConfig::default())
    }

    pub fn with_config(bpm: f64, config: &ThresholdConfig) -> Self {
        let beat_duration = 60.0 / bpm;
        TimingThresholds {
            beat_duration,
            accurate: beat_duration * config.accurate_frac,
            early: beat_duration * config.early_frac,
            late: beat_duration * config.late_frac,
        }
    }
}

/// Continuous timing score in [0, 1] from absolute drift.
///
/// Piecewise-linear: full credit within 25 ms, then linear segments down to
/// 0.75 at 50 ms, 0.5 at 100 ms, 0.25 at 200 ms, and zero beyond. Non-finite
/// drift scores zero.
pub fn timing_score(drift: f64) -> f64 {
    let abs = drift.abs();
    if !abs.is_finite() {
        return 0.0;
    }

    if abs <= 0.025 {
        1.0
    } else if abs <= 0.050 {
        1.0 - (abs - 0.025) / 0.025 * 0.25
    } else if abs <= 0.100 {
        0.75 - (abs - 0.050) / 0.050 * 0.25
    } else if abs <= 0.200 {
        0.50 - (abs - 0.100) / 0.100 * 0.25
    } else {
        0.0
    }
}
