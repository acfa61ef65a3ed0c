// Timing analysis - classification thresholds and the attempt analyzer
// Judges when each note landed relative to its target and keeps the
// sequence origin honest across pauses and corrections

pub mod analyzer;
pub mod thresholds;

// Re-export main types
pub use analyzer::{
    NoteJudgment, PauseMetrics, Recalibration, RecalibrationPolicy, RecalibrationStrategy,
    TimingAnalyzer, TimingCategory, TimingMetrics, TimingPattern,
};
pub use thresholds::{timing_score, ThresholdConfig, TimingThresholds};
