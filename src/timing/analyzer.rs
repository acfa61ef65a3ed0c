// Timing analysis
// Classifies note attempts against a floating sequence origin, absorbs
// pauses, owns the recalibration protocol, and aggregates timing metrics

use serde::{Deserialize, Serialize};

use crate::sequence::types::ExpectedNote;
use crate::timing::thresholds::{timing_score, ThresholdConfig, TimingThresholds};

/// Timing verdict for one note attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingCategory {
    /// Within the accurate window
    Accurate,

    /// Ahead of target but acceptable
    Early,

    /// Behind target but acceptable
    Late,

    /// Too far ahead; the note must be replayed and nothing advances
    TooEarly,

    /// Past the late threshold; the overshoot is absorbed into the origin
    Pause,
}

/// One classified attempt. Appended to the analyzer's log for every final
/// verdict; too-early verdicts are returned but not logged, since the note
/// is not yet satisfied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteJudgment {
    pub sequence_index: usize,

    /// Target onset from the generated sequence, seconds from the origin
    pub expected_start: f64,

    /// Seconds elapsed since the origin when the attempt landed
    /// (recomputed under the shifted origin for pause verdicts)
    pub actual_elapsed: f64,

    /// Signed seconds relative to the target; negative = early
    pub drift: f64,

    pub category: TimingCategory,

    /// Continuous credit in [0, 1]; pauses score zero
    pub timing_score: f64,
}

/// Accumulated pause statistics
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PauseMetrics {
    pub count: u32,
    pub total_secs: f64,
    pub min_secs: f64,
    pub max_secs: f64,
}

/// Tendency detected over the most recent non-pause judgments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingPattern {
    ConsistentlyEarly,
    ConsistentlyLate,
    Inconsistent,
    Balanced,
    InsufficientData,
}

/// Aggregate timing output, idempotent with respect to the judgment log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingMetrics {
    /// Mean timing score across all logged judgments
    pub timing_accuracy: f64,

    /// 1 minus the drift spread among non-pause judgments, normalized by
    /// the 200 ms score floor and clamped to [0, 1]
    pub timing_precision: f64,

    /// Mean signed drift among non-pause judgments
    pub average_drift: f64,

    /// Most negative non-pause drift observed (0 if never early)
    pub max_early_drift: f64,

    /// Largest positive non-pause drift observed (0 if never late)
    pub max_late_drift: f64,

    pub pauses: PauseMetrics,

    pub pattern: TimingPattern,
}

/// Tunables for the training-wheels recalibration protocol. The sanity
/// bound separating the two re-anchor strategies is a policy knob, not a
/// derived quantity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RecalibrationPolicy {
    /// Drift magnitude beyond which the origin is re-based on the next
    /// note instead of re-anchoring on the resolved one
    pub sanity_bound_secs: f64,

    /// How many beats ahead of "now" the next note lands after a re-base
    pub grace_beats: f64,
}

impl Default for RecalibrationPolicy {
    fn default() -> Self {
        RecalibrationPolicy {
            sanity_bound_secs: 10.0,
            grace_beats: 1.0,
        }
    }
}

/// Which re-anchor strategy a recalibration applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecalibrationStrategy {
    /// Origin moved so the resolved note reads exactly on time, leaving the
    /// next note its full generated gap
    AlignToResolved,

    /// Origin re-based so the next note's onset lands one grace period away
    RebaseToNextNote,
}

/// Outcome of one recalibration, for logging and tests
#[derive(Debug, Clone, Copy)]
pub struct Recalibration {
    pub strategy: RecalibrationStrategy,
    pub old_origin: f64,
    pub new_origin: f64,
}

/// Owns the sequence origin and the judgment log. All origin mutation
/// funnels through `record_attempt` (pause absorption) and `recalibrate`.
pub struct TimingAnalyzer {
    thresholds: TimingThresholds,
    policy: RecalibrationPolicy,
    origin: Option<f64>,
    judgments: Vec<NoteJudgment>,
    pauses: PauseMetrics,
}

impl TimingAnalyzer {
    pub fn new(bpm: f64) -> Self {
        Self::with_config(bpm, &ThresholdConfig::default(), RecalibrationPolicy::default())
    }

    pub fn with_config(bpm: f64, config: &ThresholdConfig, policy: RecalibrationPolicy) -> Self {
        TimingAnalyzer {
            thresholds: TimingThresholds::with_config(bpm, config),
            policy,
            origin: None,
            judgments: Vec::new(),
            pauses: PauseMetrics::default(),
        }
    }

    pub fn thresholds(&self) -> &TimingThresholds {
        &self.thresholds
    }

    pub fn policy(&self) -> &RecalibrationPolicy {
        &self.policy
    }

    pub fn origin(&self) -> Option<f64> {
        self.origin
    }

    /// Anchor the origin if it has not been set yet. Without an explicit
    /// anchor, the first attempt's timestamp becomes the origin.
    pub fn start_at(&mut self, origin: f64) {
        self.origin.get_or_insert(origin);
    }

    /// Seconds elapsed since the origin, if anchored
    pub fn elapsed(&self, now: f64) -> Option<f64> {
        self.origin.map(|origin| now - origin)
    }

    pub fn judgments(&self) -> &[NoteJudgment] {
        &self.judgments
    }

    /// Classify one attempt at satisfying `note` at wall-clock `actual_time`.
    ///
    /// A pause verdict advances the origin by exactly the overshoot past the
    /// late threshold, so the note reads as barely on time and later notes
    /// are not charged for a delay that has already been absorbed. Too-early
    /// verdicts leave all state untouched; the caller must collect a replay.
    pub fn record_attempt(&mut self, note: &ExpectedNote, actual_time: f64) -> NoteJudgment {
        let origin = *self.origin.get_or_insert(actual_time);
        let mut elapsed = actual_time - origin;
        let mut drift = elapsed - note.start_time;
        let category = self.classify(drift);

        if category == TimingCategory::TooEarly {
            return NoteJudgment {
                sequence_index: note.sequence_index,
                expected_start: note.start_time,
                actual_elapsed: elapsed,
                drift,
                category,
                timing_score: 0.0,
            };
        }

        if category == TimingCategory::Pause {
            let pause_secs = drift - self.thresholds.late;
            // A non-finite timestamp must not poison the origin
            if pause_secs.is_finite() {
                self.origin = Some(origin + pause_secs);
                self.record_pause(pause_secs);
                elapsed -= pause_secs;
                drift -= pause_secs;
            }
        }

        let score = if category == TimingCategory::Pause {
            0.0
        } else {
            timing_score(drift)
        };

        let judgment = NoteJudgment {
            sequence_index: note.sequence_index,
            expected_start: note.start_time,
            actual_elapsed: elapsed,
            drift,
            category,
            timing_score: score,
        };
        self.judgments.push(judgment.clone());
        judgment
    }

    fn classify(&self, drift: f64) -> TimingCategory {
        if drift.abs() <= self.thresholds.accurate {
            TimingCategory::Accurate
        } else if drift < -self.thresholds.early {
            TimingCategory::TooEarly
        } else if drift > self.thresholds.late {
            TimingCategory::Pause
        } else if drift < 0.0 {
            TimingCategory::Early
        } else {
            TimingCategory::Late
        }
    }

    fn record_pause(&mut self, pause_secs: f64) {
        if !pause_secs.is_finite() {
            return;
        }
        if self.pauses.count == 0 {
            self.pauses.min_secs = pause_secs;
            self.pauses.max_secs = pause_secs;
        } else {
            self.pauses.min_secs = self.pauses.min_secs.min(pause_secs);
            self.pauses.max_secs = self.pauses.max_secs.max(pause_secs);
        }
        self.pauses.count += 1;
        self.pauses.total_secs += pause_secs;
    }

    /// Training-wheels re-anchor after an out-of-tolerance resolution.
    ///
    /// The new origin is always computed from the resolved note's original
    /// generated `start_time`, never a previously-adjusted copy, so repeated
    /// corrections cannot compound. `observed_drift` is the drift the caller
    /// measured when the note resolved (before any pause absorption).
    /// Within the sanity bound the origin shifts so the resolved note reads
    /// exactly on time and the next note keeps its full generated gap;
    /// beyond it (or when the drift is not finite) the origin is re-based so
    /// the next note's onset lands `grace_beats` from now instead of
    /// rewinding across a pathological gap.
    pub fn recalibrate(
        &mut self,
        resolved: &ExpectedNote,
        next_start: Option<f64>,
        now: f64,
        observed_drift: f64,
    ) -> Recalibration {
        let old_origin = self.origin.unwrap_or(now);

        let rebase =
            !observed_drift.is_finite() || observed_drift.abs() > self.policy.sanity_bound_secs;
        let (strategy, new_origin) = if rebase {
            let anchor = match next_start {
                Some(next) => now + self.policy.grace_beats * self.thresholds.beat_duration - next,
                None => now - resolved.start_time,
            };
            (RecalibrationStrategy::RebaseToNextNote, anchor)
        } else {
            (
                RecalibrationStrategy::AlignToResolved,
                now - resolved.start_time,
            )
        };

        self.origin = Some(new_origin);

        let recalibration = Recalibration {
            strategy,
            old_origin,
            new_origin,
        };
        match strategy {
            RecalibrationStrategy::AlignToResolved => log::debug!(
                "recalibrated origin by {:.3}s after note {}",
                new_origin - old_origin,
                resolved.sequence_index
            ),
            RecalibrationStrategy::RebaseToNextNote => log::warn!(
                "drift {:.1}s past sanity bound; re-based origin after note {}",
                observed_drift,
                resolved.sequence_index
            ),
        }
        recalibration
    }

    /// Aggregate timing metrics over the judgment log. Non-finite drifts are
    /// excluded from every statistic so a single corrupted timestamp cannot
    /// poison the session.
    pub fn timing_metrics(&self) -> TimingMetrics {
        let usable: Vec<&NoteJudgment> = self
            .judgments
            .iter()
            .filter(|j| j.drift.is_finite())
            .collect();

        let timing_accuracy = if usable.is_empty() {
            0.0
        } else {
            usable.iter().map(|j| j.timing_score).sum::<f64>() / usable.len() as f64
        };

        let drifts: Vec<f64> = usable
            .iter()
            .filter(|j| j.category != TimingCategory::Pause)
            .map(|j| j.drift)
            .collect();

        let average_drift = if drifts.is_empty() {
            0.0
        } else {
            drifts.iter().sum::<f64>() / drifts.len() as f64
        };

        let timing_precision = if drifts.is_empty() {
            0.0
        } else {
            let variance = drifts
                .iter()
                .map(|d| (d - average_drift).powi(2))
                .sum::<f64>()
                / drifts.len() as f64;
            (1.0 - variance.sqrt() / 0.2).clamp(0.0, 1.0)
        };

        TimingMetrics {
            timing_accuracy,
            timing_precision,
            average_drift,
            max_early_drift: drifts.iter().copied().fold(0.0, f64::min),
            max_late_drift: drifts.iter().copied().fold(0.0, f64::max),
            pauses: self.pauses,
            pattern: detect_pattern(&drifts),
        }
    }
}

/// Tendency over the last 10 usable non-pause drifts: 70% beyond 20 ms on
/// one side reads as a consistent lean; a near-zero mean with wide spread
/// reads as inconsistent.
fn detect_pattern(drifts: &[f64]) -> TimingPattern {
    let window: Vec<f64> = drifts.iter().rev().take(10).copied().collect();
    if window.len() < 3 {
        return TimingPattern::InsufficientData;
    }

    let n = window.len() as f64;
    let early = window.iter().filter(|&&d| d < -0.020).count() as f64;
    let late = window.iter().filter(|&&d| d > 0.020).count() as f64;

    if early / n >= 0.70 {
        return TimingPattern::ConsistentlyEarly;
    }
    if late / n >= 0.70 {
        return TimingPattern::ConsistentlyLate;
    }

    let mean = window.iter().sum::<f64>() / n;
    let stddev = (window.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n).sqrt();
    if mean.abs() <= 0.020 && stddev > 0.050 {
        TimingPattern::Inconsistent
    } else {
        TimingPattern::Balanced
    }
}
