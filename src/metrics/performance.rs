// Performance tracking
// Accumulates per-note outcomes and streaks, then derives the session's
// accuracy, pace, consistency, composite score, and letter grade

use serde::{Deserialize, Serialize};

use crate::metrics::mistakes::{MistakeCategory, MistakeRecord};

/// Letter grade ladder over the composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::AMinus => "A-",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::BMinus => "B-",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

/// Fixed threshold ladder from A+ at 0.95 down to F below 0.5
pub fn letter_grade(score: f64) -> Grade {
    if score >= 0.95 {
        Grade::APlus
    } else if score >= 0.90 {
        Grade::A
    } else if score >= 0.85 {
        Grade::AMinus
    } else if score >= 0.80 {
        Grade::BPlus
    } else if score >= 0.75 {
        Grade::B
    } else if score >= 0.70 {
        Grade::BMinus
    } else if score >= 0.65 {
        Grade::CPlus
    } else if score >= 0.60 {
        Grade::C
    } else if score >= 0.50 {
        Grade::D
    } else {
        Grade::F
    }
}

/// Derived session-level performance figures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub notes_progressed: u32,
    pub error_count: u32,

    /// Correct notes over total attempts counted
    pub note_accuracy: f64,

    /// Correct notes per minute of play
    pub performed_bpm: f64,

    pub elapsed_secs: f64,

    pub longest_streak: u32,
    pub average_streak: f64,

    /// Mean streak length relative to notes progressed, clamped to [0, 1]
    pub consistency_score: f64,

    /// 0.4 accuracy + 0.3 consistency + 0.3 pace (pace saturates at 60 BPM)
    pub overall_score: f64,

    pub grade: Grade,
}

/// Event log and accumulator for per-note outcomes. One instance per
/// session; reads are idempotent.
#[derive(Debug, Clone, Default)]
pub struct PerformanceTracker {
    started_at: Option<f64>,
    ended_at: Option<f64>,
    notes_progressed: u32,
    mistakes: Vec<MistakeRecord>,
    current_streak: u32,
    longest_streak: u32,
    streak_history: Vec<u32>,
}

impl PerformanceTracker {
    pub fn new() -> Self {
        PerformanceTracker::default()
    }

    /// Mark the session start. Recording methods anchor it lazily if this
    /// was never called.
    pub fn begin(&mut self, now: f64) {
        self.started_at.get_or_insert(now);
    }

    pub fn record_correct_note(&mut self, now: f64) {
        self.begin(now);
        self.notes_progressed += 1;
        self.current_streak += 1;
        self.longest_streak = self.longest_streak.max(self.current_streak);
    }

    pub fn record_wrong_note(&mut self, now: f64, pitch: u8, sequence_index: usize) {
        self.record_mistake(MistakeRecord {
            category: MistakeCategory::WrongPitch,
            timestamp: now,
            pitch: Some(pitch),
            sequence_index: Some(sequence_index),
        });
    }

    pub fn record_early_note(&mut self, now: f64, sequence_index: usize) {
        self.record_mistake(MistakeRecord {
            category: MistakeCategory::TooEarly,
            timestamp: now,
            pitch: None,
            sequence_index: Some(sequence_index),
        });
    }

    pub fn record_unexpected_note(&mut self, now: f64, pitch: u8) {
        self.record_mistake(MistakeRecord {
            category: MistakeCategory::Unexpected,
            timestamp: now,
            pitch: Some(pitch),
            sequence_index: None,
        });
    }

    fn record_mistake(&mut self, record: MistakeRecord) {
        self.begin(record.timestamp);
        if self.current_streak > 0 {
            self.streak_history.push(self.current_streak);
            self.current_streak = 0;
        }
        self.mistakes.push(record);
    }

    pub fn end_session(&mut self, now: f64) {
        self.ended_at.get_or_insert(now);
    }

    pub fn mistakes(&self) -> &[MistakeRecord] {
        &self.mistakes
    }

    pub fn notes_progressed(&self) -> u32 {
        self.notes_progressed
    }

    pub fn error_count(&self) -> u32 {
        self.mistakes.len() as u32
    }

    pub fn note_accuracy(&self) -> f64 {
        let total = self.notes_progressed + self.error_count();
        if total == 0 {
            0.0
        } else {
            self.notes_progressed as f64 / total as f64
        }
    }

    fn elapsed_secs(&self) -> f64 {
        match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) if end > start && (end - start).is_finite() => end - start,
            _ => 0.0,
        }
    }

    /// Streak lengths including the still-open run
    fn streaks(&self) -> Vec<u32> {
        let mut streaks = self.streak_history.clone();
        if self.current_streak > 0 {
            streaks.push(self.current_streak);
        }
        streaks
    }

    pub fn summary(&self) -> PerformanceSummary {
        let elapsed = self.elapsed_secs();
        let performed_bpm = if elapsed > 0.0 {
            self.notes_progressed as f64 / elapsed * 60.0
        } else {
            0.0
        };

        let streaks = self.streaks();
        let average_streak = if streaks.is_empty() {
            0.0
        } else {
            streaks.iter().map(|&s| s as f64).sum::<f64>() / streaks.len() as f64
        };
        let consistency_score = if self.notes_progressed == 0 {
            0.0
        } else {
            (average_streak / self.notes_progressed as f64).clamp(0.0, 1.0)
        };

        let note_accuracy = self.note_accuracy();
        let pace = (performed_bpm / 60.0).min(1.0);
        let overall_score = 0.4 * note_accuracy + 0.3 * consistency_score + 0.3 * pace;

        PerformanceSummary {
            notes_progressed: self.notes_progressed,
            error_count: self.error_count(),
            note_accuracy,
            performed_bpm,
            elapsed_secs: elapsed,
            longest_streak: self.longest_streak,
            average_streak,
            consistency_score,
            overall_score,
            grade: letter_grade(overall_score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nine_correct_one_wrong_in_middle() {
        let mut tracker = PerformanceTracker::new();
        tracker.begin(0.0);
        for i in 0..4 {
            tracker.record_correct_note(i as f64);
        }
        tracker.record_wrong_note(4.0, 61, 4);
        for i in 5..10 {
            tracker.record_correct_note(i as f64);
        }
        tracker.end_session(10.0);

        let summary = tracker.summary();
        assert_eq!(summary.notes_progressed, 9);
        assert_eq!(summary.error_count, 1);
        assert!((summary.note_accuracy - 0.9).abs() < 1e-9);
        // Runs of 4 and 5: the longer one wins
        assert_eq!(summary.longest_streak, 5);
        assert!((summary.average_streak - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_contiguous_corrects_keep_full_streak() {
        let mut tracker = PerformanceTracker::new();
        tracker.begin(0.0);
        tracker.record_wrong_note(0.5, 61, 0);
        for i in 1..10 {
            tracker.record_correct_note(i as f64);
        }
        tracker.end_session(10.0);

        let summary = tracker.summary();
        assert_eq!(summary.longest_streak, 9);
        assert!((summary.consistency_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_performed_bpm() {
        let mut tracker = PerformanceTracker::new();
        tracker.begin(0.0);
        for i in 0..30 {
            tracker.record_correct_note(i as f64);
        }
        tracker.end_session(30.0);

        // 30 notes in 30 seconds is 60 notes per minute
        let summary = tracker.summary();
        assert!((summary.performed_bpm - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_session() {
        let tracker = PerformanceTracker::new();
        let summary = tracker.summary();

        assert_eq!(summary.notes_progressed, 0);
        assert_eq!(summary.note_accuracy, 0.0);
        assert_eq!(summary.performed_bpm, 0.0);
        assert_eq!(summary.grade, Grade::F);
    }

    #[test]
    fn test_longest_streak_never_decreases() {
        let mut tracker = PerformanceTracker::new();
        for i in 0..6 {
            tracker.record_correct_note(i as f64);
        }
        assert_eq!(tracker.summary().longest_streak, 6);

        tracker.record_wrong_note(6.0, 61, 6);
        tracker.record_correct_note(7.0);
        assert_eq!(tracker.summary().longest_streak, 6);
    }

    #[test]
    fn test_grade_ladder() {
        assert_eq!(letter_grade(0.97), Grade::APlus);
        assert_eq!(letter_grade(0.95), Grade::APlus);
        assert_eq!(letter_grade(0.92), Grade::A);
        assert_eq!(letter_grade(0.82), Grade::BPlus);
        assert_eq!(letter_grade(0.71), Grade::BMinus);
        assert_eq!(letter_grade(0.60), Grade::C);
        assert_eq!(letter_grade(0.50), Grade::D);
        assert_eq!(letter_grade(0.49), Grade::F);
    }

    #[test]
    fn test_perfect_run_scores_high() {
        let mut tracker = PerformanceTracker::new();
        tracker.begin(0.0);
        for i in 0..60 {
            tracker.record_correct_note(i as f64 * 0.5);
        }
        tracker.end_session(30.0);

        // Accuracy 1.0, one unbroken streak, 120 notes/min saturates pace
        let summary = tracker.summary();
        assert!((summary.overall_score - 1.0).abs() < 1e-9);
        assert_eq!(summary.grade, Grade::APlus);
    }
}
