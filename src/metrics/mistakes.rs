// Mistake analysis
// Groups the session's error log by category and turns repeated patterns
// into short practice recommendations

use serde::{Deserialize, Serialize};

/// Category of a recorded mistake. These are first-class outcomes, not
/// errors: they feed the grade, they are never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MistakeCategory {
    /// A pitch outside the current note's required set
    WrongPitch,

    /// An attempt ahead of the early threshold that forced a replay
    TooEarly,

    /// Input arriving after the sequence was exhausted
    Unexpected,
}

/// One entry in the error log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MistakeRecord {
    pub category: MistakeCategory,

    /// Wall-clock seconds when the mistake was made
    pub timestamp: f64,

    /// The offending pitch, when one was involved
    pub pitch: Option<u8>,

    /// The expected note the mistake was made against, if any
    pub sequence_index: Option<usize>,
}

/// A recurring tendency worth calling out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MistakePattern {
    /// Repeated too-early replays: the performer rushes ahead of the beat
    RushesAhead,

    /// Repeated wrong pitches: a note-reading challenge
    NoteReading,

    /// Repeated input beyond the sequence: stray extra notes
    StrayNotes,
}

/// Grouped counts, detected patterns, and advisory text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MistakeAnalysis {
    pub wrong_pitch: u32,
    pub too_early: u32,
    pub unexpected: u32,
    pub patterns: Vec<MistakePattern>,
    pub recommendations: Vec<String>,
}

/// Threshold above which a category becomes a pattern
const PATTERN_THRESHOLD: u32 = 3;

/// Group the error log and derive patterns and recommendations. The
/// recommendation list is always non-empty and consistent with the counts.
pub fn analyze_mistakes(records: &[MistakeRecord]) -> MistakeAnalysis {
    let mut wrong_pitch = 0;
    let mut too_early = 0;
    let mut unexpected = 0;
    for record in records {
        match record.category {
            MistakeCategory::WrongPitch => wrong_pitch += 1,
            MistakeCategory::TooEarly => too_early += 1,
            MistakeCategory::Unexpected => unexpected += 1,
        }
    }

    let mut patterns = Vec::new();
    let mut recommendations = Vec::new();

    if too_early > PATTERN_THRESHOLD {
        patterns.push(MistakePattern::RushesAhead);
        recommendations.push(format!(
            "You rushed ahead {} times. Let the beat come to you instead of anticipating it.",
            too_early
        ));
    }
    if wrong_pitch > PATTERN_THRESHOLD {
        patterns.push(MistakePattern::NoteReading);
        recommendations.push(format!(
            "{} wrong pitches suggests a note-reading challenge. Slow the tempo and name each note before playing it.",
            wrong_pitch
        ));
    }
    if unexpected > PATTERN_THRESHOLD {
        patterns.push(MistakePattern::StrayNotes);
        recommendations.push(format!(
            "{} notes landed after the sequence ended. Watch for the final bar line.",
            unexpected
        ));
    }

    if recommendations.is_empty() {
        if records.is_empty() {
            recommendations
                .push("Clean run! Raise the tempo or try a denser rhythm pattern.".to_string());
        } else {
            recommendations.push(
                "Mistakes were scattered rather than systematic. Keep practicing at this level."
                    .to_string(),
            );
        }
    }

    MistakeAnalysis {
        wrong_pitch,
        too_early,
        unexpected,
        patterns,
        recommendations,
    }
}
