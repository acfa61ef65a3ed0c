// Sequence generation
// Draws randomized note sequences from a scale, grouping mode, and rhythm
// pattern, or passes a pre-authored sequence through with fresh indices

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::sequence::rhythm::RhythmPattern;
use crate::sequence::scale::{OctaveRange, Scale};
use crate::sequence::types::{ExpectedNote, Hand};

/// How pitch content is drawn for each generated note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    /// One right-hand pitch per note
    SingleNote,

    /// Two right-hand pitches a third, fourth, or fifth apart
    Interval,

    /// A stacked-third triad in the right hand
    Chord,

    /// One left-hand pitch and one right-hand pitch together
    HandsCombined,
}

impl GroupingMode {
    /// Parse a snake_case mode name; unknown names are a configuration error
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name {
            "single_note" => Ok(GroupingMode::SingleNote),
            "interval" => Ok(GroupingMode::Interval),
            "chord" => Ok(GroupingMode::Chord),
            "hands_combined" => Ok(GroupingMode::HandsCombined),
            _ => Err(ConfigError::UnknownGroupingMode(name.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupingMode::SingleNote => "single_note",
            GroupingMode::Interval => "interval",
            GroupingMode::Chord => "chord",
            GroupingMode::HandsCombined => "hands_combined",
        }
    }
}

/// Everything the generator needs, already validated
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub scale: Scale,
    pub grouping: GroupingMode,
    pub rhythm: RhythmPattern,
    pub bpm: f64,
    pub right_hand: OctaveRange,
    pub left_hand: OctaveRange,
}

/// Generate an ordered note sequence covering `target_duration_secs`.
///
/// Tempo converts to beats per second; a running beat counter places each
/// note at `beats / beats_per_sec`, with duration and pitch content drawn
/// from the rhythm pattern and grouping mode. Generation stops once the
/// counter reaches the beat equivalent of the requested duration, so the
/// last note ends within one duration of the target.
pub fn generate(
    config: &GeneratorConfig,
    target_duration_secs: f64,
    rng: &mut fastrand::Rng,
) -> Vec<ExpectedNote> {
    let beats_per_sec = config.bpm / 60.0;
    let target_beats = target_duration_secs * beats_per_sec;

    let mut notes = Vec::new();
    let mut beats = 0.0;

    while beats < target_beats {
        let duration_beats = draw_duration(&config.rhythm, rng);
        let (pitches, hand) = draw_pitches(config, rng);

        notes.push(ExpectedNote::new(
            notes.len(),
            beats / beats_per_sec,
            duration_beats / beats_per_sec,
            pitches,
            hand,
        ));

        beats += duration_beats;
    }

    notes
}

/// Pass a pre-authored sequence through unmodified except for assigning
/// sequential indices.
pub fn reindex(mut notes: Vec<ExpectedNote>) -> Vec<ExpectedNote> {
    for (index, note) in notes.iter_mut().enumerate() {
        note.sequence_index = index;
    }
    notes
}

fn draw_duration(rhythm: &RhythmPattern, rng: &mut fastrand::Rng) -> f64 {
    let durations = rhythm.durations();
    durations[rng.usize(0..durations.len())]
}

fn draw_octave(range: &OctaveRange, rng: &mut fastrand::Rng) -> i32 {
    range.octave_at(rng.usize(0..range.span()))
}

fn draw_pitches(config: &GeneratorConfig, rng: &mut fastrand::Rng) -> (Vec<u8>, Hand) {
    let scale = &config.scale;
    let degrees = scale.len();

    match config.grouping {
        GroupingMode::SingleNote => {
            let octave = draw_octave(&config.right_hand, rng);
            let pitch = scale.pitch_at(rng.usize(0..degrees), octave);
            (vec![pitch], Hand::Right)
        }
        GroupingMode::Interval => {
            let octave = draw_octave(&config.right_hand, rng);
            let root = rng.usize(0..degrees);
            // 2..=4 scale steps above the root: a third, fourth, or fifth.
            // pitch_at handles the octave bump when the voice wraps.
            let offset = rng.usize(2..=4);
            let pitches = vec![scale.pitch_at(root, octave), scale.pitch_at(root + offset, octave)];
            (pitches, Hand::Right)
        }
        GroupingMode::Chord => {
            let octave = draw_octave(&config.right_hand, rng);
            let root = rng.usize(0..degrees);
            let pitches = vec![
                scale.pitch_at(root, octave),
                scale.pitch_at(root + 2, octave),
                scale.pitch_at(root + 4, octave),
            ];
            (pitches, Hand::Right)
        }
        GroupingMode::HandsCombined => {
            let left_octave = draw_octave(&config.left_hand, rng);
            let right_octave = draw_octave(&config.right_hand, rng);
            let pitches = vec![
                scale.pitch_at(rng.usize(0..degrees), left_octave),
                scale.pitch_at(rng.usize(0..degrees), right_octave),
            ];
            (pitches, Hand::Both)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(grouping: GroupingMode, rhythm: Vec<f64>, bpm: f64) -> GeneratorConfig {
        GeneratorConfig {
            scale: Scale::by_name("c_major").unwrap(),
            grouping,
            rhythm: RhythmPattern::new(rhythm).unwrap(),
            bpm,
            right_hand: OctaveRange::right_hand(),
            left_hand: OctaveRange::left_hand(),
        }
    }

    #[test]
    fn test_quarter_notes_at_60_bpm() {
        // One-beat pattern at 60 BPM over 10 seconds: exactly 10 notes at
        // whole-second onsets
        let cfg = config(GroupingMode::SingleNote, vec![1.0], 60.0);
        let mut rng = fastrand::Rng::with_seed(7);

        let notes = generate(&cfg, 10.0, &mut rng);
        assert_eq!(notes.len(), 10);
        for (i, note) in notes.iter().enumerate() {
            assert_eq!(note.sequence_index, i);
            assert!((note.start_time - i as f64).abs() < 1e-9);
            assert!((note.duration - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_onsets_strictly_increasing() {
        let cfg = config(GroupingMode::Interval, vec![0.5, 1.0, 2.0], 90.0);
        let mut rng = fastrand::Rng::with_seed(11);

        let notes = generate(&cfg, 30.0, &mut rng);
        assert!(notes.len() > 10);
        for pair in notes.windows(2) {
            assert!(pair[0].start_time < pair[1].start_time);
        }
    }

    #[test]
    fn test_covers_target_duration() {
        let cfg = config(GroupingMode::SingleNote, vec![0.5, 1.0], 120.0);
        let mut rng = fastrand::Rng::with_seed(3);

        let target = 20.0;
        let notes = generate(&cfg, target, &mut rng);
        let last = notes.last().unwrap();
        assert!(last.start_time < target);
        // Last event's end lands within one note duration of the target
        assert!(last.end_time() >= target - last.duration);
        assert!(last.end_time() <= target + last.duration);
    }

    #[test]
    fn test_interval_mode_draws_two_pitches() {
        let cfg = config(GroupingMode::Interval, vec![1.0], 100.0);
        let mut rng = fastrand::Rng::with_seed(5);

        for note in generate(&cfg, 20.0, &mut rng) {
            assert_eq!(note.pitches.len(), 2);
            assert_eq!(note.hand, Hand::Right);
            assert!(note.pitches[1] > note.pitches[0]);
        }
    }

    #[test]
    fn test_chord_mode_draws_triads() {
        let cfg = config(GroupingMode::Chord, vec![1.0], 100.0);
        let mut rng = fastrand::Rng::with_seed(5);

        for note in generate(&cfg, 20.0, &mut rng) {
            assert_eq!(note.pitches.len(), 3);
            assert!(note.pitches[0] < note.pitches[1] && note.pitches[1] < note.pitches[2]);
        }
    }

    #[test]
    fn test_hands_combined_spans_staves() {
        let cfg = config(GroupingMode::HandsCombined, vec![1.0], 100.0);
        let mut rng = fastrand::Rng::with_seed(9);

        let notes = generate(&cfg, 20.0, &mut rng);
        assert!(notes.iter().all(|n| n.hand == Hand::Both));
        // Left hand (octaves 2-3) sits below the right hand (octaves 4-5)
        assert!(notes.iter().all(|n| n.pitches[0] < 72));
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let cfg = config(GroupingMode::Chord, vec![0.5, 1.0], 110.0);

        let a = generate(&cfg, 15.0, &mut fastrand::Rng::with_seed(42));
        let b = generate(&cfg, 15.0, &mut fastrand::Rng::with_seed(42));
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.pitches, y.pitches);
            assert!((x.start_time - y.start_time).abs() < 1e-12);
        }
    }

    #[test]
    fn test_reindex_preserves_content() {
        let fixed = vec![
            ExpectedNote::new(10, 0.0, 1.0, vec![60], Hand::Right),
            ExpectedNote::new(99, 1.0, 1.0, vec![62], Hand::Right),
        ];
        let notes = reindex(fixed);
        assert_eq!(notes[0].sequence_index, 0);
        assert_eq!(notes[1].sequence_index, 1);
        assert_eq!(notes[1].pitches, vec![62]);
    }

    #[test]
    fn test_unknown_grouping_mode() {
        assert!(matches!(
            GroupingMode::from_name("tone_cluster"),
            Err(ConfigError::UnknownGroupingMode(_))
        ));
    }
}
