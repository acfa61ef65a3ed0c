// Expected note events
// The immutable scheduled units the performer is asked to play

use serde::{Deserialize, Serialize};

/// Which hand (staff) a scheduled note belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hand {
    /// Bass staff
    Left,

    /// Treble staff
    Right,

    /// Both staves at once (combined-hands grouping)
    Both,
}

/// One scheduled unit of required input: a target onset time and the set of
/// pitches that must be held simultaneously to satisfy it.
/// Immutable once generated; ordered by `sequence_index`/`start_time`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedNote {
    /// Position in the generated sequence (0-indexed)
    pub sequence_index: usize,

    /// Target onset in seconds, relative to the sequence origin
    pub start_time: f64,

    /// Nominal duration in seconds
    pub duration: f64,

    /// Required MIDI pitch ids, sorted and deduplicated
    pub pitches: Vec<u8>,

    /// Staff the note is displayed on
    pub hand: Hand,
}

impl ExpectedNote {
    /// Create a note, normalizing the pitch set (sorted, deduplicated)
    pub fn new(
        sequence_index: usize,
        start_time: f64,
        duration: f64,
        mut pitches: Vec<u8>,
        hand: Hand,
    ) -> Self {
        pitches.sort_unstable();
        pitches.dedup();
        ExpectedNote {
            sequence_index,
            start_time,
            duration,
            pitches,
            hand,
        }
    }

    /// End of the note's nominal duration, in seconds from the origin
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Whether the given pitch is part of the required set
    pub fn requires(&self, pitch: u8) -> bool {
        self.pitches.binary_search(&pitch).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_set_normalized() {
        let note = ExpectedNote::new(0, 0.0, 1.0, vec![64, 60, 64], Hand::Right);
        assert_eq!(note.pitches, vec![60, 64]);
    }

    #[test]
    fn test_requires() {
        let note = ExpectedNote::new(0, 0.0, 1.0, vec![60, 64, 67], Hand::Right);
        assert!(note.requires(64));
        assert!(!note.requires(65));
    }

    #[test]
    fn test_end_time() {
        let note = ExpectedNote::new(3, 1.5, 0.5, vec![62], Hand::Left);
        assert!((note.end_time() - 2.0).abs() < 1e-9);
    }
}
