// Tonal scales and pitch mapping
// Pitch-class names, the fixed 12-tone MIDI mapping, and per-hand octave ranges

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Semitone offset within an octave for a pitch-class name like "C", "F#", "Bb"
pub fn pitch_class_semitone(name: &str) -> Result<u8, ConfigError> {
    let mut chars = name.chars();
    let step = match chars.next() {
        Some(c) => c.to_ascii_uppercase(),
        None => return Err(ConfigError::UnknownPitchClass(name.to_string())),
    };

    let base: i32 = match step {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return Err(ConfigError::UnknownPitchClass(name.to_string())),
    };

    let alter: i32 = match chars.as_str() {
        "" => 0,
        "#" => 1,
        "b" => -1,
        _ => return Err(ConfigError::UnknownPitchClass(name.to_string())),
    };

    Ok((base + alter).rem_euclid(12) as u8)
}

/// Fixed 12-tone-per-octave MIDI mapping (C4 = 60)
pub fn midi_pitch(semitone: u8, octave: i32) -> u8 {
    let midi = 12 * (octave + 1) + semitone as i32;
    midi.clamp(0, 127) as u8
}

/// An ordered tonal scale: pitch-class names listed ascending from the root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scale {
    name: String,
    pitch_classes: Vec<String>,
    /// Ascending semitone offsets from the root, one per pitch class
    intervals: Vec<u8>,
    root_semitone: u8,
}

impl Scale {
    /// Look up a built-in scale by its snake_case name
    pub fn by_name(name: &str) -> Result<Scale, ConfigError> {
        let classes: &[&str] = match name {
            "c_major" => &["C", "D", "E", "F", "G", "A", "B"],
            "g_major" => &["G", "A", "B", "C", "D", "E", "F#"],
            "d_major" => &["D", "E", "F#", "G", "A", "B", "C#"],
            "f_major" => &["F", "G", "A", "Bb", "C", "D", "E"],
            "a_minor" => &["A", "B", "C", "D", "E", "F", "G"],
            "e_minor" => &["E", "F#", "G", "A", "B", "C", "D"],
            "c_major_pentatonic" => &["C", "D", "E", "G", "A"],
            "chromatic" => &[
                "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
            ],
            _ => return Err(ConfigError::UnknownScale(name.to_string())),
        };

        Scale::from_pitch_classes(name, classes.iter().map(|s| s.to_string()).collect())
    }

    /// Build a scale from an explicit ordered list of pitch-class names
    pub fn from_pitch_classes(name: &str, pitch_classes: Vec<String>) -> Result<Scale, ConfigError> {
        if pitch_classes.is_empty() {
            return Err(ConfigError::UnknownScale(name.to_string()));
        }

        let root_semitone = pitch_class_semitone(&pitch_classes[0])?;
        let mut intervals = Vec::with_capacity(pitch_classes.len());
        for class in &pitch_classes {
            let semitone = pitch_class_semitone(class)?;
            intervals.push((semitone as i32 - root_semitone as i32).rem_euclid(12) as u8);
        }

        Ok(Scale {
            name: name.to_string(),
            pitch_classes,
            intervals,
            root_semitone,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pitch_classes(&self) -> &[String] {
        &self.pitch_classes
    }

    /// Number of scale degrees per octave
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// MIDI pitch for a scale degree in the given octave.
    /// Degrees at or beyond `len()` wrap into the next octave, so a second
    /// voice that crosses the scale boundary is transposed up rather than
    /// folding back below the root.
    pub fn pitch_at(&self, degree: usize, octave: i32) -> u8 {
        let bump = (degree / self.intervals.len()) as i32;
        let interval = self.intervals[degree % self.intervals.len()];
        midi_pitch(self.root_semitone + interval, octave + bump)
    }
}

/// Inclusive octave range a hand draws pitches from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OctaveRange {
    pub low: i32,
    pub high: i32,
}

impl OctaveRange {
    pub fn new(low: i32, high: i32) -> Result<Self, ConfigError> {
        if low > high || low < -1 || high > 7 {
            return Err(ConfigError::InvalidOctaveRange { low, high });
        }
        Ok(OctaveRange { low, high })
    }

    /// Default treble range
    pub fn right_hand() -> Self {
        OctaveRange { low: 4, high: 5 }
    }

    /// Default bass range
    pub fn left_hand() -> Self {
        OctaveRange { low: 2, high: 3 }
    }

    /// Number of octaves in the range
    pub fn span(&self) -> usize {
        (self.high - self.low + 1) as usize
    }

    /// Octave at `index` counted from the bottom of the range
    pub fn octave_at(&self, index: usize) -> i32 {
        self.low + (index as i32).min(self.high - self.low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_class_semitones() {
        assert_eq!(pitch_class_semitone("C").unwrap(), 0);
        assert_eq!(pitch_class_semitone("F#").unwrap(), 6);
        assert_eq!(pitch_class_semitone("Bb").unwrap(), 10);
        assert_eq!(pitch_class_semitone("Cb").unwrap(), 11);
        assert!(pitch_class_semitone("H").is_err());
        assert!(pitch_class_semitone("").is_err());
    }

    #[test]
    fn test_midi_mapping() {
        assert_eq!(midi_pitch(0, 4), 60); // C4
        assert_eq!(midi_pitch(9, 4), 69); // A4
        assert_eq!(midi_pitch(10, 3), 58); // Bb3
    }

    #[test]
    fn test_c_major_degrees() {
        let scale = Scale::by_name("c_major").unwrap();
        assert_eq!(scale.len(), 7);
        assert_eq!(scale.pitch_at(0, 4), 60); // C4
        assert_eq!(scale.pitch_at(4, 4), 67); // G4
        assert_eq!(scale.pitch_at(7, 4), 72); // wraps to C5
    }

    #[test]
    fn test_wraparound_stays_ascending() {
        // G major crosses the letter boundary at C: the C above G4 must be C5
        let scale = Scale::by_name("g_major").unwrap();
        assert_eq!(scale.pitch_at(0, 4), 67); // G4
        assert_eq!(scale.pitch_at(3, 4), 72); // C5, not C4
        assert_eq!(scale.pitch_at(6, 4), 78); // F#5
        assert_eq!(scale.pitch_at(7, 4), 79); // G5

        // Every consecutive degree pair ascends
        for degree in 0..14 {
            assert!(
                scale.pitch_at(degree + 1, 3) > scale.pitch_at(degree, 3),
                "degree {} not ascending",
                degree
            );
        }
    }

    #[test]
    fn test_unknown_scale() {
        assert!(matches!(
            Scale::by_name("h_locrian"),
            Err(ConfigError::UnknownScale(_))
        ));
    }

    #[test]
    fn test_octave_range_validation() {
        assert!(OctaveRange::new(4, 5).is_ok());
        assert!(OctaveRange::new(5, 4).is_err());
        assert!(OctaveRange::new(-2, 4).is_err());
    }

    #[test]
    fn test_octave_range_span() {
        let range = OctaveRange::new(2, 3).unwrap();
        assert_eq!(range.span(), 2);
        assert_eq!(range.octave_at(0), 2);
        assert_eq!(range.octave_at(1), 3);
        assert_eq!(range.octave_at(9), 3); // clamped
    }
}
