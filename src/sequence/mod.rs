// Sequence generation - scales, rhythm patterns, and the note generator
// Produces the ordered Expected Note Events a session asks the performer to play

pub mod generator;
pub mod rhythm;
pub mod scale;
pub mod types;

// Re-export main types
pub use generator::{generate, reindex, GeneratorConfig, GroupingMode};
pub use rhythm::RhythmPattern;
pub use scale::{midi_pitch, pitch_class_semitone, OctaveRange, Scale};
pub use types::{ExpectedNote, Hand};
