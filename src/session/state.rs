// Session play states
// An explicit tagged state machine with a single total transition function,
// so every (state, input) pair is enumerable in tests

use serde::{Deserialize, Serialize};

/// The three live-play states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayState {
    /// Normal advancement: metronome running, overdue checks active
    Playing,

    /// The current note went overdue; the performer must play it before the
    /// sequence moves on
    PausedForNote,

    /// Transient guard entered while a recalibrating correction is applied;
    /// no timeline edits are accepted until it completes
    Resuming,
}

/// Everything that can drive a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateInput {
    /// The periodic check found the current note past the late threshold
    NoteOverdue,

    /// The current note was attempted too early and must be replayed
    ReplayRequired,

    /// The current note was satisfied with a final verdict.
    /// `recalibrate` is set when drift left the tolerance band, the verdict
    /// was not already origin-adjusting, and training wheels are enabled.
    NoteResolved { recalibrate: bool },

    /// The timeline correction finished
    RecalibrationComplete,
}

/// Side effects the engine interprets after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    HaltMetronome,
    ResumeMetronome,
    /// Move to the next expected note and clear pressed pitches
    Advance,
    /// Keep the same note current and demand a fresh press of its pitches
    AwaitReplay,
    /// Re-anchor the sequence origin through the analyzer
    Recalibrate,
}

/// The single transition function. Total over (state, input); returns the
/// next state and the effects to apply, in order.
pub fn transition(state: PlayState, input: StateInput) -> (PlayState, Vec<Effect>) {
    use Effect::*;
    use PlayState::*;
    use StateInput::*;

    match (state, input) {
        (Playing, NoteOverdue) => (PausedForNote, vec![HaltMetronome]),
        (Playing, ReplayRequired) => (Playing, vec![AwaitReplay]),
        (Playing, NoteResolved { recalibrate: false }) => (Playing, vec![Advance]),
        (Playing, NoteResolved { recalibrate: true }) => (Resuming, vec![Advance, Recalibrate]),
        (Playing, RecalibrationComplete) => (Playing, vec![]),

        (PausedForNote, NoteOverdue) => (PausedForNote, vec![]),
        (PausedForNote, ReplayRequired) => (PausedForNote, vec![AwaitReplay]),
        (PausedForNote, NoteResolved { recalibrate: false }) => {
            (Playing, vec![Advance, ResumeMetronome])
        }
        (PausedForNote, NoteResolved { recalibrate: true }) => {
            (Resuming, vec![Advance, Recalibrate, ResumeMetronome])
        }
        (PausedForNote, RecalibrationComplete) => (PausedForNote, vec![]),

        // Resuming guards against re-entrant timeline edits: nothing but the
        // completion of the correction moves it
        (Resuming, RecalibrationComplete) => (Playing, vec![]),
        (Resuming, _) => (Resuming, vec![]),
    }
}
