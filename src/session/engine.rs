// Session engine
// Owns the pressed-pitch set and the current-note cursor, matches live input
// against the expected sequence, and routes verdicts into the analyzer and
// the performance tracker. All mutation happens on the caller's thread;
// exactly one note is ever in flight for judgment.

use std::collections::HashSet;

use crate::config::{Goal, ValidatedConfig};
use crate::metrics::mistakes::analyze_mistakes;
use crate::metrics::performance::PerformanceTracker;
use crate::metrics::result::SessionResult;
use crate::sequence::generator;
use crate::sequence::types::ExpectedNote;
use crate::session::state::{transition, Effect, PlayState, StateInput};
use crate::session::types::{InputKind, LiveInputEvent, NoteStatus, StatusUpdate};
use crate::timing::analyzer::{TimingAnalyzer, TimingCategory};

pub struct SessionEngine {
    notes: Vec<ExpectedNote>,
    cursor: usize,
    pressed: HashSet<u8>,
    awaiting_replay: bool,
    state: PlayState,
    analyzer: TimingAnalyzer,
    tracker: PerformanceTracker,
    training_wheels: bool,
    goal: Option<Goal>,
    completed_beats: f64,
    warned_current: bool,
    metronome_running: bool,
}

impl SessionEngine {
    pub fn new(
        notes: Vec<ExpectedNote>,
        bpm: f64,
        training_wheels: bool,
        goal: Option<Goal>,
    ) -> Self {
        SessionEngine {
            notes,
            cursor: 0,
            pressed: HashSet::new(),
            awaiting_replay: false,
            state: PlayState::Playing,
            analyzer: TimingAnalyzer::new(bpm),
            tracker: PerformanceTracker::new(),
            training_wheels,
            goal,
            completed_beats: 0.0,
            warned_current: false,
            metronome_running: false,
        }
    }

    /// Build an engine from a validated configuration, generating the
    /// sequence unless a fixed one was supplied.
    pub fn from_config(
        config: &ValidatedConfig,
        target_duration_secs: f64,
        rng: &mut fastrand::Rng,
    ) -> Self {
        let notes = match &config.fixed_sequence {
            Some(fixed) => generator::reindex(fixed.clone()),
            None => generator::generate(&config.generator, target_duration_secs, rng),
        };

        SessionEngine {
            notes,
            cursor: 0,
            pressed: HashSet::new(),
            awaiting_replay: false,
            state: PlayState::Playing,
            analyzer: TimingAnalyzer::with_config(
                config.generator.bpm,
                &config.thresholds,
                config.recalibration,
            ),
            tracker: PerformanceTracker::new(),
            training_wheels: config.training_wheels_enabled,
            goal: config.goal,
            completed_beats: 0.0,
            warned_current: false,
            metronome_running: false,
        }
    }

    /// Anchor the timeline and start the metronome. Must be called once when
    /// live play begins; input before this anchors the origin lazily.
    pub fn begin(&mut self, now: f64) {
        self.analyzer.start_at(now);
        self.tracker.begin(now);
        self.metronome_running = true;
        log::info!(
            "session started: {} notes, training wheels {}",
            self.notes.len(),
            if self.training_wheels { "on" } else { "off" }
        );
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn notes(&self) -> &[ExpectedNote] {
        &self.notes
    }

    /// Index of the note currently awaiting input, if any remain
    pub fn current_index(&self) -> Option<usize> {
        if self.cursor < self.notes.len() {
            Some(self.cursor)
        } else {
            None
        }
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.notes.len()
    }

    pub fn is_awaiting_replay(&self) -> bool {
        self.awaiting_replay
    }

    pub fn metronome_running(&self) -> bool {
        self.metronome_running
    }

    pub fn analyzer(&self) -> &TimingAnalyzer {
        &self.analyzer
    }

    pub fn tracker(&self) -> &PerformanceTracker {
        &self.tracker
    }

    /// Whether the configured goal has been met
    pub fn goal_reached(&self) -> bool {
        match self.goal {
            Some(goal) => {
                self.completed_beats >= goal.beats
                    && self.tracker.note_accuracy() >= goal.accuracy
            }
            None => false,
        }
    }

    /// Process one live input event. `off` events only release pressed
    /// pitches; `on` events match against the current expected note and may
    /// resolve it.
    pub fn handle_input(&mut self, event: LiveInputEvent) -> Vec<StatusUpdate> {
        match event.kind {
            InputKind::Off => {
                self.pressed.remove(&event.pitch);
                Vec::new()
            }
            InputKind::On => {
                self.pressed.insert(event.pitch);
                self.match_pressed(event)
            }
        }
    }

    fn match_pressed(&mut self, event: LiveInputEvent) -> Vec<StatusUpdate> {
        let Some(current) = self.notes.get(self.cursor) else {
            log::debug!("input {} after sequence end", event.pitch);
            self.tracker.record_unexpected_note(event.timestamp, event.pitch);
            return Vec::new();
        };

        if !current.requires(event.pitch) {
            log::debug!(
                "wrong pitch {} against note {}",
                event.pitch,
                current.sequence_index
            );
            self.tracker
                .record_wrong_note(event.timestamp, event.pitch, current.sequence_index);
            return Vec::new();
        }

        // Partial chords wait for the remaining pitches
        if !current.pitches.iter().all(|p| self.pressed.contains(p)) {
            return Vec::new();
        }

        self.resolve_current(event.timestamp)
    }

    /// The completing press arrived: judge the attempt and apply the
    /// resulting transition. Exactly one note resolves at a time.
    fn resolve_current(&mut self, now: f64) -> Vec<StatusUpdate> {
        let current = self.notes[self.cursor].clone();

        // Raw drift under the pre-judgment origin; record_attempt may shift
        // the origin for pause verdicts
        let raw_drift = self
            .analyzer
            .elapsed(now)
            .map(|elapsed| elapsed - current.start_time);
        let judgment = self.analyzer.record_attempt(&current, now);
        let raw_drift = raw_drift.unwrap_or(judgment.drift);

        let mut updates = Vec::new();

        if judgment.category == TimingCategory::TooEarly {
            self.tracker.record_early_note(now, current.sequence_index);
            let (state, effects) = transition(self.state, StateInput::ReplayRequired);
            self.state = state;
            self.apply_effects(&effects, &current, now, raw_drift, &mut updates);
            updates.push(StatusUpdate::new(current.sequence_index, NoteStatus::Warning));
            return updates;
        }

        self.tracker.record_correct_note(now);
        self.completed_beats += current.duration / self.analyzer.thresholds().beat_duration;

        let recalibrate = self.training_wheels && self.wants_recalibration(&judgment.category, raw_drift);
        let (state, effects) = transition(self.state, StateInput::NoteResolved { recalibrate });
        self.state = state;
        self.apply_effects(&effects, &current, now, raw_drift, &mut updates);

        if judgment.category == TimingCategory::Pause {
            updates.push(StatusUpdate::new(current.sequence_index, NoteStatus::Paused));
        }

        updates
    }

    /// Early/late verdicts left the tolerance band and the origin untouched,
    /// so they recalibrate. Pause verdicts already re-anchored inside the
    /// analyzer; they only recalibrate when the raw drift blew past the
    /// sanity bound and the absorbed timeline still needs a fresh baseline.
    fn wants_recalibration(&self, category: &TimingCategory, raw_drift: f64) -> bool {
        match category {
            TimingCategory::Early | TimingCategory::Late => true,
            TimingCategory::Pause => {
                !raw_drift.is_finite()
                    || raw_drift.abs() > self.analyzer.policy().sanity_bound_secs
            }
            TimingCategory::Accurate | TimingCategory::TooEarly => false,
        }
    }

    fn apply_effects(
        &mut self,
        effects: &[Effect],
        resolved: &ExpectedNote,
        now: f64,
        raw_drift: f64,
        updates: &mut Vec<StatusUpdate>,
    ) {
        for effect in effects {
            match effect {
                Effect::Advance => {
                    self.cursor += 1;
                    self.pressed.clear();
                    self.awaiting_replay = false;
                    self.warned_current = false;
                    updates.push(StatusUpdate::new(
                        resolved.sequence_index,
                        NoteStatus::Completed,
                    ));
                }
                Effect::AwaitReplay => {
                    self.awaiting_replay = true;
                    self.pressed.clear();
                }
                Effect::Recalibrate => {
                    let next_start = self.notes.get(self.cursor).map(|n| n.start_time);
                    self.analyzer
                        .recalibrate(resolved, next_start, now, raw_drift);
                    let (state, _) = transition(self.state, StateInput::RecalibrationComplete);
                    self.state = state;
                }
                Effect::HaltMetronome => self.metronome_running = false,
                Effect::ResumeMetronome => self.metronome_running = true,
            }
        }
    }

    /// Periodic overdue check. In `Playing`, flags the current note once it
    /// slips past the accurate window and pauses play once it crosses the
    /// late threshold unresolved.
    pub fn check_overdue(&mut self, now: f64) -> Vec<StatusUpdate> {
        if self.state != PlayState::Playing {
            return Vec::new();
        }
        let Some(elapsed) = self.analyzer.elapsed(now) else {
            return Vec::new();
        };
        let Some(current) = self.notes.get(self.cursor) else {
            return Vec::new();
        };

        let drift = elapsed - current.start_time;
        if !drift.is_finite() {
            return Vec::new();
        }

        if drift > self.analyzer.thresholds().late {
            log::info!("note {} overdue by {:.3}s", current.sequence_index, drift);
            let index = current.sequence_index;
            let (state, effects) = transition(self.state, StateInput::NoteOverdue);
            self.state = state;
            let mut updates = Vec::new();
            let resolved = self.notes[self.cursor].clone();
            self.apply_effects(&effects, &resolved, now, drift, &mut updates);
            updates.push(StatusUpdate::new(index, NoteStatus::Overdue));
            updates
        } else if drift > self.analyzer.thresholds().accurate && !self.warned_current {
            self.warned_current = true;
            vec![StatusUpdate::new(current.sequence_index, NoteStatus::Warning)]
        } else {
            Vec::new()
        }
    }

    /// Close the session and produce the final result
    pub fn finish(mut self, now: f64) -> SessionResult {
        self.tracker.end_session(now);
        let timing = self.analyzer.timing_metrics();
        let mistakes = analyze_mistakes(self.tracker.mistakes());
        let performance = self.tracker.summary();
        log::info!(
            "session finished: {} notes, accuracy {:.2}, grade {}",
            performance.notes_progressed,
            performance.note_accuracy,
            performance.grade.as_str()
        );

        SessionResult::new(
            performance,
            timing,
            mistakes,
            self.analyzer.judgments().to_vec(),
        )
    }
}
