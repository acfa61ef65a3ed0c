// Session dispatch
// A single-task event loop: live input arrives on a channel, overdue checks
// fire on a periodic tick, and both funnel into the engine in arrival order
// so no two notes are ever in flight for judgment at once.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::metrics::result::SessionResult;
use crate::session::engine::SessionEngine;
use crate::session::types::{LiveInputEvent, StatusUpdate};

/// Monotonic session clock; produces the seconds timebase the engine and
/// the input transport share.
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    start: Instant,
}

impl SessionClock {
    pub fn new() -> Self {
        SessionClock {
            start: Instant::now(),
        }
    }

    /// Seconds since the clock was created
    pub fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Knobs for the dispatch loop
#[derive(Debug, Clone, Copy)]
pub struct DispatchOptions {
    /// Cadence of the overdue check
    pub tick_interval: Duration,

    /// Hard stop for the session; `None` runs until the sequence or the
    /// input channel ends
    pub time_limit: Option<Duration>,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        DispatchOptions {
            tick_interval: Duration::from_millis(50),
            time_limit: None,
        }
    }
}

/// Drive a session to completion.
///
/// Stops when the input channel closes, the sequence is exhausted, the goal
/// is reached, or the time limit expires, then returns the final result.
/// Dropping the returned future between events is safe; the engine holds
/// only in-memory state.
pub async fn run_session(
    mut engine: SessionEngine,
    clock: SessionClock,
    mut inputs: mpsc::Receiver<LiveInputEvent>,
    status_tx: mpsc::Sender<StatusUpdate>,
    options: DispatchOptions,
) -> SessionResult {
    engine.begin(clock.now());

    let mut tick = tokio::time::interval(options.tick_interval);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let deadline = options.time_limit.map(|limit| Instant::now() + limit);

    loop {
        if engine.is_complete() || engine.goal_reached() {
            break;
        }
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                log::info!("session time limit reached");
                break;
            }
        }

        tokio::select! {
            maybe_event = inputs.recv() => {
                match maybe_event {
                    Some(event) => {
                        for update in engine.handle_input(event) {
                            let _ = status_tx.send(update).await;
                        }
                    }
                    None => {
                        log::info!("input channel closed; stopping session");
                        break;
                    }
                }
            }
            _ = tick.tick() => {
                for update in engine.check_overdue(clock.now()) {
                    let _ = status_tx.send(update).await;
                }
            }
        }
    }

    engine.finish(clock.now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::types::{ExpectedNote, Hand};
    use crate::session::types::NoteStatus;

    fn quarter_notes(count: usize) -> Vec<ExpectedNote> {
        (0..count)
            .map(|i| ExpectedNote::new(i, i as f64 * 0.5, 0.5, vec![60 + i as u8], Hand::Right))
            .collect()
    }

    #[tokio::test]
    async fn test_scripted_run_resolves_end_to_end() {
        let engine = SessionEngine::new(quarter_notes(3), 120.0, false, None);
        let clock = SessionClock::new();
        let (input_tx, input_rx) = mpsc::channel(16);
        let (status_tx, mut status_rx) = mpsc::channel(16);

        let session = tokio::spawn(run_session(
            engine,
            clock,
            input_rx,
            status_tx,
            DispatchOptions::default(),
        ));

        // Play each note close to its target on the shared clock
        for i in 0u8..3 {
            let target = i as f64 * 0.5;
            while clock.now() < target {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            input_tx
                .send(LiveInputEvent::on(60 + i, clock.now()))
                .await
                .unwrap();
            input_tx
                .send(LiveInputEvent::off(60 + i, clock.now() + 0.01))
                .await
                .unwrap();
        }

        let result = session.await.unwrap();
        assert_eq!(result.performance.notes_progressed, 3);
        assert!((result.performance.note_accuracy - 1.0).abs() < 1e-9);

        let mut completed = 0;
        while let Ok(update) = status_rx.try_recv() {
            if update.status == NoteStatus::Completed {
                completed += 1;
            }
        }
        assert_eq!(completed, 3);
    }

    #[tokio::test]
    async fn test_closing_input_channel_ends_session() {
        let engine = SessionEngine::new(quarter_notes(8), 120.0, false, None);
        let (input_tx, input_rx) = mpsc::channel(16);
        let (status_tx, _status_rx) = mpsc::channel(16);

        drop(input_tx);
        let result = run_session(
            engine,
            SessionClock::new(),
            input_rx,
            status_tx,
            DispatchOptions::default(),
        )
        .await;

        assert_eq!(result.performance.notes_progressed, 0);
    }

    #[tokio::test]
    async fn test_time_limit_stops_session() {
        let engine = SessionEngine::new(quarter_notes(8), 120.0, false, None);
        let (_input_tx, input_rx) = mpsc::channel(16);
        let (status_tx, _status_rx) = mpsc::channel(64);

        let options = DispatchOptions {
            tick_interval: Duration::from_millis(10),
            time_limit: Some(Duration::from_millis(100)),
        };
        let result = run_session(
            engine,
            SessionClock::new(),
            input_rx,
            status_tx,
            options,
        )
        .await;

        // Nothing was played; the limit, not the channel, ended the session
        assert_eq!(result.performance.notes_progressed, 0);
    }
}
