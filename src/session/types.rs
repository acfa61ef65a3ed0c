// Live session types
// Input events from the device transport and status notifications for the
// rendering layer

use serde::{Deserialize, Serialize};

/// Whether a key went down or came up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    On,
    Off,
}

/// One discrete event from the input device: a pitch, a direction, and a
/// monotonic wall-clock timestamp in seconds. Consumed immediately.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiveInputEvent {
    pub pitch: u8,
    pub kind: InputKind,
    pub timestamp: f64,
}

impl LiveInputEvent {
    pub fn on(pitch: u8, timestamp: f64) -> Self {
        LiveInputEvent {
            pitch,
            kind: InputKind::On,
            timestamp,
        }
    }

    pub fn off(pitch: u8, timestamp: f64) -> Self {
        LiveInputEvent {
            pitch,
            kind: InputKind::Off,
            timestamp,
        }
    }
}

/// Per-note status for the rendering layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteStatus {
    /// The note was satisfied and the sequence advanced
    Completed,

    /// The note crossed the late threshold unresolved; play is paused on it
    Overdue,

    /// The note is slipping late, or was attempted too early and must be
    /// replayed
    Warning,

    /// The note resolved as a pause; its delay was absorbed into the timeline
    Paused,
}

/// Incremental notification tied to one expected note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub sequence_index: usize,
    pub status: NoteStatus,
}

impl StatusUpdate {
    pub fn new(sequence_index: usize, status: NoteStatus) -> Self {
        StatusUpdate {
            sequence_index,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_constructors() {
        let on = LiveInputEvent::on(60, 1.25);
        assert_eq!(on.kind, InputKind::On);
        assert_eq!(on.pitch, 60);

        let off = LiveInputEvent::off(60, 1.75);
        assert_eq!(off.kind, InputKind::Off);
        assert!((off.timestamp - 1.75).abs() < 1e-9);
    }

    #[test]
    fn test_status_serialization_names() {
        let json = serde_json::to_string(&NoteStatus::Overdue).unwrap();
        assert_eq!(json, "\"overdue\"");
    }
}
