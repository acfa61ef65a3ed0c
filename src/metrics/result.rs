// Session results
// The final aggregate handed to results-display/storage collaborators

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metrics::mistakes::MistakeAnalysis;
use crate::metrics::performance::PerformanceSummary;
use crate::timing::analyzer::{NoteJudgment, TimingMetrics};

/// Everything a session produced: derived figures plus the full judgment
/// log for later inspection. Created once, at session termination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResult {
    pub id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub performance: PerformanceSummary,
    pub timing: TimingMetrics,
    pub mistakes: MistakeAnalysis,
    pub judgments: Vec<NoteJudgment>,
}

impl SessionResult {
    pub fn new(
        performance: PerformanceSummary,
        timing: TimingMetrics,
        mistakes: MistakeAnalysis,
        judgments: Vec<NoteJudgment>,
    ) -> Self {
        SessionResult {
            id: Uuid::new_v4(),
            completed_at: Utc::now(),
            performance,
            timing,
            mistakes,
            judgments,
        }
    }

    /// Serialize to JSON bytes for the storage collaborator
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    /// Deserialize from JSON bytes
    pub fn from_json_bytes(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}
