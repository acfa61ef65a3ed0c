// Primavista - sight-reading practice engine
// Generates note sequences, judges live input against expected timing, and
// aggregates per-note outcomes into session-level scores

pub mod config;
pub mod metrics;
pub mod sequence;
pub mod session;
pub mod timing;

pub use config::{ConfigError, Goal, SessionConfig, ValidatedConfig};
pub use metrics::{MistakeAnalysis, PerformanceSummary, SessionResult};
pub use sequence::{ExpectedNote, Hand};
pub use session::{
    run_session, DispatchOptions, LiveInputEvent, NoteStatus, PlayState, SessionClock,
    SessionEngine, StatusUpdate,
};
pub use timing::{NoteJudgment, TimingAnalyzer, TimingCategory, TimingMetrics};
