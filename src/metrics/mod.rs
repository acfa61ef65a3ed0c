// Performance metrics - outcome aggregation, mistake analysis, final result
// Turns the stream of judged events into accuracy, consistency, and a grade

pub mod mistakes;
pub mod performance;
pub mod result;

// Re-export main types
pub use mistakes::{analyze_mistakes, MistakeAnalysis, MistakeCategory, MistakePattern, MistakeRecord};
pub use performance::{letter_grade, Grade, PerformanceSummary, PerformanceTracker};
pub use result::SessionResult;
