// Live session - state machine, engine, and the event dispatch loop
// Matches the incoming note stream against the expected sequence, one note
// in flight at a time

pub mod dispatch;
pub mod engine;
pub mod state;
pub mod types;

// Re-export main types
pub use dispatch::{run_session, DispatchOptions, SessionClock};
pub use engine::SessionEngine;
pub use state::{transition, Effect, PlayState, StateInput};
pub use types::{InputKind, LiveInputEvent, NoteStatus, StatusUpdate};
