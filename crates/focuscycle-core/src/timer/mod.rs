mod durations;
mod engine;
mod lifecycle;
mod state;

pub use durations::{ConfigWarning, DurationConfig};
pub use engine::{format_mmss, seconds_until, PersistedTimer, TimerEngine, TimerView};
pub use state::{FocusKind, TimerState};
