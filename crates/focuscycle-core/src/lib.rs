//! # Focuscycle Core Library
//!
//! This library provides the core logic for the Focuscycle focus-interval
//! timer. The CLI binary and any other front end are thin layers over the
//! same engine.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-anchored state machine. The caller passes
//!   `now` into every operation and drives `tick()` once a second
//! - **Lifecycle**: Suspend/resume reconciliation so an interval that ended
//!   while the process was frozen completes exactly once
//! - **Stats**: Per-day counters that roll over at local midnight
//! - **Storage**: SQLite counters and TOML configuration behind a trait
//! - **Runtime**: A tokio task that serializes commands, ticks and the
//!   midnight alarm
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`EventSink`]: Receives every state change
//! - [`Persistence`]: Storage collaborator, with [`Store`] and [`MemoryStore`]
//! - [`runtime::spawn`]: Single-consumer driver

pub mod clock;
pub mod collaborators;
pub mod error;
pub mod events;
pub mod runtime;
pub mod stats;
pub mod storage;
pub mod timer;

pub use clock::{CalendarDay, Clock, ManualClock, SystemClock, WallClockTime, Zone};
pub use collaborators::{
    AudioPlayer, CollaboratorBridge, LogNotifier, NotificationKind, NotificationScheduler,
    SilentAudio, SoundCue,
};
pub use error::{ConfigError, CoreError, DatabaseError};
pub use events::{Event, EventSink, FanoutSink, FocusMetrics, NullSink, RecordingSink, TracingSink};
pub use runtime::{Command, TimerHandle};
pub use stats::DailyStats;
pub use storage::{Config, Database, MemoryStore, Persistence, Store};
pub use timer::{
    ConfigWarning, DurationConfig, FocusKind, PersistedTimer, TimerEngine, TimerState, TimerView,
};
