use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{ConfigWarning, DurationConfig, FocusKind};

/// Figures handed to achievement, streak and leveling services when a
/// focus session completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusMetrics {
    pub sessions_today: u32,
    pub focus_seconds_today: u32,
    pub session_seconds: u32,
    /// Local hour of day (0..24) at completion.
    pub local_hour: u32,
    pub total_sessions: u64,
}

/// Every state change of the timer produces an Event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        kind: FocusKind,
        duration_secs: u32,
        end_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    SessionResumed {
        kind: FocusKind,
        remaining_secs: u32,
        end_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    SessionPaused {
        kind: FocusKind,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// Interval aborted without completion credit. `kind` is `None` when
    /// the timer was already idle.
    SessionStopped {
        kind: Option<FocusKind>,
        at: DateTime<Utc>,
    },
    /// The process is about to be frozen; `fire_at` is when the running
    /// interval will end.
    Suspended {
        kind: FocusKind,
        fire_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    FocusCompleted {
        metrics: FocusMetrics,
        at: DateTime<Utc>,
    },
    BreakCompleted {
        kind: FocusKind,
        at: DateTime<Utc>,
    },
    DayRolledOver {
        day: NaiveDate,
        at: DateTime<Utc>,
    },
    ConfigApplied {
        config: DurationConfig,
        at: DateTime<Utc>,
    },
    ConfigWarning {
        warning: ConfigWarning,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::SessionStarted { at, .. }
            | Event::SessionResumed { at, .. }
            | Event::SessionPaused { at, .. }
            | Event::SessionStopped { at, .. }
            | Event::Suspended { at, .. }
            | Event::FocusCompleted { at, .. }
            | Event::BreakCompleted { at, .. }
            | Event::DayRolledOver { at, .. }
            | Event::ConfigApplied { at, .. }
            | Event::ConfigWarning { at, .. } => *at,
        }
    }
}

/// Receiver of timer events.
///
/// The engine only ever calls [`EventSink::emit`]; the default implementation
/// dispatches to the typed hooks, all of which do nothing unless overridden.
/// Implementations must not call back into the engine.
pub trait EventSink: Send {
    fn emit(&mut self, event: &Event) {
        match event {
            Event::SessionStarted { kind, end_at, .. } => self.on_session_started(*kind, *end_at),
            Event::SessionResumed { kind, end_at, .. } => self.on_session_resumed(*kind, *end_at),
            Event::SessionPaused { kind, .. } => self.on_session_paused(*kind),
            Event::SessionStopped { kind, .. } => self.on_session_stopped(*kind),
            Event::Suspended { kind, fire_at, .. } => self.on_suspended(*kind, *fire_at),
            Event::FocusCompleted { metrics, .. } => self.on_focus_completed(metrics),
            Event::BreakCompleted { kind, .. } => self.on_break_completed(*kind),
            Event::DayRolledOver { day, .. } => self.on_day_rolled_over(*day),
            Event::ConfigApplied { .. } => {}
            Event::ConfigWarning { warning, .. } => self.on_config_warning(warning),
        }
    }

    fn on_session_started(&mut self, _kind: FocusKind, _end_at: DateTime<Utc>) {}
    fn on_session_resumed(&mut self, _kind: FocusKind, _end_at: DateTime<Utc>) {}
    fn on_session_paused(&mut self, _kind: FocusKind) {}
    fn on_session_stopped(&mut self, _kind: Option<FocusKind>) {}
    fn on_suspended(&mut self, _kind: FocusKind, _fire_at: DateTime<Utc>) {}
    fn on_focus_completed(&mut self, _metrics: &FocusMetrics) {}
    fn on_break_completed(&mut self, _kind: FocusKind) {}
    fn on_day_rolled_over(&mut self, _day: NaiveDate) {}
    fn on_config_warning(&mut self, _warning: &ConfigWarning) {}
}

/// Discards every event.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &Event) {}
}

/// Forwards each event to every subscriber in registration order.
#[derive(Default)]
pub struct FanoutSink {
    subscribers: Vec<Box<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl EventSink + 'static) -> Self {
        self.subscribers.push(Box::new(sink));
        self
    }

    pub fn subscribe(&mut self, sink: Box<dyn EventSink>) {
        self.subscribers.push(sink);
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl EventSink for FanoutSink {
    fn emit(&mut self, event: &Event) {
        for sink in &mut self.subscribers {
            sink.emit(event);
        }
    }
}

/// Keeps a shared log of emitted events; clones observe the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    pub fn focus_completions(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::FocusCompleted { .. }))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Logs every event through `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: &Event) {
        match event {
            Event::FocusCompleted { metrics, .. } => tracing::info!(
                sessions_today = metrics.sessions_today,
                focus_seconds_today = metrics.focus_seconds_today,
                total = metrics.total_sessions,
                "focus session completed"
            ),
            Event::ConfigWarning { warning, .. } => {
                tracing::warn!(%warning, "duration config clamped")
            }
            other => tracing::debug!(event = ?other, "timer event"),
        }
    }
}
