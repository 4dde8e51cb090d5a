//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-anchored state machine. It has no
//! internal thread and never reads a clock: the caller passes `now` into
//! every operation and is responsible for calling `tick()` once a second
//! while [`TimerEngine::ticker_armed`] is true.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> (Focusing | ShortBreak | LongBreak) -> Paused -> ... -> Idle
//! ```
//!
//! Remaining time is always recomputed from `end_at - now`, so skipped
//! ticks never cause drift.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::restore(store, sink, Zone::Local, clock.now());
//! engine.start(None, clock.now());
//! // Once per second:
//! engine.tick(clock.now()); // Returns Some(Event) when the interval completes
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::durations::{ConfigWarning, DurationConfig};
use super::state::{FocusKind, TimerState};
use crate::clock::{WallClockTime, Zone};
use crate::error::Result;
use crate::events::{Event, EventSink, FocusMetrics, NullSink};
use crate::stats::DailyStats;
use crate::storage::{MemoryStore, Persistence};

/// The in-flight interval as written to storage.
///
/// A restored active interval is treated as if the process had been
/// suspended at `saved_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedTimer {
    pub state: TimerState,
    pub remaining_seconds: u32,
    pub total_seconds: u32,
    pub end_at: Option<DateTime<Utc>>,
    pub saved_at: DateTime<Utc>,
}

/// Read-only view for display layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerView {
    pub state: TimerState,
    pub remaining_seconds: u32,
    pub total_seconds: u32,
    /// 0.0 .. 1.0 progress within the current interval.
    pub progress: f64,
    /// `MM:SS`
    pub display: String,
    pub end_at: Option<DateTime<Utc>>,
    pub suspended: bool,
    pub sessions_today: u32,
    pub focus_seconds_today: u32,
    pub total_sessions: u64,
    pub next_break: FocusKind,
}

/// Core timer engine. Exactly one exists per process; it is owned by
/// whichever component drives the ticker and lifecycle signals.
pub struct TimerEngine {
    durations: DurationConfig,
    state: TimerState,
    remaining_seconds: u32,
    /// Length of the current (or paused) interval.
    total_seconds: u32,
    end_at: Option<WallClockTime>,
    pub(super) suspended_at: Option<WallClockTime>,
    completed_focus_sessions_total: u64,
    daily: DailyStats,
    zone: Zone,
    store: Box<dyn Persistence>,
    sink: Box<dyn EventSink>,
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("state", &self.state)
            .field("remaining_seconds", &self.remaining_seconds)
            .field("total_seconds", &self.total_seconds)
            .field("end_at", &self.end_at)
            .field("suspended_at", &self.suspended_at)
            .field("completed_focus_sessions_total", &self.completed_focus_sessions_total)
            .field("daily", &self.daily)
            .finish_non_exhaustive()
    }
}

impl TimerEngine {
    /// An idle engine over an in-memory store that discards events.
    pub fn new(durations: DurationConfig, zone: Zone, now: WallClockTime) -> Self {
        let mut store = MemoryStore::new();
        if let Err(e) = store.save_settings(&durations) {
            tracing::warn!(error = %e, "failed to seed in-memory settings");
        }
        Self::restore(Box::new(store), Box::new(NullSink), zone, now)
    }

    /// Build the engine from persisted state, reconciling any interval that
    /// was running when the previous process ended.
    pub fn restore(
        store: Box<dyn Persistence>,
        sink: Box<dyn EventSink>,
        zone: Zone,
        now: WallClockTime,
    ) -> Self {
        let durations = loaded("settings", store.load_settings()).unwrap_or_default();
        let total = loaded("total sessions", store.load_total_sessions()).unwrap_or(0);
        let persisted = loaded("timer", store.load_timer()).flatten();
        // Counters for the day the previous process last saw, so a restored
        // interval that ended then is credited to that day.
        let stats_day = persisted
            .as_ref()
            .filter(|p| p.saved_at <= now)
            .map_or(now, |p| p.saved_at);
        let stats_day = zone.calendar_day(stats_day);
        let daily = loaded("daily stats", store.load_daily_stats(stats_day))
            .unwrap_or_else(|| DailyStats::new(stats_day));

        let (durations, warnings) = durations.sanitized();
        let focus = durations.focus_seconds;
        let mut engine = Self {
            durations,
            state: TimerState::Idle,
            remaining_seconds: focus,
            total_seconds: focus,
            end_at: None,
            suspended_at: None,
            completed_focus_sessions_total: total,
            daily,
            zone,
            store,
            sink,
        };
        for warning in warnings {
            engine.emit(Event::ConfigWarning { warning, at: now });
        }
        if let Some(persisted) = persisted {
            engine.reinstate(persisted, now);
        }
        engine.ensure_current_day(now);
        engine
    }

    /// Replace the event sink.
    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Remaining seconds as of the last tick or transition.
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// Remaining seconds derived from the wall-clock anchor.
    pub fn remaining_at(&self, now: WallClockTime) -> u32 {
        match (self.state.active_kind(), self.end_at) {
            (Some(_), Some(end_at)) => seconds_until(end_at, now),
            _ => self.remaining_seconds,
        }
    }

    pub fn total_seconds(&self) -> u32 {
        self.total_seconds
    }

    /// `1 - remaining / total`; zero while idle.
    pub fn progress_at(&self, now: WallClockTime) -> f64 {
        if self.state == TimerState::Idle || self.total_seconds == 0 {
            return 0.0;
        }
        let remaining = f64::from(self.remaining_at(now).min(self.total_seconds));
        1.0 - remaining / f64::from(self.total_seconds)
    }

    pub fn formatted_remaining(&self, now: WallClockTime) -> String {
        format_mmss(self.remaining_at(now))
    }

    pub fn end_at(&self) -> Option<WallClockTime> {
        self.end_at
    }

    pub fn suspended_at(&self) -> Option<WallClockTime> {
        self.suspended_at
    }

    pub fn durations(&self) -> &DurationConfig {
        &self.durations
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn completed_focus_sessions_total(&self) -> u64 {
        self.completed_focus_sessions_total
    }

    pub fn daily_stats(&self) -> &DailyStats {
        &self.daily
    }

    /// The break the cadence suggests after the most recent focus session.
    pub fn next_break_kind(&self) -> FocusKind {
        self.durations.break_after(self.completed_focus_sessions_total)
    }

    /// Whether the one-second ticker should be running.
    pub fn ticker_armed(&self) -> bool {
        self.state.is_active() && self.suspended_at.is_none()
    }

    /// Snapshot for display. Rolls daily stats forward first.
    pub fn snapshot(&mut self, now: WallClockTime) -> TimerView {
        self.ensure_current_day(now);
        let remaining = self.remaining_at(now);
        TimerView {
            state: self.state,
            remaining_seconds: remaining,
            total_seconds: self.total_seconds,
            progress: self.progress_at(now),
            display: format_mmss(remaining),
            end_at: self.end_at,
            suspended: self.suspended_at.is_some(),
            sessions_today: self.daily.sessions_completed_today,
            focus_seconds_today: self.daily.focus_seconds_today,
            total_sessions: self.completed_focus_sessions_total,
            next_break: self.next_break_kind(),
        }
    }

    /// The state to write to storage.
    pub fn persisted(&self, now: WallClockTime) -> PersistedTimer {
        PersistedTimer {
            state: self.state,
            remaining_seconds: self.remaining_at(now),
            total_seconds: self.total_seconds,
            end_at: self.end_at,
            saved_at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start, resume, or restart an interval. Always succeeds.
    pub fn start(&mut self, requested: Option<FocusKind>, now: WallClockTime) -> Event {
        self.settle(now);
        self.ensure_current_day(now);
        let event = match self.state {
            TimerState::Paused { previous } => match requested {
                Some(kind) if kind != previous => self.begin(kind, now),
                _ => self.resume_paused(previous, now),
            },
            TimerState::Idle => self.begin(requested.unwrap_or(FocusKind::Focusing), now),
            active => {
                let current = active.active_kind().unwrap_or(FocusKind::Focusing);
                self.begin(requested.unwrap_or(current), now)
            }
        };
        self.save_timer(now);
        event
    }

    /// Freeze the running interval. No-op unless an interval is running.
    ///
    /// An interval that has already run out is completed instead.
    pub fn pause(&mut self, now: WallClockTime) -> Option<Event> {
        self.settle(now);
        self.ensure_current_day(now);
        let kind = self.state.active_kind()?;
        self.remaining_seconds = self.remaining_at(now);
        self.end_at = None;
        self.suspended_at = None;
        self.state = TimerState::Paused { previous: kind };
        tracing::debug!(%kind, remaining = self.remaining_seconds, "paused");

        let event = Event::SessionPaused {
            kind,
            remaining_secs: self.remaining_seconds,
            at: now,
        };
        self.emit(event.clone());
        self.save_timer(now);
        Some(event)
    }

    /// Abort whatever is in progress without crediting completion.
    pub fn stop(&mut self, now: WallClockTime) -> Event {
        self.settle(now);
        self.ensure_current_day(now);
        let kind = self.state.current_kind();
        self.state = TimerState::Idle;
        self.end_at = None;
        self.suspended_at = None;
        self.reset_ready();
        tracing::debug!(?kind, "stopped");

        let event = Event::SessionStopped { kind, at: now };
        self.emit(event.clone());
        self.save_timer(now);
        event
    }

    /// Advance the countdown. Returns the completion event when the interval
    /// reaches zero.
    pub fn tick(&mut self, now: WallClockTime) -> Option<Event> {
        self.ensure_current_day(now);
        self.state.active_kind()?;
        if self.suspended_at.is_some() {
            tracing::debug!("tick ignored while suspended");
            return None;
        }
        let end_at = self.end_at?;
        self.remaining_seconds = seconds_until(end_at, now);
        if self.remaining_seconds > 0 {
            return None;
        }
        self.complete(now)
    }

    /// Replace the durations. A running interval is voided and restarted
    /// with the new length; a paused one is reset to the new full length.
    pub fn apply(&mut self, config: DurationConfig, now: WallClockTime) -> Vec<ConfigWarning> {
        self.settle(now);
        self.ensure_current_day(now);
        let (config, warnings) = config.sanitized();
        for warning in &warnings {
            self.emit(Event::ConfigWarning {
                warning: warning.clone(),
                at: now,
            });
        }
        let saved = self.store.save_settings(&config);
        self.log_write("settings", saved);
        self.durations = config;

        match self.state {
            TimerState::Paused { previous } => {
                self.total_seconds = self.durations.duration_for(previous);
                self.remaining_seconds = self.total_seconds;
            }
            TimerState::Idle => self.reset_ready(),
            active => {
                if let Some(kind) = active.active_kind() {
                    self.stop(now);
                    self.begin(kind, now);
                }
            }
        }

        self.emit(Event::ConfigApplied {
            config: self.durations.clone(),
            at: now,
        });
        self.save_timer(now);
        warnings
    }

    /// Reset day-scoped counters if the local day has changed.
    pub fn ensure_current_day(&mut self, now: WallClockTime) -> bool {
        if !self.daily.ensure_current_day(now, &self.zone) {
            return false;
        }
        self.save_daily();
        self.emit(Event::DayRolledOver {
            day: self.daily.day_key,
            at: now,
        });
        true
    }

    /// Write everything to storage.
    pub fn flush(&mut self, now: WallClockTime) {
        self.save_daily();
        let saved = self.store.save_total_sessions(self.completed_focus_sessions_total);
        self.log_write("total sessions", saved);
        self.save_timer(now);
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Finish the running interval. Callers guarantee this fires once per
    /// crossing of zero.
    pub(super) fn complete(&mut self, at: WallClockTime) -> Option<Event> {
        let kind = self.state.active_kind()?;
        let session_seconds = self.total_seconds;
        self.state = TimerState::Idle;
        self.end_at = None;
        self.suspended_at = None;
        self.remaining_seconds = 0;

        let event = match kind {
            FocusKind::Focusing => {
                self.completed_focus_sessions_total += 1;
                // Roll forward only: a catch-up completion from before
                // midnight is credited to the day it ended on.
                if self.zone.calendar_day(at) > self.daily.day_key {
                    self.ensure_current_day(at);
                }
                self.daily.record_focus(session_seconds);
                self.save_daily();
                let saved = self
                    .store
                    .save_total_sessions(self.completed_focus_sessions_total);
                self.log_write("total sessions", saved);

                tracing::info!(
                    total = self.completed_focus_sessions_total,
                    today = self.daily.sessions_completed_today,
                    "focus session completed"
                );
                Event::FocusCompleted {
                    metrics: FocusMetrics {
                        sessions_today: self.daily.sessions_completed_today,
                        focus_seconds_today: self.daily.focus_seconds_today,
                        session_seconds,
                        local_hour: self.zone.local_hour(at),
                        total_sessions: self.completed_focus_sessions_total,
                    },
                    at,
                }
            }
            FocusKind::ShortBreak | FocusKind::LongBreak => {
                tracing::info!(%kind, "break completed");
                Event::BreakCompleted { kind, at }
            }
        };
        self.emit(event.clone());
        self.reset_ready();

        if kind == FocusKind::Focusing && self.durations.auto_continue {
            let next = self.next_break_kind();
            self.begin(next, at);
        }
        self.save_timer(at);
        Some(event)
    }

    /// Credit an interval whose anchor has passed before a command acts on
    /// it. A suspended interval goes through the resume path.
    fn settle(&mut self, now: WallClockTime) {
        if self.suspended_at.is_some() {
            self.on_resume(now);
            return;
        }
        if self.state.is_active() {
            if let Some(end_at) = self.end_at.filter(|end_at| *end_at <= now) {
                self.complete(end_at);
            }
        }
    }

    /// Fresh interval of `kind` anchored at `now`.
    fn begin(&mut self, kind: FocusKind, now: WallClockTime) -> Event {
        let duration = self.durations.duration_for(kind);
        let end_at = now + Duration::seconds(i64::from(duration));
        self.state = TimerState::active(kind);
        self.total_seconds = duration;
        self.remaining_seconds = duration;
        self.end_at = Some(end_at);
        self.suspended_at = None;
        tracing::debug!(%kind, duration, %end_at, "interval started");

        let event = Event::SessionStarted {
            kind,
            duration_secs: duration,
            end_at,
            at: now,
        };
        self.emit(event.clone());
        event
    }

    fn resume_paused(&mut self, kind: FocusKind, now: WallClockTime) -> Event {
        let end_at = now + Duration::seconds(i64::from(self.remaining_seconds));
        self.state = TimerState::active(kind);
        self.end_at = Some(end_at);
        self.suspended_at = None;
        tracing::debug!(%kind, remaining = self.remaining_seconds, "resumed");

        let event = Event::SessionResumed {
            kind,
            remaining_secs: self.remaining_seconds,
            end_at,
            at: now,
        };
        self.emit(event.clone());
        event
    }

    /// Canonical "ready" display: a full focus interval.
    fn reset_ready(&mut self) {
        self.total_seconds = self.durations.focus_seconds;
        self.remaining_seconds = self.total_seconds;
    }

    fn reinstate(&mut self, persisted: PersistedTimer, now: WallClockTime) {
        let total = persisted.total_seconds.max(1);
        let remaining = persisted.remaining_seconds.min(total);
        match (persisted.state, persisted.end_at) {
            (TimerState::Paused { previous }, _) => {
                self.state = TimerState::Paused { previous };
                self.total_seconds = total;
                self.remaining_seconds = remaining;
            }
            (state, Some(end_at)) if state.is_active() => {
                self.state = state;
                self.total_seconds = total;
                self.remaining_seconds = remaining;
                self.end_at = Some(end_at);
                self.suspended_at = Some(persisted.saved_at);
                tracing::debug!(saved_at = %persisted.saved_at, "reconciling restored interval");
                self.on_resume(now);
            }
            _ => {}
        }
    }

    pub(super) fn set_remaining(&mut self, seconds: u32) {
        self.remaining_seconds = seconds;
    }

    pub(super) fn emit(&mut self, event: Event) {
        self.sink.emit(&event);
    }

    fn save_daily(&mut self) {
        let saved = self.store.save_daily_stats(&self.daily);
        self.log_write("daily stats", saved);
    }

    fn save_timer(&mut self, now: WallClockTime) {
        let snapshot = self.persisted(now);
        let saved = self.store.save_timer(&snapshot);
        self.log_write("timer", saved);
    }

    fn log_write(&self, what: &str, result: Result<()>) {
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist {what}; keeping in-memory state");
        }
    }
}

fn loaded<T>(what: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, "failed to load {what}; using defaults");
            None
        }
    }
}

/// Whole seconds from `now` until `end_at`, rounded up, never negative.
pub fn seconds_until(end_at: WallClockTime, now: WallClockTime) -> u32 {
    let ms = (end_at - now).num_milliseconds();
    if ms <= 0 {
        return 0;
    }
    u32::try_from((ms + 999) / 1000).unwrap_or(u32::MAX)
}

/// `MM:SS`; minutes are not wrapped into hours.
pub fn format_mmss(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
