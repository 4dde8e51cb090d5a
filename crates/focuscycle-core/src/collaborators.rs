//! Notification and audio collaborators.
//!
//! The timer core never talks to these directly. [`CollaboratorBridge`] is an
//! [`EventSink`] that turns timer events into reminder and sound requests.
//! Failures are logged and dropped; they never reach the timer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::events::{EventSink, FocusMetrics};
use crate::timer::FocusKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    FocusStart,
    FocusEnd,
    BreakStart,
    BreakEnd,
}

impl NotificationKind {
    /// Reminder fired when an interval of `kind` runs out.
    pub fn end_of(kind: FocusKind) -> Self {
        if kind.is_break() {
            NotificationKind::BreakEnd
        } else {
            NotificationKind::FocusEnd
        }
    }
}

pub trait NotificationScheduler: Send {
    /// Schedule a reminder. `fire_at == None` fires immediately.
    fn schedule(&mut self, kind: NotificationKind, fire_at: Option<DateTime<Utc>>) -> Result<()>;
    fn cancel_all(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    FocusStart,
    FocusEnd,
    BreakStart,
    BreakEnd,
}

pub trait AudioPlayer: Send {
    fn play(&mut self, cue: SoundCue) -> Result<()>;
    fn play_loop(&mut self, ambience: &str) -> Result<()>;
    fn stop_loop(&mut self) -> Result<()>;
}

/// Forwards timer events to a notification scheduler and an audio player.
pub struct CollaboratorBridge {
    notifier: Box<dyn NotificationScheduler>,
    audio: Box<dyn AudioPlayer>,
    /// Looping background sound during focus intervals.
    ambience: Option<String>,
}

impl CollaboratorBridge {
    pub fn new(notifier: Box<dyn NotificationScheduler>, audio: Box<dyn AudioPlayer>) -> Self {
        Self {
            notifier,
            audio,
            ambience: None,
        }
    }

    pub fn with_ambience(mut self, ambience: Option<String>) -> Self {
        self.ambience = ambience;
        self
    }

    fn log(what: &str, result: Result<()>) {
        if let Err(e) = result {
            tracing::warn!(error = %e, "{what} failed");
        }
    }

    fn quiet(&mut self) {
        Self::log("cancel notifications", self.notifier.cancel_all());
        Self::log("stop ambience", self.audio.stop_loop());
    }
}

impl EventSink for CollaboratorBridge {
    fn on_session_started(&mut self, kind: FocusKind, end_at: DateTime<Utc>) {
        Self::log("cancel notifications", self.notifier.cancel_all());
        Self::log(
            "schedule end reminder",
            self.notifier
                .schedule(NotificationKind::end_of(kind), Some(end_at)),
        );
        if kind.is_break() {
            Self::log("play cue", self.audio.play(SoundCue::BreakStart));
            Self::log("stop ambience", self.audio.stop_loop());
        } else {
            Self::log("play cue", self.audio.play(SoundCue::FocusStart));
            if let Some(ambience) = self.ambience.clone() {
                Self::log("start ambience", self.audio.play_loop(&ambience));
            }
        }
    }

    fn on_session_resumed(&mut self, kind: FocusKind, end_at: DateTime<Utc>) {
        Self::log("cancel notifications", self.notifier.cancel_all());
        Self::log(
            "schedule end reminder",
            self.notifier
                .schedule(NotificationKind::end_of(kind), Some(end_at)),
        );
        if !kind.is_break() {
            if let Some(ambience) = self.ambience.clone() {
                Self::log("start ambience", self.audio.play_loop(&ambience));
            }
        }
    }

    fn on_session_paused(&mut self, _kind: FocusKind) {
        self.quiet();
    }

    fn on_session_stopped(&mut self, _kind: Option<FocusKind>) {
        self.quiet();
    }

    fn on_suspended(&mut self, kind: FocusKind, fire_at: DateTime<Utc>) {
        Self::log(
            "schedule wake-up reminder",
            self.notifier
                .schedule(NotificationKind::end_of(kind), Some(fire_at)),
        );
    }

    fn on_focus_completed(&mut self, _metrics: &FocusMetrics) {
        Self::log("stop ambience", self.audio.stop_loop());
        Self::log("play cue", self.audio.play(SoundCue::FocusEnd));
        Self::log(
            "schedule break reminder",
            self.notifier.schedule(NotificationKind::BreakStart, None),
        );
    }

    fn on_break_completed(&mut self, _kind: FocusKind) {
        Self::log("play cue", self.audio.play(SoundCue::BreakEnd));
        Self::log(
            "schedule focus reminder",
            self.notifier.schedule(NotificationKind::FocusStart, None),
        );
    }
}

/// Notification scheduler that only logs.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl NotificationScheduler for LogNotifier {
    fn schedule(&mut self, kind: NotificationKind, fire_at: Option<DateTime<Utc>>) -> Result<()> {
        tracing::info!(?kind, ?fire_at, "notification scheduled");
        Ok(())
    }

    fn cancel_all(&mut self) -> Result<()> {
        tracing::debug!("notifications cancelled");
        Ok(())
    }
}

/// Audio player that plays nothing.
#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioPlayer for SilentAudio {
    fn play(&mut self, _cue: SoundCue) -> Result<()> {
        Ok(())
    }

    fn play_loop(&mut self, _ambience: &str) -> Result<()> {
        Ok(())
    }

    fn stop_loop(&mut self) -> Result<()> {
        Ok(())
    }
}
