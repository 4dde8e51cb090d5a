//! Suspend/resume reconciliation.
//!
//! The host may freeze the process at any time. While frozen no ticks arrive,
//! so on resume the engine compares the wall clock against the interval's
//! anchor and either lets the ticker carry on or fires the completion once.

use super::engine::{seconds_until, TimerEngine};
use crate::clock::WallClockTime;
use crate::events::Event;

impl TimerEngine {
    /// Record that the process is about to be frozen.
    ///
    /// Emits [`Event::Suspended`] with the instant the running interval ends
    /// so a reminder can be scheduled outside the process. The ticker must be
    /// stopped before this is called; repeated calls keep the first instant.
    pub fn on_suspend(&mut self, now: WallClockTime) -> Option<Event> {
        let kind = self.state().active_kind()?;
        if self.suspended_at.is_some() {
            return None;
        }
        let fire_at = self.end_at()?;
        self.suspended_at = Some(now);
        tracing::debug!(%kind, %fire_at, "suspended");

        let event = Event::Suspended {
            kind,
            fire_at,
            at: now,
        };
        self.emit(event.clone());
        Some(event)
    }

    /// Reconcile after the process is thawed.
    ///
    /// Returns the completion event when the interval ran out while
    /// suspended. Calling this again without an intervening
    /// [`TimerEngine::on_suspend`] does nothing.
    pub fn on_resume(&mut self, now: WallClockTime) -> Option<Event> {
        let suspended_at = self.suspended_at?;
        let completed = match self.end_at() {
            Some(end_at) if end_at <= now => {
                tracing::debug!(%suspended_at, %end_at, "interval ended while suspended");
                self.complete(end_at)
            }
            Some(end_at) => {
                self.suspended_at = None;
                self.set_remaining(seconds_until(end_at, now));
                None
            }
            None => {
                self.suspended_at = None;
                None
            }
        };
        self.ensure_current_day(now);
        completed
    }

    /// The process came to the foreground: reconcile, then roll the day.
    ///
    /// Reconciling first lets an interval that ended before midnight be
    /// credited to the day it ended on.
    pub fn on_foreground(&mut self, now: WallClockTime) -> Option<Event> {
        let completed = self.on_resume(now);
        self.ensure_current_day(now);
        completed
    }
}
