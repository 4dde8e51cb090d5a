//! Day-scoped focus statistics.
//!
//! [`DailyStats`] is keyed by the local calendar day. Staleness is corrected
//! lazily: every read or write goes through [`DailyStats::ensure_current_day`]
//! first, so a value from yesterday is never observed today.

use serde::{Deserialize, Serialize};

use crate::clock::{CalendarDay, WallClockTime, Zone};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    pub day_key: CalendarDay,
    pub sessions_completed_today: u32,
    pub focus_seconds_today: u32,
}

impl DailyStats {
    pub fn new(day_key: CalendarDay) -> Self {
        Self {
            day_key,
            sessions_completed_today: 0,
            focus_seconds_today: 0,
        }
    }

    /// Reset the counters if the local day has moved on since `day_key`.
    ///
    /// Returns `true` when a rollover happened; the caller persists.
    pub fn ensure_current_day(&mut self, now: WallClockTime, zone: &Zone) -> bool {
        let today = zone.calendar_day(now);
        if self.day_key == today {
            return false;
        }
        tracing::info!(from = %self.day_key, to = %today, "daily stats rolled over");
        *self = DailyStats::new(today);
        true
    }

    /// Credit one completed focus session of `seconds`.
    pub fn record_focus(&mut self, seconds: u32) {
        self.sessions_completed_today = self.sessions_completed_today.saturating_add(1);
        self.focus_seconds_today = self.focus_seconds_today.saturating_add(seconds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};

    fn at(s: &str) -> WallClockTime {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn day(y: i32, m: u32, d: u32) -> CalendarDay {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn same_day_is_a_noop_no_matter_how_often() {
        let zone = Zone::utc();
        let mut stats = DailyStats::new(day(2026, 5, 4));
        stats.record_focus(1500);
        stats.record_focus(1500);

        let mut now = at("2026-05-04T08:00:00Z");
        for _ in 0..100 {
            assert!(!stats.ensure_current_day(now, &zone));
            now += Duration::minutes(5);
        }
        assert_eq!(stats.sessions_completed_today, 2);
        assert_eq!(stats.focus_seconds_today, 3000);
    }

    #[test]
    fn next_day_resets_both_counters_once() {
        let zone = Zone::utc();
        let mut stats = DailyStats::new(day(2026, 5, 4));
        stats.record_focus(1500);

        assert!(stats.ensure_current_day(at("2026-05-05T00:00:01Z"), &zone));
        assert_eq!(stats, DailyStats::new(day(2026, 5, 5)));
        assert!(!stats.ensure_current_day(at("2026-05-05T23:59:59Z"), &zone));
    }

    #[test]
    fn rollover_follows_local_midnight_not_utc() {
        let zone = Zone::Fixed(FixedOffset::west_opt(7 * 3600).unwrap());
        let mut stats = DailyStats::new(day(2026, 5, 4));
        stats.record_focus(60);

        // 05:00 UTC on the 5th is still the 4th at UTC-7.
        assert!(!stats.ensure_current_day(at("2026-05-05T05:00:00Z"), &zone));
        assert!(stats.ensure_current_day(at("2026-05-05T07:00:00Z"), &zone));
        assert_eq!(stats.day_key, day(2026, 5, 5));
    }

    #[test]
    fn record_focus_saturates() {
        let mut stats = DailyStats::new(day(2026, 5, 4));
        stats.focus_seconds_today = u32::MAX - 10;
        stats.record_focus(60);
        assert_eq!(stats.focus_seconds_today, u32::MAX);
        assert_eq!(stats.sessions_completed_today, 1);
    }
}
