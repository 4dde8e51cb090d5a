//! Wall-clock sources and local calendar rules.
//!
//! The timer engine never reads a clock on its own: every operation takes
//! `now` from its caller. Drivers obtain `now` from a [`Clock`], which tests
//! replace with a [`ManualClock`].

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, Offset, TimeZone, Timelike, Utc};

/// Absolute instant used throughout the engine.
pub type WallClockTime = DateTime<Utc>;

/// Local date with no time component.
pub type CalendarDay = NaiveDate;

pub trait Clock: Send + Sync {
    fn now(&self) -> WallClockTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> WallClockTime {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<WallClockTime>>,
}

impl ManualClock {
    pub fn new(start: WallClockTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, at: WallClockTime) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> WallClockTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Timezone used to derive calendar days and the hour of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    /// The host's local timezone (DST-aware).
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl Zone {
    pub fn utc() -> Self {
        Zone::Fixed(Utc.fix())
    }

    pub fn calendar_day(&self, now: WallClockTime) -> CalendarDay {
        match self {
            Zone::Local => now.with_timezone(&Local).date_naive(),
            Zone::Fixed(offset) => now.with_timezone(offset).date_naive(),
        }
    }

    pub fn local_hour(&self, now: WallClockTime) -> u32 {
        match self {
            Zone::Local => now.with_timezone(&Local).hour(),
            Zone::Fixed(offset) => now.with_timezone(offset).hour(),
        }
    }

    /// The first local midnight strictly after `now`.
    ///
    /// When a DST gap swallows midnight the earliest valid instant of the
    /// next day is used instead.
    pub fn next_midnight(&self, now: WallClockTime) -> WallClockTime {
        let tomorrow = self
            .calendar_day(now)
            .succ_opt()
            .unwrap_or(NaiveDate::MAX);
        match self {
            Zone::Local => start_of_day(&Local, tomorrow),
            Zone::Fixed(offset) => start_of_day(offset, tomorrow),
        }
        .unwrap_or(now + Duration::hours(24))
    }
}

fn start_of_day<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> Option<WallClockTime> {
    // Walk forward in 15-minute steps past any DST gap.
    (0..=8).find_map(|step| {
        let naive = day.and_hms_opt(0, 0, 0)? + Duration::minutes(15 * step);
        tz.from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    })
}
