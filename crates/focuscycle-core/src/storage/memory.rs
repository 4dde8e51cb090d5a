use std::sync::{Arc, Mutex, MutexGuard};

use crate::clock::CalendarDay;
use crate::error::Result;
use crate::stats::DailyStats;
use crate::timer::{DurationConfig, PersistedTimer};

use super::Persistence;

#[derive(Debug, Default)]
struct Inner {
    settings: Option<DurationConfig>,
    daily: Option<DailyStats>,
    total_sessions: u64,
    timer: Option<PersistedTimer>,
    writes: usize,
}

/// In-process store. Clones share the same contents, so a handle kept
/// outside the engine observes every write.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn daily_stats(&self) -> Option<DailyStats> {
        self.lock().daily.clone()
    }

    pub fn total_sessions(&self) -> u64 {
        self.lock().total_sessions
    }

    pub fn timer(&self) -> Option<PersistedTimer> {
        self.lock().timer.clone()
    }

    pub fn settings(&self) -> Option<DurationConfig> {
        self.lock().settings.clone()
    }

    /// Number of save calls received.
    pub fn writes(&self) -> usize {
        self.lock().writes
    }
}

impl Persistence for MemoryStore {
    fn load_settings(&self) -> Result<DurationConfig> {
        Ok(self.lock().settings.clone().unwrap_or_default())
    }

    fn save_settings(&mut self, config: &DurationConfig) -> Result<()> {
        let mut inner = self.lock();
        inner.settings = Some(config.clone());
        inner.writes += 1;
        Ok(())
    }

    fn load_daily_stats(&self, day: CalendarDay) -> Result<DailyStats> {
        Ok(self
            .lock()
            .daily
            .clone()
            .filter(|stats| stats.day_key == day)
            .unwrap_or_else(|| DailyStats::new(day)))
    }

    fn save_daily_stats(&mut self, stats: &DailyStats) -> Result<()> {
        let mut inner = self.lock();
        inner.daily = Some(stats.clone());
        inner.writes += 1;
        Ok(())
    }

    fn load_total_sessions(&self) -> Result<u64> {
        Ok(self.lock().total_sessions)
    }

    fn save_total_sessions(&mut self, total: u64) -> Result<()> {
        let mut inner = self.lock();
        inner.total_sessions = total;
        inner.writes += 1;
        Ok(())
    }

    fn load_timer(&self) -> Result<Option<PersistedTimer>> {
        Ok(self.lock().timer.clone())
    }

    fn save_timer(&mut self, timer: &PersistedTimer) -> Result<()> {
        let mut inner = self.lock();
        inner.timer = Some(timer.clone());
        inner.writes += 1;
        Ok(())
    }
}
