use std::path::{Path, PathBuf};

use crate::clock::CalendarDay;
use crate::error::Result;
use crate::stats::DailyStats;
use crate::timer::{DurationConfig, PersistedTimer};

use super::{data_dir, Config, Database, Persistence};

const TOTAL_SESSIONS_KEY: &str = "completed_focus_sessions_total";
const TIMER_KEY: &str = "timer";

/// On-disk store: counters in `focuscycle.db`, durations in `config.toml`.
pub struct Store {
    db: Database,
    config_path: PathBuf,
}

impl Store {
    /// Open the store inside `dir`, creating files as needed.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub fn open(dir: &Path) -> Result<Self> {
        let db = Database::open(&dir.join("focuscycle.db"))?;
        Ok(Self {
            db,
            config_path: dir.join("config.toml"),
        })
    }

    /// Open the store in the default data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory or database is unavailable.
    pub fn open_default() -> Result<Self> {
        Self::open(&data_dir()?)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The full configuration file, not just the durations.
    pub fn config(&self) -> Result<Config> {
        Config::load_from(&self.config_path)
    }

    pub fn save_config(&self, config: &Config) -> Result<()> {
        config.save_to(&self.config_path)
    }
}

impl Persistence for Store {
    fn load_settings(&self) -> Result<DurationConfig> {
        Ok(self.config()?.durations)
    }

    fn save_settings(&mut self, durations: &DurationConfig) -> Result<()> {
        let mut config = self.config()?;
        config.durations = durations.clone();
        self.save_config(&config)
    }

    fn load_daily_stats(&self, day: CalendarDay) -> Result<DailyStats> {
        Ok(self.db.daily(day)?.unwrap_or_else(|| DailyStats::new(day)))
    }

    fn save_daily_stats(&mut self, stats: &DailyStats) -> Result<()> {
        self.db.upsert_daily(stats)?;
        Ok(())
    }

    fn load_total_sessions(&self) -> Result<u64> {
        match self.db.kv_get(TOTAL_SESSIONS_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(0),
        }
    }

    fn save_total_sessions(&mut self, total: u64) -> Result<()> {
        self.db.kv_set(TOTAL_SESSIONS_KEY, &total.to_string())?;
        Ok(())
    }

    fn load_timer(&self) -> Result<Option<PersistedTimer>> {
        match self.db.kv_get(TIMER_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn save_timer(&mut self, timer: &PersistedTimer) -> Result<()> {
        let json = serde_json::to_string(timer)?;
        self.db.kv_set(TIMER_KEY, &json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn first_run_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        assert_eq!(store.load_settings().unwrap(), DurationConfig::default());
        assert_eq!(store.load_daily_stats(day).unwrap(), DailyStats::new(day));
        assert_eq!(store.load_total_sessions().unwrap(), 0);
        assert!(store.load_timer().unwrap().is_none());
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        {
            let mut store = Store::open(dir.path()).unwrap();
            let mut stats = DailyStats::new(day);
            stats.record_focus(1500);
            store.save_daily_stats(&stats).unwrap();
            store.save_total_sessions(17).unwrap();
            store
                .save_settings(&DurationConfig {
                    focus_seconds: 3000,
                    ..DurationConfig::default()
                })
                .unwrap();
        }
        let store = Store::open(dir.path()).unwrap();
        assert_eq!(store.load_total_sessions().unwrap(), 17);
        assert_eq!(store.load_daily_stats(day).unwrap().focus_seconds_today, 1500);
        assert_eq!(store.load_settings().unwrap().focus_seconds, 3000);
    }

    #[test]
    fn save_settings_keeps_other_sections() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::open(dir.path()).unwrap();
        let mut config = Config::default();
        config.audio.ambience = Some("cafe".into());
        store.save_config(&config).unwrap();

        store.save_settings(&DurationConfig::default()).unwrap();
        assert_eq!(store.config().unwrap().audio.ambience.as_deref(), Some("cafe"));
    }
}
