//! Persistence collaborator.
//!
//! The engine reads and writes through the [`Persistence`] trait only.
//! [`Store`] keeps counters in SQLite and durations in `config.toml`;
//! [`MemoryStore`] keeps everything in process.

mod config;
pub mod database;
mod memory;
mod store;

pub use config::{AudioConfig, Config, NotificationsConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use store::Store;

use std::path::PathBuf;

use crate::clock::CalendarDay;
use crate::error::{ConfigError, Result};
use crate::stats::DailyStats;
use crate::timer::{DurationConfig, PersistedTimer};

/// Storage for settings, counters and the in-flight interval.
///
/// Every loader tolerates absence (first run) by returning defaults.
pub trait Persistence: Send {
    fn load_settings(&self) -> Result<DurationConfig>;
    fn save_settings(&mut self, config: &DurationConfig) -> Result<()>;

    /// Stats for `day`; a stored record for any other day yields fresh stats.
    fn load_daily_stats(&self, day: CalendarDay) -> Result<DailyStats>;
    fn save_daily_stats(&mut self, stats: &DailyStats) -> Result<()>;

    fn load_total_sessions(&self) -> Result<u64>;
    fn save_total_sessions(&mut self, total: u64) -> Result<()>;

    fn load_timer(&self) -> Result<Option<PersistedTimer>>;
    fn save_timer(&mut self, timer: &PersistedTimer) -> Result<()>;
}

/// Returns the data directory.
///
/// `FOCUSCYCLE_DATA_DIR` wins when set; otherwise `~/.config/focuscycle`,
/// or `~/.config/focuscycle-dev` when `FOCUSCYCLE_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("FOCUSCYCLE_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FOCUSCYCLE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focuscycle-dev")
            } else {
                base_dir.join("focuscycle")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
