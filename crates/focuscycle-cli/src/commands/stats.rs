use clap::Subcommand;
use focuscycle_core::{Clock, RecordingSink, Store, SystemClock};
use serde::Serialize;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's stats
    Today,
    /// Per-day stats, newest first
    History {
        /// Number of days to show
        #[arg(long, default_value = "7")]
        days: u32,
    },
}

#[derive(Serialize)]
struct Today {
    day: chrono::NaiveDate,
    sessions_completed_today: u32,
    focus_seconds_today: u32,
    total_sessions: u64,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open_default()?;

    match action {
        StatsAction::Today => {
            // Restoring credits any interval that ended since the last run.
            let now = SystemClock.now();
            let mut engine = super::restore_engine(store, &RecordingSink::new(), now)?;
            let view = engine.snapshot(now);
            let today = Today {
                day: engine.daily_stats().day_key,
                sessions_completed_today: view.sessions_today,
                focus_seconds_today: view.focus_seconds_today,
                total_sessions: view.total_sessions,
            };
            engine.flush(now);
            println!("{}", serde_json::to_string_pretty(&today)?);
        }
        StatsAction::History { days } => {
            let history = store.database().history(days)?;
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
    }
    Ok(())
}
