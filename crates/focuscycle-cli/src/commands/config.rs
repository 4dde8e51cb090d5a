use clap::Subcommand;
use focuscycle_core::{Clock, Config, RecordingSink, Store, SystemClock};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "durations.focus_seconds", "audio.ambience")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open_default()?;

    match action {
        ConfigAction::Get { key } => {
            let config = store.config()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = store.config()?;
            let before = config.durations.clone();
            config.set(&key, &value)?;
            store.save_config(&config)?;
            if config.durations != before {
                apply_durations(store, &config)?;
            }
            println!("ok");
        }
        ConfigAction::List => {
            let config = store.config()?;
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            let config = Config::default();
            let before = store.config()?.durations;
            store.save_config(&config)?;
            if config.durations != before {
                apply_durations(store, &config)?;
            }
            println!("config reset to defaults");
        }
    }
    Ok(())
}

/// Push new interval lengths into the timer so a running interval restarts
/// with them.
fn apply_durations(store: Store, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let now = SystemClock.now();
    let log = RecordingSink::new();
    let mut engine = super::restore_engine(store, &log, now)?;
    for warning in engine.apply(config.durations.clone(), now) {
        eprintln!("warning: {warning}");
    }
    engine.flush(now);
    Ok(())
}
