use std::sync::Arc;
use std::time::Duration;

use clap::{Subcommand, ValueEnum};
use focuscycle_core::{
    runtime, Clock, Event, FocusKind, RecordingSink, Store, SystemClock, TimerEngine, TimerState,
    TimerView,
};
use serde::Serialize;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a focus interval, or resume the paused one
    Start {
        /// Interval to start instead of focus
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },
    /// Pause the running interval
    Pause,
    /// Abandon the current interval without credit
    Stop,
    /// Print current timer state as JSON
    Status,
    /// Record that the host is about to sleep
    Suspend,
    /// Reconcile after the host wakes up
    Resume,
    /// Drive the timer in the foreground until Ctrl-C
    Run {
        /// Start this interval before running
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Focus,
    ShortBreak,
    LongBreak,
}

impl From<KindArg> for FocusKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Focus => FocusKind::Focusing,
            KindArg::ShortBreak => FocusKind::ShortBreak,
            KindArg::LongBreak => FocusKind::LongBreak,
        }
    }
}

/// Everything a one-shot command did, including catch-up completions found
/// while restoring.
#[derive(Serialize)]
struct Report {
    events: Vec<Event>,
    timer: TimerView,
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let now = SystemClock.now();
    let log = RecordingSink::new();
    let mut engine = super::restore_engine(Store::open_default()?, &log, now)?;

    match action {
        TimerAction::Start { kind } => {
            engine.start(kind.map(Into::into), now);
        }
        TimerAction::Pause => {
            engine.pause(now);
        }
        TimerAction::Stop => {
            engine.stop(now);
        }
        TimerAction::Status => {
            engine.tick(now);
        }
        TimerAction::Suspend => {
            engine.on_suspend(now);
        }
        TimerAction::Resume => {
            engine.on_foreground(now);
        }
        TimerAction::Run { kind } => {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            return rt.block_on(run_foreground(engine, log, kind.map(Into::into)));
        }
    }

    let report = Report {
        events: log.events(),
        timer: engine.snapshot(now),
    };
    engine.flush(now);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run_foreground(
    engine: TimerEngine,
    log: RecordingSink,
    kind: Option<FocusKind>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (handle, task) = runtime::spawn(engine, Arc::new(SystemClock));
    if kind.is_some() {
        handle.start(kind)?;
    }

    let mut display = tokio::time::interval(Duration::from_secs(1));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            signal = &mut ctrl_c => {
                signal?;
                break;
            }
            _ = display.tick() => {
                let view = handle.snapshot().await?;
                println!("{} {}", view.display, label(view.state));
                for event in log.events() {
                    if let Event::FocusCompleted { metrics, .. } = event {
                        println!(
                            "focus session complete ({} today, next: {})",
                            metrics.sessions_today, view.next_break
                        );
                    }
                }
                log.clear();
            }
        }
    }

    handle.shutdown()?;
    task.await?;
    Ok(())
}

fn label(state: TimerState) -> String {
    match state {
        TimerState::Idle => "idle".to_string(),
        TimerState::Paused { previous } => format!("{previous} (paused)"),
        active => active
            .active_kind()
            .map(|kind| kind.to_string())
            .unwrap_or_default(),
    }
}
