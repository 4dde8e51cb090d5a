//! Single-consumer driver for the timer engine.
//!
//! The engine is moved into one tokio task. User commands, lifecycle signals,
//! the one-second ticker and the midnight alarm are all serialized through
//! that task, so no two mutations of the timer can interleave. The ticker
//! branch is only polled while [`TimerEngine::ticker_armed`] holds, which keeps
//! `tick` and `on_resume` from both completing the same interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::clock::Clock;
use crate::error::{CoreError, Result};
use crate::timer::{DurationConfig, FocusKind, TimerEngine, TimerView};

#[derive(Debug)]
pub enum Command {
    Start(Option<FocusKind>),
    Pause,
    Stop,
    Suspend,
    Resume,
    Foreground,
    Apply(DurationConfig),
    Snapshot(oneshot::Sender<TimerView>),
    Shutdown,
}

/// Cloneable sender side of the driver queue.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl TimerHandle {
    pub fn send(&self, command: Command) -> Result<()> {
        self.tx.send(command).map_err(|_| CoreError::DriverClosed)
    }

    pub fn start(&self, kind: Option<FocusKind>) -> Result<()> {
        self.send(Command::Start(kind))
    }

    pub fn pause(&self) -> Result<()> {
        self.send(Command::Pause)
    }

    pub fn stop(&self) -> Result<()> {
        self.send(Command::Stop)
    }

    pub fn suspend(&self) -> Result<()> {
        self.send(Command::Suspend)
    }

    pub fn resume(&self) -> Result<()> {
        self.send(Command::Resume)
    }

    pub fn foreground(&self) -> Result<()> {
        self.send(Command::Foreground)
    }

    pub fn apply(&self, config: DurationConfig) -> Result<()> {
        self.send(Command::Apply(config))
    }

    pub async fn snapshot(&self) -> Result<TimerView> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot(reply))?;
        rx.await.map_err(|_| CoreError::DriverClosed)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown)
    }
}

/// Move `engine` into a driver task. The task ends on [`Command::Shutdown`]
/// or when every handle is dropped, flushing the engine to storage and
/// handing it back.
pub fn spawn(
    engine: TimerEngine,
    clock: Arc<dyn Clock>,
) -> (TimerHandle, JoinHandle<TimerEngine>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(drive(engine, rx, clock));
    (TimerHandle { tx }, task)
}

async fn drive(
    mut engine: TimerEngine,
    mut rx: mpsc::UnboundedReceiver<Command>,
    clock: Arc<dyn Clock>,
) -> TimerEngine {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let midnight = tokio::time::sleep_until(midnight_deadline(&engine, clock.as_ref()));
    tokio::pin!(midnight);

    loop {
        tokio::select! {
            command = rx.recv() => {
                let Some(command) = command else { break };
                let now = clock.now();
                match command {
                    Command::Start(kind) => {
                        engine.start(kind, now);
                        ticker.reset();
                    }
                    Command::Pause => {
                        engine.pause(now);
                    }
                    Command::Stop => {
                        engine.stop(now);
                    }
                    Command::Suspend => {
                        // The ticker disarms as soon as suspended_at is set.
                        engine.on_suspend(now);
                    }
                    Command::Resume => {
                        engine.on_resume(now);
                        ticker.reset();
                    }
                    Command::Foreground => {
                        engine.on_foreground(now);
                        ticker.reset();
                    }
                    Command::Apply(config) => {
                        engine.apply(config, now);
                        ticker.reset();
                    }
                    Command::Snapshot(reply) => {
                        let _ = reply.send(engine.snapshot(now));
                    }
                    Command::Shutdown => break,
                }
            }
            _ = ticker.tick(), if engine.ticker_armed() => {
                engine.tick(clock.now());
            }
            () = &mut midnight => {
                engine.ensure_current_day(clock.now());
                midnight
                    .as_mut()
                    .reset(midnight_deadline(&engine, clock.as_ref()));
            }
        }
    }

    tracing::debug!("timer driver shutting down");
    engine.flush(clock.now());
    engine
}

/// Tokio deadline for the next local midnight, plus a second of slack so
/// the alarm lands on the new day.
fn midnight_deadline(engine: &TimerEngine, clock: &dyn Clock) -> Instant {
    let now = clock.now();
    let wait = (engine.zone().next_midnight(now) - now)
        .to_std()
        .unwrap_or(Duration::ZERO);
    Instant::now() + wait + Duration::from_secs(1)
}
