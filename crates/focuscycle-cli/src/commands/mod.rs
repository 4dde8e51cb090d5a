pub mod config;
pub mod stats;
pub mod timer;

use focuscycle_core::{
    AudioPlayer, CollaboratorBridge, FanoutSink, LogNotifier, NotificationKind,
    NotificationScheduler, RecordingSink, SilentAudio, SoundCue, Store, TimerEngine, TracingSink,
    WallClockTime, Zone,
};

/// Restore the engine from the data directory.
///
/// Reminders and sound cues are wired up according to `config.toml`;
/// every event is also copied into `log` so the caller can report it.
pub fn restore_engine(
    store: Store,
    log: &RecordingSink,
    now: WallClockTime,
) -> Result<TimerEngine, Box<dyn std::error::Error>> {
    let config = store.config()?;

    let mut sink = FanoutSink::new().with(TracingSink).with(log.clone());
    if config.notifications.enabled || config.audio.enabled {
        let notifier: Box<dyn NotificationScheduler> = if config.notifications.enabled {
            Box::new(LogNotifier)
        } else {
            Box::new(Muted)
        };
        let audio: Box<dyn AudioPlayer> = if config.audio.enabled {
            Box::new(TerminalBell)
        } else {
            Box::new(SilentAudio)
        };
        let bridge = CollaboratorBridge::new(notifier, audio).with_ambience(config.audio.ambience);
        sink.subscribe(Box::new(bridge));
    }

    Ok(TimerEngine::restore(Box::new(store), Box::new(sink), Zone::Local, now))
}

/// Rings the terminal bell on stderr for interval boundaries.
struct TerminalBell;

impl AudioPlayer for TerminalBell {
    fn play(&mut self, cue: SoundCue) -> focuscycle_core::error::Result<()> {
        use std::io::Write;
        tracing::debug!(?cue, "bell");
        let mut stderr = std::io::stderr();
        stderr.write_all(b"\x07")?;
        stderr.flush()?;
        Ok(())
    }

    fn play_loop(&mut self, ambience: &str) -> focuscycle_core::error::Result<()> {
        tracing::debug!(ambience, "ambience is not supported in the terminal");
        Ok(())
    }

    fn stop_loop(&mut self) -> focuscycle_core::error::Result<()> {
        Ok(())
    }
}

/// Drops every reminder.
struct Muted;

impl NotificationScheduler for Muted {
    fn schedule(
        &mut self,
        _kind: NotificationKind,
        _fire_at: Option<WallClockTime>,
    ) -> focuscycle_core::error::Result<()> {
        Ok(())
    }

    fn cancel_all(&mut self) -> focuscycle_core::error::Result<()> {
        Ok(())
    }
}
