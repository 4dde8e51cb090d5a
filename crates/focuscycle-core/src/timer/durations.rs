use serde::{Deserialize, Serialize};

use super::state::FocusKind;

/// Interval lengths and break cadence.
///
/// All lengths are in seconds. A value is only trusted after
/// [`DurationConfig::sanitized`] has clamped it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationConfig {
    #[serde(default = "default_focus_seconds")]
    pub focus_seconds: u32,
    #[serde(default = "default_short_break_seconds")]
    pub short_break_seconds: u32,
    #[serde(default = "default_long_break_seconds")]
    pub long_break_seconds: u32,
    #[serde(default = "default_sessions_before_long_break")]
    pub sessions_before_long_break: u32,
    /// Start the suggested break as soon as a focus session completes
    /// instead of returning to idle.
    #[serde(default)]
    pub auto_continue: bool,
}

fn default_focus_seconds() -> u32 {
    25 * 60
}
fn default_short_break_seconds() -> u32 {
    5 * 60
}
fn default_long_break_seconds() -> u32 {
    15 * 60
}
fn default_sessions_before_long_break() -> u32 {
    4
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self {
            focus_seconds: default_focus_seconds(),
            short_break_seconds: default_short_break_seconds(),
            long_break_seconds: default_long_break_seconds(),
            sessions_before_long_break: default_sessions_before_long_break(),
            auto_continue: false,
        }
    }
}

/// A field that had to be clamped to keep the timer from completing instantly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub field: String,
    pub value: u32,
    pub clamped_to: u32,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} = {} is invalid, using {}",
            self.field, self.value, self.clamped_to
        )
    }
}

impl DurationConfig {
    /// Seconds for one interval of `kind`.
    pub fn duration_for(&self, kind: FocusKind) -> u32 {
        match kind {
            FocusKind::Focusing => self.focus_seconds,
            FocusKind::ShortBreak => self.short_break_seconds,
            FocusKind::LongBreak => self.long_break_seconds,
        }
    }

    /// Clamp every length to at least one second and the cadence to at least
    /// one session, reporting each clamp.
    pub fn sanitized(mut self) -> (Self, Vec<ConfigWarning>) {
        let mut warnings = Vec::new();
        for (field, value) in [
            ("focus_seconds", &mut self.focus_seconds),
            ("short_break_seconds", &mut self.short_break_seconds),
            ("long_break_seconds", &mut self.long_break_seconds),
            (
                "sessions_before_long_break",
                &mut self.sessions_before_long_break,
            ),
        ] {
            if *value == 0 {
                warnings.push(ConfigWarning {
                    field: field.to_string(),
                    value: 0,
                    clamped_to: 1,
                });
                *value = 1;
            }
        }
        (self, warnings)
    }

    /// The break that follows the `completed`-th focus session.
    pub fn break_after(&self, completed: u64) -> FocusKind {
        let cadence = u64::from(self.sessions_before_long_break.max(1));
        if completed > 0 && completed % cadence == 0 {
            FocusKind::LongBreak
        } else {
            FocusKind::ShortBreak
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_classic_pomodoro() {
        let cfg = DurationConfig::default();
        assert_eq!(cfg.duration_for(FocusKind::Focusing), 1500);
        assert_eq!(cfg.duration_for(FocusKind::ShortBreak), 300);
        assert_eq!(cfg.duration_for(FocusKind::LongBreak), 900);
        assert_eq!(cfg.sessions_before_long_break, 4);
        assert!(!cfg.auto_continue);
    }

    #[test]
    fn sanitized_clamps_zero_values() {
        let cfg = DurationConfig {
            focus_seconds: 0,
            sessions_before_long_break: 0,
            ..DurationConfig::default()
        };
        let (cfg, warnings) = cfg.sanitized();
        assert_eq!(cfg.focus_seconds, 1);
        assert_eq!(cfg.sessions_before_long_break, 1);
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].field, "focus_seconds");
        assert_eq!(warnings[1].field, "sessions_before_long_break");
    }

    #[test]
    fn sanitized_leaves_valid_config_alone() {
        let (cfg, warnings) = DurationConfig::default().sanitized();
        assert_eq!(cfg, DurationConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn every_fourth_session_earns_a_long_break() {
        let cfg = DurationConfig::default();
        assert_eq!(cfg.break_after(1), FocusKind::ShortBreak);
        assert_eq!(cfg.break_after(3), FocusKind::ShortBreak);
        assert_eq!(cfg.break_after(4), FocusKind::LongBreak);
        assert_eq!(cfg.break_after(8), FocusKind::LongBreak);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: DurationConfig = toml::from_str("focus_seconds = 600").unwrap();
        assert_eq!(cfg.focus_seconds, 600);
        assert_eq!(cfg.short_break_seconds, 300);
        assert_eq!(cfg.sessions_before_long_break, 4);
    }
}
