use serde::{Deserialize, Serialize};

/// One of the three kinds of interval with a running countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusKind {
    Focusing,
    ShortBreak,
    LongBreak,
}

impl FocusKind {
    pub fn is_break(&self) -> bool {
        !matches!(self, FocusKind::Focusing)
    }

}

impl std::fmt::Display for FocusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FocusKind::Focusing => "Focus",
            FocusKind::ShortBreak => "Short break",
            FocusKind::LongBreak => "Long break",
        };
        write!(f, "{label}")
    }
}

/// Timer state. `Paused` remembers which active kind it interrupted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TimerState {
    #[default]
    Idle,
    Focusing,
    ShortBreak,
    LongBreak,
    Paused { previous: FocusKind },
}

impl TimerState {
    pub fn active(kind: FocusKind) -> Self {
        match kind {
            FocusKind::Focusing => TimerState::Focusing,
            FocusKind::ShortBreak => TimerState::ShortBreak,
            FocusKind::LongBreak => TimerState::LongBreak,
        }
    }

    /// The running kind, if the countdown is live.
    pub fn active_kind(&self) -> Option<FocusKind> {
        match self {
            TimerState::Focusing => Some(FocusKind::Focusing),
            TimerState::ShortBreak => Some(FocusKind::ShortBreak),
            TimerState::LongBreak => Some(FocusKind::LongBreak),
            TimerState::Idle | TimerState::Paused { .. } => None,
        }
    }

    /// The kind of interval in progress, running or paused.
    pub fn current_kind(&self) -> Option<FocusKind> {
        match self {
            TimerState::Paused { previous } => Some(*previous),
            other => other.active_kind(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active_kind().is_some()
    }
}
