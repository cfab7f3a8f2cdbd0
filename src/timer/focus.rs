use serde::{Deserialize, Serialize};

use crate::model::Timestamp;

/// Default focus session length in seconds.
pub const FOCUS_DEFAULT_SECS: u32 = 25 * 60;
/// Default break session length in seconds.
pub const BREAK_DEFAULT_SECS: u32 = 5 * 60;
/// Shortest session the timer will accept.
pub const MIN_SESSION_SECS: u32 = 60;
/// Longest session the timer will accept.
pub const MAX_SESSION_SECS: u32 = 180 * 60;

/// Which half of the focus/break cycle the timer is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Focus,
    Break,
}

impl TimerMode {
    pub fn opposite(self) -> TimerMode {
        match self {
            TimerMode::Focus => TimerMode::Break,
            TimerMode::Break => TimerMode::Focus,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimerMode::Focus => "focus",
            TimerMode::Break => "break",
        }
    }
}

impl Default for TimerMode {
    fn default() -> Self {
        TimerMode::Focus
    }
}

/// Countdown phase. "Paused" is `Idle` with the remaining value frozen at the
/// moment of pause; a running timer holds only its absolute end instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum TimerPhase {
    Idle { remaining_secs: u32 },
    Running { ends_at: Timestamp },
}

/// The focus/break countdown state machine.
///
/// Remaining time is always derived from the absolute `ends_at`, never from a
/// decremented counter, so delayed or dropped ticks cannot skew the countdown.
/// Transition calls in an invalid state are silent no-ops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusTimer {
    #[serde(default)]
    pub mode: TimerMode,
    #[serde(default = "default_phase")]
    pub phase: TimerPhase,
    /// Session length per mode; `set_preset` rewrites the current mode's.
    #[serde(default = "default_focus_secs")]
    focus_secs: u32,
    #[serde(default = "default_break_secs")]
    break_secs: u32,
}

fn default_phase() -> TimerPhase {
    TimerPhase::Idle {
        remaining_secs: FOCUS_DEFAULT_SECS,
    }
}

fn default_focus_secs() -> u32 {
    FOCUS_DEFAULT_SECS
}

fn default_break_secs() -> u32 {
    BREAK_DEFAULT_SECS
}

impl Default for FocusTimer {
    fn default() -> Self {
        FocusTimer {
            mode: TimerMode::Focus,
            phase: default_phase(),
            focus_secs: FOCUS_DEFAULT_SECS,
            break_secs: BREAK_DEFAULT_SECS,
        }
    }
}

fn clamp_session(secs: i64) -> u32 {
    secs.clamp(i64::from(MIN_SESSION_SECS), i64::from(MAX_SESSION_SECS)) as u32
}

fn remaining_from(ends_at: Timestamp, now: Timestamp) -> u32 {
    let ms = ends_at - now;
    if ms <= 0 { 0 } else { (ms as u64).div_ceil(1000) as u32 }
}

impl FocusTimer {
    /// A fresh idle timer with the given session lengths (both clamped).
    pub fn with_presets(focus_secs: u32, break_secs: u32) -> Self {
        let focus_secs = clamp_session(i64::from(focus_secs));
        let break_secs = clamp_session(i64::from(break_secs));
        FocusTimer {
            mode: TimerMode::Focus,
            phase: TimerPhase::Idle {
                remaining_secs: focus_secs,
            },
            focus_secs,
            break_secs,
        }
    }

    fn mode_default(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Focus => self.focus_secs,
            TimerMode::Break => self.break_secs,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, TimerPhase::Running { .. })
    }

    /// Seconds left on the countdown as of `now`.
    pub fn remaining_secs(&self, now: Timestamp) -> u32 {
        match self.phase {
            TimerPhase::Idle { remaining_secs } => remaining_secs,
            TimerPhase::Running { ends_at } => remaining_from(ends_at, now),
        }
    }

    /// True while a running countdown has reached zero.
    pub fn finished(&self, now: Timestamp) -> bool {
        matches!(self.phase, TimerPhase::Running { ends_at } if ends_at - now <= 0)
    }

    /// Begin counting down. A zero remaining falls back to the mode's
    /// session length. No-op while running.
    pub fn start(&mut self, now: Timestamp) {
        if let TimerPhase::Idle { remaining_secs } = self.phase {
            let secs = if remaining_secs == 0 {
                self.mode_default(self.mode)
            } else {
                remaining_secs
            };
            self.phase = TimerPhase::Running {
                ends_at: now + i64::from(secs) * 1000,
            };
        }
    }

    /// Freeze the countdown, rounding part-seconds up. No-op while idle.
    pub fn pause(&mut self, now: Timestamp) {
        if let TimerPhase::Running { ends_at } = self.phase {
            self.phase = TimerPhase::Idle {
                remaining_secs: remaining_from(ends_at, now),
            };
        }
    }

    /// Force idle at the current mode's full session length.
    pub fn reset(&mut self) {
        self.phase = TimerPhase::Idle {
            remaining_secs: self.mode_default(self.mode),
        };
    }

    /// Nudge the idle remaining time by whole minutes, clamped to the
    /// session range. No-op while running.
    pub fn adjust(&mut self, delta_minutes: i32) {
        if let TimerPhase::Idle { remaining_secs } = self.phase {
            let next = i64::from(remaining_secs) + i64::from(delta_minutes) * 60;
            self.phase = TimerPhase::Idle {
                remaining_secs: clamp_session(next),
            };
        }
    }

    /// Set the current mode's session length outright (clamped) and bring
    /// the idle remaining time to it. No-op while running.
    pub fn set_preset(&mut self, minutes: u32) {
        if matches!(self.phase, TimerPhase::Idle { .. }) {
            let secs = clamp_session(i64::from(minutes) * 60);
            match self.mode {
                TimerMode::Focus => self.focus_secs = secs,
                TimerMode::Break => self.break_secs = secs,
            }
            self.phase = TimerPhase::Idle {
                remaining_secs: secs,
            };
        }
    }

    /// Jump to the given mode at its full session length, optionally
    /// starting the countdown immediately. Discards any running countdown.
    pub fn switch_mode(&mut self, next: TimerMode, auto_start: bool, now: Timestamp) {
        self.mode = next;
        self.phase = TimerPhase::Idle {
            remaining_secs: self.mode_default(next),
        };
        if auto_start {
            self.start(now);
        }
    }

    /// Fold a finished countdown into the opposite mode, auto-starting it.
    /// Returns the mode that completed, or None when nothing finished.
    pub fn complete(&mut self, now: Timestamp) -> Option<TimerMode> {
        if !self.finished(now) {
            return None;
        }
        let finished = self.mode;
        self.switch_mode(finished.opposite(), true, now);
        Some(finished)
    }
}
