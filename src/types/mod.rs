//! Core data types for the countdown timer.
//!
//! This module defines the data structures used for:
//! - Timer identity
//! - Threshold configuration with validation
//! - Timer modes and the pure mode derivation
//! - Sequence limits and persisted timer records

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ConfigError, TimerError};

// ============================================================================
// TimerId
// ============================================================================

/// Stable identifier of a timer, independent of its position in a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(Uuid);

impl TimerId {
    /// Generates a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the first eight hex digits, used for compact display.
    #[must_use]
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for TimerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// TimerSpec
// ============================================================================

/// Raw threshold values as they appear on the wire, before validation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct RawTimerSpec {
    starting_time: u32,
    #[serde(default)]
    warning_time: u32,
    #[serde(default)]
    final_time: u32,
}

/// Immutable countdown configuration in whole seconds.
///
/// A threshold of `0` means the phase is unset. When `warning_time` is unset,
/// `final_time` is only bounded by `starting_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimerSpec", into = "RawTimerSpec")]
pub struct TimerSpec {
    starting_time: u32,
    warning_time: u32,
    final_time: u32,
}

impl TimerSpec {
    /// Creates a spec, rejecting thresholds that break
    /// `final <= warning <= start`.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidThresholds`] if the ordering is violated.
    pub fn new(starting_time: u32, warning_time: u32, final_time: u32) -> Result<Self, TimerError> {
        let warning_ok = warning_time <= starting_time;
        let final_bound = if warning_time > 0 {
            warning_time
        } else {
            starting_time
        };
        if !warning_ok || final_time > final_bound {
            return Err(TimerError::InvalidThresholds {
                starting_time,
                warning_time,
                final_time,
            });
        }
        Ok(Self {
            starting_time,
            warning_time,
            final_time,
        })
    }

    /// Creates a spec with only a starting time and no intermediate phases.
    #[must_use]
    pub fn simple(starting_time: u32) -> Self {
        Self {
            starting_time,
            warning_time: 0,
            final_time: 0,
        }
    }

    /// Creates a spec, pulling warning and final down until they fit.
    ///
    /// Used by edit flows where shrinking the starting time must not leave
    /// thresholds above it.
    #[must_use]
    pub fn clamped(starting_time: u32, warning_time: u32, final_time: u32) -> Self {
        let warning_time = warning_time.min(starting_time);
        let final_bound = if warning_time > 0 {
            warning_time
        } else {
            starting_time
        };
        Self {
            starting_time,
            warning_time,
            final_time: final_time.min(final_bound),
        }
    }

    /// Returns a copy with a new starting time, re-clamping the thresholds.
    #[must_use]
    pub fn with_starting_time(self, starting_time: u32) -> Self {
        Self::clamped(starting_time, self.warning_time, self.final_time)
    }

    /// Returns a copy with a new warning threshold, re-clamping final.
    #[must_use]
    pub fn with_warning_time(self, warning_time: u32) -> Self {
        Self::clamped(self.starting_time, warning_time, self.final_time)
    }

    /// Returns a copy with a new final threshold.
    #[must_use]
    pub fn with_final_time(self, final_time: u32) -> Self {
        Self::clamped(self.starting_time, self.warning_time, final_time)
    }

    pub fn starting_time(&self) -> u32 {
        self.starting_time
    }

    pub fn warning_time(&self) -> u32 {
        self.warning_time
    }

    pub fn final_time(&self) -> u32 {
        self.final_time
    }

    /// A timer with no starting time is a placeholder, not a real countdown.
    pub fn is_configured(&self) -> bool {
        self.starting_time > 0
    }
}

impl TryFrom<RawTimerSpec> for TimerSpec {
    type Error = TimerError;

    fn try_from(raw: RawTimerSpec) -> Result<Self, Self::Error> {
        Self::new(raw.starting_time, raw.warning_time, raw.final_time)
    }
}

impl From<TimerSpec> for RawTimerSpec {
    fn from(spec: TimerSpec) -> Self {
        Self {
            starting_time: spec.starting_time,
            warning_time: spec.warning_time,
            final_time: spec.final_time,
        }
    }
}

impl FromStr for TimerSpec {
    type Err = TimerError;

    /// Parses `START[:WARNING[:FINAL]]` in seconds.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(TimerError::Parse(s.to_string()));
        }

        let mut values = [0u32; 3];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .trim()
                .parse()
                .map_err(|_| TimerError::Parse(s.to_string()))?;
        }

        Self::new(values[0], values[1], values[2])
    }
}

impl fmt::Display for TimerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.starting_time, self.warning_time, self.final_time
        )
    }
}

// ============================================================================
// RunningMode / TimerMode
// ============================================================================

/// Phase of a running countdown; the only modes a timer can be paused from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunningMode {
    /// Above the warning threshold
    Countdown,
    /// At or below the warning threshold
    Warning,
    /// At or below the final threshold
    Final,
}

impl RunningMode {
    /// Returns the running phase for `current_time` seconds remaining.
    ///
    /// Callers pass a non-zero time; zero is the alarm.
    pub fn at(current_time: u32, spec: &TimerSpec) -> Self {
        if current_time <= spec.final_time {
            RunningMode::Final
        } else if current_time <= spec.warning_time {
            RunningMode::Warning
        } else {
            RunningMode::Countdown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunningMode::Countdown => "countdown",
            RunningMode::Warning => "warning",
            RunningMode::Final => "final",
        }
    }
}

/// Represents the current mode of a timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TimerMode {
    /// Not started, or reset
    #[default]
    Stopped,
    /// Running above the warning threshold
    Countdown,
    /// Running at or below the warning threshold
    Warning,
    /// Running at or below the final threshold
    Final,
    /// Reached zero
    Alarm,
    /// Halted mid-run; `inner` is the phase to resume into
    Paused { inner: RunningMode },
}

impl TimerMode {
    /// Derives the mode from the timer's state.
    ///
    /// This is a pure function: identical inputs always give the same mode.
    /// `paused_from` is the running phase remembered by `pause()`.
    pub fn derive(
        spec: &TimerSpec,
        current_time: u32,
        is_running: bool,
        paused_from: Option<RunningMode>,
    ) -> Self {
        if is_running {
            if current_time == 0 {
                return TimerMode::Alarm;
            }
            return RunningMode::at(current_time, spec).into();
        }

        if let Some(inner) = paused_from {
            return TimerMode::Paused { inner };
        }

        if current_time == 0 && spec.is_configured() {
            TimerMode::Alarm
        } else {
            TimerMode::Stopped
        }
    }

    /// Returns the string representation of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Stopped => "stopped",
            TimerMode::Countdown => "countdown",
            TimerMode::Warning => "warning",
            TimerMode::Final => "final",
            TimerMode::Alarm => "alarm",
            TimerMode::Paused { .. } => "paused",
        }
    }

    /// Returns the running phase, if the timer is counting down.
    pub fn running(&self) -> Option<RunningMode> {
        match self {
            TimerMode::Countdown => Some(RunningMode::Countdown),
            TimerMode::Warning => Some(RunningMode::Warning),
            TimerMode::Final => Some(RunningMode::Final),
            _ => None,
        }
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, TimerMode::Paused { .. })
    }
}

impl From<RunningMode> for TimerMode {
    fn from(mode: RunningMode) -> Self {
        match mode {
            RunningMode::Countdown => TimerMode::Countdown,
            RunningMode::Warning => TimerMode::Warning,
            RunningMode::Final => TimerMode::Final,
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerMode::Paused { inner } => write!(f, "paused({})", inner.as_str()),
            other => f.write_str(other.as_str()),
        }
    }
}

// ============================================================================
// SequenceLimits
// ============================================================================

/// Capacity limits a host imposes on a timer sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceLimits {
    max_timers: usize,
    group_capacity: usize,
}

impl SequenceLimits {
    /// Creates limits for a sequence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if either limit is zero.
    pub fn new(max_timers: usize, group_capacity: usize) -> Result<Self, ConfigError> {
        if max_timers == 0 {
            return Err(ConfigError::Invalid(
                "max_timers は1以上を指定してください".to_string(),
            ));
        }
        if group_capacity == 0 {
            return Err(ConfigError::Invalid(
                "group_capacity は1以上を指定してください".to_string(),
            ));
        }
        Ok(Self {
            max_timers,
            group_capacity,
        })
    }

    pub fn max_timers(&self) -> usize {
        self.max_timers
    }

    pub fn group_capacity(&self) -> usize {
        self.group_capacity
    }
}

// ============================================================================
// TimerRecord
// ============================================================================

/// Persistable description of one timer in a sequence, keyed by id.
///
/// Records are ordered: their order within the same `group` is the slot order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerRecord {
    pub id: TimerId,
    pub group: usize,
    pub spec: TimerSpec,
}

// ============================================================================
// Tests
// ============================================================================
