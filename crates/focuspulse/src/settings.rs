//! Focus and break durations

use serde::{Deserialize, Serialize};

use crate::error::{PulseError, Result};
use crate::session::Phase;

pub const DEFAULT_FOCUS_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;

/// Singleton settings owned by the store; the timer caches a copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub focus_minutes: u32,
    pub break_minutes: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_minutes: DEFAULT_FOCUS_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
        }
    }
}

impl Settings {
    /// Validated settings; both durations must be whole minutes >= 1
    pub fn new(focus_minutes: i64, break_minutes: i64) -> Result<Self> {
        Ok(Self {
            focus_minutes: validate_minutes("focus", focus_minutes)?,
            break_minutes: validate_minutes("break", break_minutes)?,
        })
    }

    /// Whether both fields satisfy the >= 1 invariant
    pub fn is_valid(&self) -> bool {
        self.focus_minutes >= 1 && self.break_minutes >= 1
    }

    pub fn minutes_for(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Focus => self.focus_minutes,
            Phase::Break => self.break_minutes,
        }
    }

    pub fn seconds_for(&self, phase: Phase) -> u64 {
        u64::from(self.minutes_for(phase)) * 60
    }
}

/// Check a single duration, returning it as stored minutes
pub fn validate_minutes(field: &'static str, minutes: i64) -> Result<u32> {
    match u32::try_from(minutes) {
        Ok(m) if m >= 1 => Ok(m),
        _ => Err(PulseError::InvalidDurationInput {
            field,
            input: minutes.to_string(),
        }),
    }
}

/// Parse a duration typed by the user
///
/// Only the numeric check happens here; range checks belong to the timer so
/// a rejected value never reaches the store.
pub fn parse_minutes(field: &'static str, input: &str) -> Result<i64> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|_| PulseError::InvalidDurationInput {
            field,
            input: input.to_string(),
        })
}
