//! Phases and session records
//!
//! A session is one phase that counted all the way down to zero. The timer
//! turns each one into a [`SessionRecord`] and hands it to the store; the
//! store hands history back as [`StoredSession`] rows.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// The two alternating countdown modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Focus,
    Break,
}

impl Phase {
    /// The phase that follows this one
    pub fn other(&self) -> Self {
        match self {
            Phase::Focus => Phase::Break,
            Phase::Break => Phase::Focus,
        }
    }

    /// Status text shown next to the countdown
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Focus => "Focus Session",
            Phase::Break => "Break Time",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Focus => "focus",
            Phase::Break => "break",
        }
    }
}

/// Kind of a recorded session, as the store names it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    /// A completed focus phase
    Work,
    /// A completed break phase
    Break,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Work => "work",
            SessionType::Break => "break",
        }
    }
}

impl From<Phase> for SessionType {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Focus => SessionType::Work,
            Phase::Break => SessionType::Break,
        }
    }
}

/// One completed phase, sent to the store exactly once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Day the phase started (YYYY-MM-DD)
    pub session_date: NaiveDate,
    /// Wall-clock start (HH:MM)
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    /// Wall-clock end (HH:MM)
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    /// Configured length of the phase in minutes
    pub duration: u32,
    #[serde(rename = "type")]
    pub session_type: SessionType,
}

impl SessionRecord {
    /// Record for a phase that just counted down to zero
    pub fn completed(
        phase: Phase,
        minutes: u32,
        started_at: NaiveDateTime,
        ended_at: NaiveDateTime,
    ) -> Self {
        Self {
            session_date: started_at.date(),
            start_time: started_at.time(),
            end_time: ended_at.time(),
            duration: minutes,
            session_type: phase.into(),
        }
    }
}

/// A history row as returned by the store
///
/// Older backends only kept `{id, session_date, focus_minutes}`, so every
/// field beyond the date is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub session_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, alias = "focus_minutes", skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub session_type: Option<SessionType>,
}

impl StoredSession {
    /// Calendar day of the row, if the store sent something date-shaped
    pub fn date(&self) -> Option<NaiveDate> {
        let day = self.session_date.get(..10)?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }

    /// Rows without a type predate break tracking and count as work
    pub fn kind(&self) -> SessionType {
        self.session_type.unwrap_or(SessionType::Work)
    }
}

impl From<&SessionRecord> for StoredSession {
    fn from(record: &SessionRecord) -> Self {
        Self {
            id: None,
            session_date: record.session_date.format("%Y-%m-%d").to_string(),
            start_time: Some(record.start_time.format(hhmm::FORMAT).to_string()),
            end_time: Some(record.end_time.format(hhmm::FORMAT).to_string()),
            duration: Some(record.duration),
            session_type: Some(record.session_type),
        }
    }
}

/// `HH:MM` wall-clock times on the wire
mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(de::Error::custom)
    }
}
