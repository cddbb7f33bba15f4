//! Display formatting and history statistics
//!
//! The live counters (completed sessions, streak, focused time) live on
//! [`crate::timer::TimerState`]; this module formats them and aggregates the
//! stored history into totals.

use std::collections::BTreeSet;

use crate::session::{SessionType, StoredSession};

/// Countdown as `MM:SS`, zero-padded
pub fn format_countdown(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Accumulated focus time as `Hh Mm`
pub fn format_focus_time(seconds: u64) -> String {
    format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
}

/// Aggregated totals over stored session history
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryStats {
    /// Completed focus sessions
    pub work_sessions: u32,
    /// Completed breaks
    pub break_sessions: u32,
    /// Total focus time in minutes
    pub work_minutes: u64,
    /// Average focus session in minutes
    pub average_work_minutes: u64,
    /// Distinct calendar days with at least one session
    pub active_days: u32,
}

impl HistoryStats {
    /// Calculate statistics from stored sessions
    pub fn from_sessions(sessions: &[StoredSession]) -> Self {
        if sessions.is_empty() {
            return Self::default();
        }

        let work: Vec<&StoredSession> = sessions
            .iter()
            .filter(|s| s.kind() == SessionType::Work)
            .collect();

        let work_sessions = work.len() as u32;
        let break_sessions = sessions.len() as u32 - work_sessions;
        // Rows come from the store unchecked; widen before summing
        let work_minutes: u64 = work
            .iter()
            .filter_map(|s| s.duration)
            .map(u64::from)
            .sum();

        let average_work_minutes = if work_sessions > 0 {
            work_minutes / u64::from(work_sessions)
        } else {
            0
        };

        let active_days = sessions
            .iter()
            .filter_map(StoredSession::date)
            .collect::<BTreeSet<_>>()
            .len() as u32;

        Self {
            work_sessions,
            break_sessions,
            work_minutes,
            average_work_minutes,
            active_days,
        }
    }

    /// Total focus time as (hours, minutes)
    pub fn total_time(&self) -> (u64, u64) {
        (self.work_minutes / 60, self.work_minutes % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, minutes: u32, kind: Option<SessionType>) -> StoredSession {
        StoredSession {
            id: None,
            session_date: date.to_string(),
            start_time: None,
            end_time: None,
            duration: Some(minutes),
            session_type: kind,
        }
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(1500), "25:00");
        assert_eq!(format_countdown(299), "04:59");
        assert_eq!(format_countdown(0), "00:00");
        assert_eq!(format_countdown(120 * 60 + 5), "120:05");
    }

    #[test]
    fn test_format_focus_time() {
        assert_eq!(format_focus_time(0), "0h 0m");
        assert_eq!(format_focus_time(1500), "0h 25m");
        assert_eq!(format_focus_time(3 * 1500), "1h 15m");
        assert_eq!(format_focus_time(7259), "2h 0m");
    }

    #[test]
    fn test_empty_stats() {
        let stats = HistoryStats::from_sessions(&[]);
        assert_eq!(stats, HistoryStats::default());
    }

    #[test]
    fn test_stats_calculation() {
        let sessions = vec![
            row("2025-07-16", 25, Some(SessionType::Work)),
            row("2025-07-16", 5, Some(SessionType::Break)),
            row("2025-07-16", 25, Some(SessionType::Work)),
            row("2025-07-17", 45, None),
        ];

        let stats = HistoryStats::from_sessions(&sessions);
        assert_eq!(stats.work_sessions, 3);
        assert_eq!(stats.break_sessions, 1);
        assert_eq!(stats.work_minutes, 95);
        assert_eq!(stats.average_work_minutes, 31);
        assert_eq!(stats.active_days, 2);
        assert_eq!(stats.total_time(), (1, 35));
    }

    #[test]
    fn test_stats_huge_durations_do_not_overflow() {
        let sessions = vec![
            row("2025-07-16", u32::MAX, Some(SessionType::Work)),
            row("2025-07-17", u32::MAX, Some(SessionType::Work)),
        ];

        let stats = HistoryStats::from_sessions(&sessions);
        assert_eq!(stats.work_minutes, 2 * u64::from(u32::MAX));
        assert_eq!(stats.average_work_minutes, u64::from(u32::MAX));
        assert_eq!(
            stats.total_time(),
            (2 * u64::from(u32::MAX) / 60, 2 * u64::from(u32::MAX) % 60)
        );
    }
}
