//! The focus/break timer state machine
//!
//! Four observable states: idle or running, in either the focus or the break
//! phase. [`transition`] is pure: it takes the current [`TimerState`] and one
//! [`Event`], and returns the next state plus the [`Effect`]s the caller has
//! to carry out (ticking, store calls, user notices). Clock readings come in
//! on the events, so the machine never looks at the wall clock itself.

use chrono::NaiveDateTime;

use crate::session::{Phase, SessionRecord};
use crate::settings::{validate_minutes, Settings};

/// In-memory timer state; never persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    pub phase: Phase,
    pub running: bool,
    pub time_left_seconds: u64,
    /// When the current run of this phase was started
    pub phase_started_at: Option<NaiveDateTime>,
    /// Cached copy of the store's settings
    pub settings: Settings,
    pub completed_sessions: u32,
    pub total_focused_seconds: u64,
    /// Focus sessions completed since the last completed break
    pub streak: u32,
}

impl TimerState {
    /// Idle in the focus phase with a full countdown
    pub fn new(settings: Settings) -> Self {
        Self {
            phase: Phase::Focus,
            running: false,
            time_left_seconds: settings.seconds_for(Phase::Focus),
            phase_started_at: None,
            settings,
            completed_sessions: 0,
            total_focused_seconds: 0,
            streak: 0,
        }
    }

    /// Duration inputs, save, clear and history are disabled while a phase runs
    pub fn controls_locked(&self) -> bool {
        self.running
    }

    /// Configured length of the current phase
    pub fn phase_seconds(&self) -> u64 {
        self.settings.seconds_for(self.phase)
    }

    fn rewind(&mut self) {
        self.time_left_seconds = self.phase_seconds();
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

/// Everything that can happen to the timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start { at: NaiveDateTime },
    Pause,
    /// The start/pause button
    Toggle { at: NaiveDateTime },
    /// One second elapsed while running
    Tick { at: NaiveDateTime },
    Reset,
    ClearHistory,
    ChangeFocusDuration(i64),
    ChangeBreakDuration(i64),
    SaveSettings { focus_minutes: i64, break_minutes: i64 },
    /// Startup fetch answered
    SettingsLoaded(Settings),
    /// The store accepted a save
    SettingsSaved(Settings),
    ShowHistory,
}

/// Side effects requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartTicking,
    StopTicking,
    RecordSession(SessionRecord),
    PersistSettings(Settings),
    FetchHistory,
    Rejected(Rejection),
}

/// Why an event was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The named control is disabled while the timer runs
    ControlsLocked(&'static str),
    InvalidDuration { field: &'static str, value: i64 },
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::ControlsLocked(action) => {
                write!(f, "Cannot {} while the timer is running", action)
            }
            Rejection::InvalidDuration { field, value } => write!(
                f,
                "Please enter valid durations for focus and break ({} = {})",
                field, value
            ),
        }
    }
}

/// Result of applying one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: TimerState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn quiet(state: TimerState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    fn with(state: TimerState, effects: Vec<Effect>) -> Self {
        Self { state, effects }
    }

    fn rejected(state: TimerState, rejection: Rejection) -> Self {
        Self::with(state, vec![Effect::Rejected(rejection)])
    }
}

/// Apply one event to the timer
pub fn transition(mut state: TimerState, event: Event) -> Transition {
    match event {
        Event::Start { at } => start(state, at),
        Event::Pause => pause(state),
        Event::Toggle { at } => {
            if state.running {
                pause(state)
            } else {
                start(state, at)
            }
        }
        Event::Tick { at } => tick(state, at),
        Event::Reset => {
            let was_running = state.running;
            state.running = false;
            state.rewind();
            let effects = if was_running {
                vec![Effect::StopTicking]
            } else {
                Vec::new()
            };
            Transition::with(state, effects)
        }
        Event::ClearHistory => {
            if state.controls_locked() {
                return Transition::rejected(state, Rejection::ControlsLocked("clear history"));
            }
            state.completed_sessions = 0;
            state.streak = 0;
            state.total_focused_seconds = 0;
            Transition::quiet(state)
        }
        Event::ChangeFocusDuration(minutes) => change_duration(state, Phase::Focus, minutes),
        Event::ChangeBreakDuration(minutes) => change_duration(state, Phase::Break, minutes),
        Event::SaveSettings {
            focus_minutes,
            break_minutes,
        } => {
            if state.controls_locked() {
                return Transition::rejected(state, Rejection::ControlsLocked("save settings"));
            }
            match (
                validate_minutes("focus", focus_minutes),
                validate_minutes("break", break_minutes),
            ) {
                (Ok(focus_minutes), Ok(break_minutes)) => {
                    let settings = Settings {
                        focus_minutes,
                        break_minutes,
                    };
                    Transition::with(state, vec![Effect::PersistSettings(settings)])
                }
                (Err(_), _) => Transition::rejected(
                    state,
                    Rejection::InvalidDuration {
                        field: "focus",
                        value: focus_minutes,
                    },
                ),
                (_, Err(_)) => Transition::rejected(
                    state,
                    Rejection::InvalidDuration {
                        field: "break",
                        value: break_minutes,
                    },
                ),
            }
        }
        Event::SettingsLoaded(settings) | Event::SettingsSaved(settings) => {
            if !settings.is_valid() {
                return Transition::quiet(state);
            }
            state.settings = settings;
            if !state.running {
                state.rewind();
            }
            Transition::quiet(state)
        }
        Event::ShowHistory => {
            if state.controls_locked() {
                return Transition::rejected(state, Rejection::ControlsLocked("show history"));
            }
            Transition::with(state, vec![Effect::FetchHistory])
        }
    }
}

fn start(mut state: TimerState, at: NaiveDateTime) -> Transition {
    if state.running {
        return Transition::quiet(state);
    }
    state.running = true;
    state.phase_started_at = Some(at);
    Transition::with(state, vec![Effect::StartTicking])
}

fn pause(mut state: TimerState) -> Transition {
    if !state.running {
        return Transition::quiet(state);
    }
    // Elapsed time of the partial phase is dropped; nothing is recorded.
    state.running = false;
    Transition::with(state, vec![Effect::StopTicking])
}

fn tick(mut state: TimerState, at: NaiveDateTime) -> Transition {
    if !state.running {
        return Transition::quiet(state);
    }
    state.time_left_seconds = state.time_left_seconds.saturating_sub(1);
    if state.time_left_seconds > 0 {
        return Transition::quiet(state);
    }
    complete(state, at)
}

fn complete(mut state: TimerState, at: NaiveDateTime) -> Transition {
    let finished = state.phase;
    let minutes = state.settings.minutes_for(finished);

    match finished {
        Phase::Focus => {
            state.completed_sessions += 1;
            state.total_focused_seconds += state.settings.seconds_for(Phase::Focus);
            state.streak += 1;
        }
        Phase::Break => state.streak = 0,
    }

    let started_at = state.phase_started_at.take().unwrap_or(at);
    let record = SessionRecord::completed(finished, minutes, started_at, at);

    state.running = false;
    state.phase = finished.other();
    state.rewind();

    Transition::with(state, vec![Effect::StopTicking, Effect::RecordSession(record)])
}

fn change_duration(mut state: TimerState, phase: Phase, minutes: i64) -> Transition {
    let field = phase.as_str();
    if state.controls_locked() {
        let action = match phase {
            Phase::Focus => "change the focus duration",
            Phase::Break => "change the break duration",
        };
        return Transition::rejected(state, Rejection::ControlsLocked(action));
    }
    let minutes = match validate_minutes(field, minutes) {
        Ok(m) => m,
        Err(_) => {
            return Transition::rejected(
                state,
                Rejection::InvalidDuration {
                    field,
                    value: minutes,
                },
            )
        }
    };

    match phase {
        Phase::Focus => state.settings.focus_minutes = minutes,
        Phase::Break => state.settings.break_minutes = minutes,
    }
    if state.phase == phase {
        state.rewind();
    }
    Transition::quiet(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionType;
    use chrono::{Duration, NaiveDate};

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 16)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn apply(state: TimerState, event: Event) -> TimerState {
        transition(state, event).state
    }

    fn running(settings: Settings) -> TimerState {
        apply(TimerState::new(settings), Event::Start { at: t0() })
    }

    #[test]
    fn test_initial_state() {
        let state = TimerState::default();
        assert_eq!(state.phase, Phase::Focus);
        assert!(!state.running);
        assert_eq!(state.time_left_seconds, 1500);
        assert!(state.phase_started_at.is_none());
        assert!(!state.controls_locked());
    }

    #[test]
    fn test_start_locks_controls_and_ticks() {
        let t = transition(TimerState::default(), Event::Start { at: t0() });
        assert!(t.state.running);
        assert!(t.state.controls_locked());
        assert_eq!(t.state.phase_started_at, Some(t0()));
        assert_eq!(t.effects, vec![Effect::StartTicking]);
    }

    #[test]
    fn test_start_while_running_is_ignored() {
        let state = running(Settings::default());
        let t = transition(state.clone(), Event::Start { at: t0() + Duration::seconds(5) });
        assert_eq!(t.state, state);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_toggle_flips_between_start_and_pause() {
        let t = transition(TimerState::default(), Event::Toggle { at: t0() });
        assert!(t.state.running);
        let t = transition(t.state, Event::Toggle { at: t0() });
        assert!(!t.state.running);
        assert_eq!(t.effects, vec![Effect::StopTicking]);
    }

    #[test]
    fn test_tick_counts_down() {
        let state = apply(running(Settings::default()), Event::Tick { at: t0() });
        assert_eq!(state.time_left_seconds, 1499);
        assert!(state.running);
    }

    #[test]
    fn test_tick_while_idle_is_ignored() {
        let state = TimerState::default();
        let t = transition(state.clone(), Event::Tick { at: t0() });
        assert_eq!(t.state, state);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_pause_keeps_time_left() {
        let mut state = running(Settings::default());
        for _ in 0..10 {
            state = apply(state, Event::Tick { at: t0() });
        }
        let t = transition(state, Event::Pause);
        assert!(!t.state.running);
        assert_eq!(t.state.time_left_seconds, 1490);
        assert_eq!(t.effects, vec![Effect::StopTicking]);
    }

    #[test]
    fn test_pause_while_idle_is_ignored() {
        let t = transition(TimerState::default(), Event::Pause);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_reset_while_idle_rewinds_without_stopping() {
        let mut state = running(Settings::default());
        state = apply(state, Event::Tick { at: t0() });
        state = apply(state, Event::Pause);
        let t = transition(state, Event::Reset);
        assert_eq!(t.state.time_left_seconds, 1500);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_change_focus_duration_while_idle_in_focus() {
        for n in [1_i64, 7, 25, 90, 600] {
            let state = apply(TimerState::default(), Event::ChangeFocusDuration(n));
            assert_eq!(state.time_left_seconds, n as u64 * 60);
            assert_eq!(state.settings.focus_minutes, n as u32);
        }
    }

    #[test]
    fn test_change_break_duration_while_in_focus_keeps_countdown() {
        let state = apply(TimerState::default(), Event::ChangeBreakDuration(12));
        assert_eq!(state.settings.break_minutes, 12);
        assert_eq!(state.time_left_seconds, 1500);
    }

    #[test]
    fn test_change_duration_rejects_invalid() {
        let state = TimerState::default();
        let t = transition(state.clone(), Event::ChangeFocusDuration(0));
        assert_eq!(t.state, state);
        assert_eq!(
            t.effects,
            vec![Effect::Rejected(Rejection::InvalidDuration {
                field: "focus",
                value: 0
            })]
        );
    }

    #[test]
    fn test_change_duration_while_running_rejected() {
        let state = running(Settings::default());
        let t = transition(state.clone(), Event::ChangeFocusDuration(10));
        assert_eq!(t.state, state);
        assert!(matches!(
            t.effects.as_slice(),
            [Effect::Rejected(Rejection::ControlsLocked(_))]
        ));
    }

    #[test]
    fn test_focus_completion() {
        let settings = Settings {
            focus_minutes: 1,
            break_minutes: 2,
        };
        let mut state = running(settings);
        let mut effects = Vec::new();
        for i in 1..=60 {
            let t = transition(state, Event::Tick { at: t0() + Duration::seconds(i) });
            state = t.state;
            effects.extend(t.effects);
        }

        assert_eq!(state.phase, Phase::Break);
        assert!(!state.running);
        assert_eq!(state.time_left_seconds, 120);
        assert_eq!(state.completed_sessions, 1);
        assert_eq!(state.streak, 1);
        assert_eq!(state.total_focused_seconds, 60);
        assert!(state.phase_started_at.is_none());

        let records: Vec<_> = effects
            .iter()
            .filter_map(|e| match e {
                Effect::RecordSession(r) => Some(r),
                _ => None,
            })
            .collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].session_type, SessionType::Work);
        assert_eq!(records[0].duration, 1);
        assert_eq!(records[0].start_time.to_string(), "09:00:00");
        assert_eq!(records[0].end_time.to_string(), "09:01:00");
        assert!(effects.contains(&Effect::StopTicking));
    }

    #[test]
    fn test_break_completion_resets_streak() {
        let mut state = TimerState::default();
        state.phase = Phase::Break;
        state.time_left_seconds = 1;
        state.streak = 4;
        state.completed_sessions = 4;
        state = apply(state, Event::Start { at: t0() });

        let t = transition(state, Event::Tick { at: t0() });
        assert_eq!(t.state.streak, 0);
        assert_eq!(t.state.completed_sessions, 4);
        assert_eq!(t.state.phase, Phase::Focus);
        assert_eq!(t.state.time_left_seconds, 1500);
        assert!(matches!(
            t.effects.as_slice(),
            [Effect::StopTicking, Effect::RecordSession(r)] if r.session_type == SessionType::Break && r.duration == 5
        ));
    }

    #[test]
    fn test_clear_history_while_idle() {
        let mut state = TimerState::default();
        state.phase = Phase::Break;
        state.time_left_seconds = 42;
        state.completed_sessions = 3;
        state.streak = 2;
        state.total_focused_seconds = 4500;

        let t = transition(state, Event::ClearHistory);
        assert_eq!(t.state.completed_sessions, 0);
        assert_eq!(t.state.streak, 0);
        assert_eq!(t.state.total_focused_seconds, 0);
        assert_eq!(t.state.phase, Phase::Break);
        assert_eq!(t.state.time_left_seconds, 42);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_clear_history_while_running_rejected() {
        let mut state = running(Settings::default());
        state.completed_sessions = 2;
        let t = transition(state.clone(), Event::ClearHistory);
        assert_eq!(t.state, state);
        assert_eq!(
            t.effects,
            vec![Effect::Rejected(Rejection::ControlsLocked("clear history"))]
        );
    }

    #[test]
    fn test_save_settings_validates_before_persisting() {
        let state = TimerState::default();
        let t = transition(
            state.clone(),
            Event::SaveSettings {
                focus_minutes: 0,
                break_minutes: 10,
            },
        );
        assert_eq!(t.state, state);
        assert_eq!(
            t.effects,
            vec![Effect::Rejected(Rejection::InvalidDuration {
                field: "focus",
                value: 0
            })]
        );
    }

    #[test]
    fn test_save_settings_does_not_apply_until_saved() {
        let state = TimerState::default();
        let t = transition(
            state.clone(),
            Event::SaveSettings {
                focus_minutes: 30,
                break_minutes: 10,
            },
        );
        assert_eq!(t.state, state);
        let saved = Settings {
            focus_minutes: 30,
            break_minutes: 10,
        };
        assert_eq!(t.effects, vec![Effect::PersistSettings(saved)]);

        let state = apply(t.state, Event::SettingsSaved(saved));
        assert_eq!(state.settings, saved);
        assert_eq!(state.time_left_seconds, 1800);
    }

    #[test]
    fn test_settings_loaded_while_running_keeps_countdown() {
        let state = apply(running(Settings::default()), Event::Tick { at: t0() });
        let loaded = Settings {
            focus_minutes: 50,
            break_minutes: 10,
        };
        let state = apply(state, Event::SettingsLoaded(loaded));
        assert_eq!(state.settings, loaded);
        assert_eq!(state.time_left_seconds, 1499);
    }

    #[test]
    fn test_settings_loaded_ignores_invalid_payload() {
        let state = TimerState::default();
        let bad = Settings {
            focus_minutes: 0,
            break_minutes: 5,
        };
        assert_eq!(apply(state.clone(), Event::SettingsLoaded(bad)), state);
    }

    #[test]
    fn test_show_history() {
        let t = transition(TimerState::default(), Event::ShowHistory);
        assert_eq!(t.effects, vec![Effect::FetchHistory]);

        let t = transition(running(Settings::default()), Event::ShowHistory);
        assert_eq!(
            t.effects,
            vec![Effect::Rejected(Rejection::ControlsLocked("show history"))]
        );
    }
}
