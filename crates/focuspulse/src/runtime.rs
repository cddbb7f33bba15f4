//! Event loop around the timer
//!
//! One task owns the [`TimerState`] and is the only place it changes. It
//! waits on three sources: user [`Command`]s, completions coming back from
//! store calls, and the 1-second ticker while a phase runs. Store calls are
//! spawned rather than awaited inline, so a slow or failing backend can't
//! hold up the countdown. On quit the loop gives them [`SHUTDOWN_GRACE`] to
//! finish so a just-completed session still reaches the store.

use chrono::{Local, NaiveDateTime};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::error::PulseError;
use crate::session::{SessionRecord, StoredSession};
use crate::settings::Settings;
use crate::store::Store;
use crate::timer::{transition, Effect, Event, Rejection, TimerState};

const TICK_PERIOD: Duration = Duration::from_secs(1);
/// How long store calls still in flight get to finish after quitting
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// What the user can ask for; timestamps are added by the loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Toggle,
    Reset,
    ClearHistory,
    SetFocus(i64),
    SetBreak(i64),
    SaveSettings { focus_minutes: i64, break_minutes: i64 },
    ShowHistory,
    Quit,
}

impl Command {
    /// Stamp the command into a timer event; `Quit` has none
    pub fn into_event(self, now: NaiveDateTime) -> Option<Event> {
        let event = match self {
            Command::Start => Event::Start { at: now },
            Command::Pause => Event::Pause,
            Command::Toggle => Event::Toggle { at: now },
            Command::Reset => Event::Reset,
            Command::ClearHistory => Event::ClearHistory,
            Command::SetFocus(minutes) => Event::ChangeFocusDuration(minutes),
            Command::SetBreak(minutes) => Event::ChangeBreakDuration(minutes),
            Command::SaveSettings {
                focus_minutes,
                break_minutes,
            } => Event::SaveSettings {
                focus_minutes,
                break_minutes,
            },
            Command::ShowHistory => Event::ShowHistory,
            Command::Quit => return None,
        };
        Some(event)
    }
}

/// Messages for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    SettingsSaved(Settings),
    SettingsSaveFailed(String),
    HistoryFailed(String),
    Rejected(Rejection),
}

/// Everything the display needs to hear about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    /// Snapshot after every handled event
    State(TimerState),
    PhaseCompleted(SessionRecord),
    Notice(Notice),
    History(Vec<StoredSession>),
}

/// Owner of the timer state and its single ticker
pub struct Runtime {
    state: TimerState,
    store: Arc<dyn Store>,
    ticker: Option<Interval>,
    updates: mpsc::UnboundedSender<Update>,
    completions_tx: mpsc::UnboundedSender<Event>,
    completions_rx: mpsc::UnboundedReceiver<Event>,
    /// Spawned store calls; drained on shutdown so none is cut off
    in_flight: JoinSet<()>,
}

impl Runtime {
    /// Runtime starting idle in focus with the given fallback settings
    pub fn new(
        fallback: Settings,
        store: Arc<dyn Store>,
        updates: mpsc::UnboundedSender<Update>,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            state: TimerState::new(fallback),
            store,
            ticker: None,
            updates,
            completions_tx,
            completions_rx,
            in_flight: JoinSet::new(),
        }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Whether the 1-second ticker is armed
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    /// Ask the store for settings; the answer arrives as [`Event::SettingsLoaded`]
    pub fn load_settings(&mut self) {
        let store = Arc::clone(&self.store);
        let completions = self.completions_tx.clone();
        self.in_flight.spawn(async move {
            match store.fetch_settings().await {
                Ok(settings) => {
                    debug!(?settings, "settings fetched");
                    let _ = completions.send(Event::SettingsLoaded(settings));
                }
                Err(e) => warn!("{}; keeping defaults", PulseError::SettingsFetchFailed(e)),
            }
        });
    }

    /// Apply one event and carry out what it asks for
    pub fn handle(&mut self, event: Event) {
        let saved = match &event {
            Event::SettingsSaved(settings) => Some(*settings),
            _ => None,
        };

        let outcome = transition(self.state.clone(), event);
        self.state = outcome.state;

        for effect in outcome.effects {
            self.execute(effect);
        }
        if let Some(settings) = saved {
            self.emit(Update::Notice(Notice::SettingsSaved(settings)));
        }
        self.emit(Update::State(self.state.clone()));
    }

    /// Drive the timer until `Quit` or the command channel closes
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> TimerState {
        self.load_settings();
        self.emit(Update::State(self.state.clone()));

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let now = Local::now().naive_local();
                    match command.and_then(|c| c.into_event(now)) {
                        Some(event) => self.handle(event),
                        None => break,
                    }
                }
                Some(event) = self.completions_rx.recv() => self.handle(event),
                _ = next_tick(&mut self.ticker) => {
                    self.handle(Event::Tick { at: Local::now().naive_local() });
                }
                Some(_) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {}
            }
        }

        self.ticker = None;
        if !self.in_flight.is_empty() {
            debug!(pending = self.in_flight.len(), "waiting for store calls");
            let in_flight = &mut self.in_flight;
            let drained = time::timeout(SHUTDOWN_GRACE, async {
                while in_flight.join_next().await.is_some() {}
            })
            .await;
            if drained.is_err() {
                warn!(
                    pending = self.in_flight.len(),
                    "store calls still running at shutdown"
                );
            }
        }

        info!("timer stopped");
        self.state
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::StartTicking => {
                let mut interval = time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
                interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
                self.ticker = Some(interval);
            }
            Effect::StopTicking => self.ticker = None,
            Effect::RecordSession(record) => {
                info!(
                    kind = record.session_type.as_str(),
                    minutes = record.duration,
                    "phase complete"
                );
                self.emit(Update::PhaseCompleted(record.clone()));

                let store = Arc::clone(&self.store);
                self.in_flight.spawn(async move {
                    match store.record_session(&record).await {
                        Ok(()) => debug!(?record, "session saved"),
                        Err(e) => error!("{}", PulseError::SessionSaveFailed(e)),
                    }
                });
            }
            Effect::PersistSettings(settings) => {
                let store = Arc::clone(&self.store);
                let completions = self.completions_tx.clone();
                let updates = self.updates.clone();
                self.in_flight.spawn(async move {
                    match store.save_settings(&settings).await {
                        Ok(()) => {
                            let _ = completions.send(Event::SettingsSaved(settings));
                        }
                        Err(e) => {
                            let err = PulseError::SettingsSaveFailed(e);
                            error!("{}", err);
                            let _ = updates
                                .send(Update::Notice(Notice::SettingsSaveFailed(err.to_string())));
                        }
                    }
                });
            }
            Effect::FetchHistory => {
                let store = Arc::clone(&self.store);
                let updates = self.updates.clone();
                self.in_flight.spawn(async move {
                    let update = match store.list_sessions().await {
                        Ok(sessions) => Update::History(sessions),
                        Err(e) => {
                            let err = PulseError::HistoryFetchFailed(e);
                            error!("{}", err);
                            Update::Notice(Notice::HistoryFailed(err.to_string()))
                        }
                    };
                    let _ = updates.send(update);
                });
            }
            Effect::Rejected(rejection) => {
                debug!(%rejection, "event rejected");
                self.emit(Update::Notice(Notice::Rejected(rejection)));
            }
        }
    }

    fn emit(&self, update: Update) {
        // The display may have gone away; the timer keeps its own state regardless
        let _ = self.updates.send(update);
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
