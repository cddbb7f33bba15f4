//! focuspulse - Focus/break interval timer with persisted history
//!
//! Alternates between a focus countdown and a break countdown. Each phase
//! that runs all the way down is recorded to a settings & session store,
//! either the REST backend or a local file store.
//!
//! - `timer`: the pure state machine (`transition(state, event)`)
//! - `runtime`: the tokio event loop that ticks it and talks to the store
//! - `store`: HTTP and file-backed store clients
//! - `stats`: countdown / focus-time formatting and history totals

pub mod error;
pub mod runtime;
pub mod session;
pub mod settings;
pub mod stats;
pub mod store;
pub mod timer;

pub use error::{PulseError, StoreError};
pub use runtime::{Command, Notice, Runtime, Update};
pub use session::{Phase, SessionRecord, SessionType, StoredSession};
pub use settings::Settings;
pub use stats::HistoryStats;
pub use store::{build_store, FileStore, HttpStore, Store};
pub use timer::{transition, Effect, Event, Rejection, TimerState, Transition};
