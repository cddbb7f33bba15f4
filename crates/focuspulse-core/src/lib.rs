//! FocusPulse Core - Shared functionality for FocusPulse tools
//!
//! Where things live on disk and how the tools are configured.

pub mod config;
pub mod paths;

pub use config::{Config, StoreBackend, StoreConfig, TimerDefaults};
pub use paths::Paths;
