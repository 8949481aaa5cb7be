//! # Feewatch Core Library
//!
//! This library provides the core business logic for Feewatch, a
//! Bitcoin fee-rate watcher. It implements a CLI-first philosophy where
//! all operations are available via a standalone CLI binary, with any
//! richer frontend being a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Fee Source Client**: reqwest wrapper over the mempool.space API
//!   with a fixed timeout and strict response validation
//! - **Storage**: TOML-based settings record embedding a time-bounded
//!   fee cache
//! - **Badge Policy**: pure derivation of the badge text and color from
//!   a snapshot and the selected priority tier
//! - **Alert State Machine**: threshold-crossing detection with a
//!   15-minute notification cooldown
//! - **Sync Engine**: the periodic driver reacting to timer ticks,
//!   refresh requests and settings changes
//!
//! ## Key Components
//!
//! - [`FeeApiClient`]: fee-rate and block endpoints
//! - [`SettingsStore`]: settings and cache persistence
//! - [`SyncEngine`]: the orchestrator
//! - [`BadgeSink`] / [`NotificationSink`]: host capability seams

pub mod api;
pub mod alert;
pub mod badge;
pub mod error;
pub mod events;
pub mod fees;
pub mod sinks;
pub mod storage;
pub mod sync;

pub use api::FeeApiClient;
pub use alert::{AlertEvaluation, AlertSide};
pub use badge::BadgeConfig;
pub use error::{ApiError, ConfigError, CoreError, SinkError, StorageError};
pub use events::Event;
pub use fees::{FeeLevel, FeeRange, FeeSnapshot, Priority};
pub use sinks::{BadgeSink, NotificationSink};
pub use storage::{Settings, SettingsStore};
pub use sync::{Signal, SyncEngine};

pub(crate) fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
