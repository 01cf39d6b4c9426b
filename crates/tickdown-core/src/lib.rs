//! # Tickdown Core Library
//!
//! This library provides the core business logic for the Tickdown task
//! timer. It implements a CLI-first philosophy where all operations are
//! available via a standalone CLI binary, with any richer frontend being
//! a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Task Store**: Day-bucketed tasks with per-task countdown state;
//!   at most one countdown runs at a time
//! - **Reconciliation**: Wall-clock expiry that requires the caller to
//!   periodically invoke [`reconcile()`] for progress updates
//! - **Storage**: SQLite-based key-value persistence and TOML-based
//!   configuration
//! - **Reports**: Plain-text export of past days' tasks
//!
//! ## Key Components
//!
//! - [`TaskStore`]: Day buckets and the operations over them
//! - [`Task`]: A single task and its countdown state machine
//! - [`Database`]: Key-value persistence
//! - [`Config`]: Application configuration management
//! - [`AlertSink`]: Trait for expiry alert frontends

pub mod task;
pub mod store;
pub mod reconcile;
pub mod alert;
pub mod report;
pub mod storage;
pub mod profile;
pub mod events;
pub mod error;

pub use task::{Task, TimerState};
pub use store::{DateKey, TaskStore};
pub use reconcile::{dispatch_alerts, reconcile, ReconcileOutcome};
pub use alert::AlertSink;
pub use storage::{Config, Database, KvStore, MemoryKv};
pub use profile::Profile;
pub use events::Event;
pub use error::{
    Confirmation, ConfigError, CoreError, PlaybackError, StorageError, TransitionError,
    ValidationError,
};
