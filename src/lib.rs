//! Course Progress - a client-side progress store for a learning platform
//!
//! Serves course, module and lesson progress through a TTL-bounded cache in
//! front of a REST progress service, and applies status changes
//! optimistically with rollback on failure.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod keys;
pub mod models;
pub mod optimistic;
pub mod remote;
pub mod status;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{ProgressError, RemoteErrorKind, Result};
pub use status::{LegacyStatus, ProgressStatus};
pub use store::ProgressStore;
pub use tasks::spawn_cleanup_task;
