//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the gateway is up.
//!
//! # Tasks
//! - Cache sweep: Drops expired cache entries at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
