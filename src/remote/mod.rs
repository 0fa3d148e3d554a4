//! Remote Progress Service Module
//!
//! The adapter boundary between the store and the progress backend.
//!
//! # Implementations
//! - `HttpProgressService`: REST client over reqwest
//! - `TimeoutService`: bounds every call of another service
//! - `InMemoryProgressService`: in-process backend for tests and offline runs

mod http;
mod memory;
mod timeout;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{AggregateProgress, Lesson, Module, ProgressRecord};
use crate::status::ProgressStatus;

pub use http::HttpProgressService;
pub use memory::InMemoryProgressService;
pub use timeout::{TimeoutService, DEFAULT_TIMEOUT};

/// Remote source of truth for course structure and lesson progress.
///
/// Implementations report failures as `ProgressError::Remote` (or
/// `Timeout` when bounded) and never retry.
#[async_trait]
pub trait ProgressService: Send + Sync {
    /// Course-level completion summary.
    async fn fetch_course_progress(&self, course_id: &str) -> Result<AggregateProgress>;

    async fn fetch_lesson_status(
        &self,
        course_id: &str,
        module_id: &str,
        lesson_id: &str,
    ) -> Result<ProgressRecord>;

    /// Writes a lesson status and returns the stored record.
    async fn update_lesson_status(
        &self,
        course_id: &str,
        module_id: &str,
        lesson_id: &str,
        status: ProgressStatus,
    ) -> Result<ProgressRecord>;

    /// Lesson metadata for one module.
    async fn fetch_lessons(&self, course_id: &str, module_id: &str) -> Result<Vec<Lesson>>;

    /// Module metadata for the course.
    async fn fetch_modules(&self, course_id: &str) -> Result<Vec<Module>>;
}
