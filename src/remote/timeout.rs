//! Timeout Service
//!
//! Bounds every call of another progress service by a wall-clock timeout.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::error::{ProgressError, Result};
use crate::models::{AggregateProgress, Lesson, Module, ProgressRecord};
use crate::remote::ProgressService;
use crate::status::ProgressStatus;

/// Default bound on a single remote call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(7000);

/// Wraps a service so every call settles within a fixed wall-clock bound.
///
/// A call that outlives the bound is dropped, which aborts the in-flight
/// request, and reported as `ProgressError::Timeout`.
#[derive(Debug)]
pub struct TimeoutService<S> {
    inner: S,
    timeout: Duration,
}

impl<S> TimeoutService<S> {
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(&self, operation: &str, call: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, timeout_ms = self.timeout.as_millis() as u64, "progress service call timed out");
                Err(ProgressError::Timeout(self.timeout))
            }
        }
    }
}

#[async_trait]
impl<S: ProgressService> ProgressService for TimeoutService<S> {
    async fn fetch_course_progress(&self, course_id: &str) -> Result<AggregateProgress> {
        self.bounded(
            "fetch_course_progress",
            self.inner.fetch_course_progress(course_id),
        )
        .await
    }

    async fn fetch_lesson_status(
        &self,
        course_id: &str,
        module_id: &str,
        lesson_id: &str,
    ) -> Result<ProgressRecord> {
        self.bounded(
            "fetch_lesson_status",
            self.inner.fetch_lesson_status(course_id, module_id, lesson_id),
        )
        .await
    }

    async fn update_lesson_status(
        &self,
        course_id: &str,
        module_id: &str,
        lesson_id: &str,
        status: ProgressStatus,
    ) -> Result<ProgressRecord> {
        self.bounded(
            "update_lesson_status",
            self.inner
                .update_lesson_status(course_id, module_id, lesson_id, status),
        )
        .await
    }

    async fn fetch_lessons(&self, course_id: &str, module_id: &str) -> Result<Vec<Lesson>> {
        self.bounded("fetch_lessons", self.inner.fetch_lessons(course_id, module_id))
            .await
    }

    async fn fetch_modules(&self, course_id: &str) -> Result<Vec<Module>> {
        self.bounded("fetch_modules", self.inner.fetch_modules(course_id))
            .await
    }
}
