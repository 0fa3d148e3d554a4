//! In-Memory Progress Service
//!
//! In-process backend with fault injection, used by tests and offline runs.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::{ProgressError, Result};
use crate::models::{AggregateProgress, Lesson, Module, ProgressRecord};
use crate::remote::ProgressService;
use crate::status::ProgressStatus;

#[derive(Debug, Default)]
struct Course {
    modules: Vec<Module>,
    lessons: HashMap<String, Vec<Lesson>>,
    records: HashMap<(String, String), ProgressRecord>,
}

#[derive(Debug, Default)]
struct Faults {
    updates: bool,
    modules: HashSet<String>,
    lesson_status: HashSet<(String, String)>,
}

/// Per-operation call counters.
#[derive(Debug, Default)]
pub struct CallCounts {
    pub course_progress: AtomicUsize,
    pub lesson_status: AtomicUsize,
    pub updates: AtomicUsize,
    pub lessons: AtomicUsize,
    pub modules: AtomicUsize,
}

/// Progress service held entirely in memory.
///
/// Serves one course at a time; any other course id reads as not found.
/// Faults can be injected per operation, and an artificial latency makes
/// every call wait before answering.
#[derive(Debug)]
pub struct InMemoryProgressService {
    course_id: String,
    course: RwLock<Course>,
    faults: RwLock<Faults>,
    latency: Option<Duration>,
    pub calls: CallCounts,
}

impl InMemoryProgressService {
    pub fn new(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            course: RwLock::new(Course::default()),
            faults: RwLock::new(Faults::default()),
            latency: None,
            calls: CallCounts::default(),
        }
    }

    /// Delays every answer by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Adds a module with the given lesson ids, all not started.
    pub async fn add_module(&self, module_id: &str, lesson_ids: &[&str]) {
        let mut course = self.course.write().await;
        let position = course.modules.len() as i64;
        course.modules.push(Module {
            id: module_id.to_string(),
            title: format!("Module {}", module_id),
            order: Some(position),
        });

        let lessons = lesson_ids
            .iter()
            .enumerate()
            .map(|(i, id)| Lesson {
                id: id.to_string(),
                title: format!("Lesson {}", id),
                order: Some(i as i64),
            })
            .collect();
        course.lessons.insert(module_id.to_string(), lessons);

        for lesson_id in lesson_ids {
            let record = ProgressRecord::not_started(&self.course_id, module_id, *lesson_id);
            course
                .records
                .insert((module_id.to_string(), lesson_id.to_string()), record);
        }
    }

    /// Sets a lesson status directly, bypassing fault injection and counters.
    pub async fn seed_status(&self, module_id: &str, lesson_id: &str, status: ProgressStatus) {
        let mut course = self.course.write().await;
        if let Some(record) = course
            .records
            .get_mut(&(module_id.to_string(), lesson_id.to_string()))
        {
            record.status = status;
            record.updated_at = Utc::now();
        }
    }

    pub async fn status_of(&self, module_id: &str, lesson_id: &str) -> Option<ProgressStatus> {
        let course = self.course.read().await;
        course
            .records
            .get(&(module_id.to_string(), lesson_id.to_string()))
            .map(|record| record.status)
    }

    pub async fn fail_updates(&self, fail: bool) {
        self.faults.write().await.updates = fail;
    }

    pub async fn fail_module(&self, module_id: &str) {
        self.faults.write().await.modules.insert(module_id.to_string());
    }

    pub async fn fail_lesson_status(&self, module_id: &str, lesson_id: &str) {
        self.faults
            .write()
            .await
            .lesson_status
            .insert((module_id.to_string(), lesson_id.to_string()));
    }

    async fn settle(&self, course_id: &str) -> Result<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if course_id != self.course_id {
            return Err(ProgressError::remote(
                404,
                format!("Course {} not found", course_id),
            ));
        }
        Ok(())
    }
}

fn lesson_not_found(module_id: &str, lesson_id: &str) -> ProgressError {
    ProgressError::remote(
        404,
        format!("Lesson {} not found in module {}", lesson_id, module_id),
    )
}

#[async_trait]
impl ProgressService for InMemoryProgressService {
    async fn fetch_course_progress(&self, course_id: &str) -> Result<AggregateProgress> {
        self.calls.course_progress.fetch_add(1, Ordering::SeqCst);
        self.settle(course_id).await?;

        let course = self.course.read().await;
        Ok(AggregateProgress::from_statuses(
            course.records.values().map(|record| record.status),
        ))
    }

    async fn fetch_lesson_status(
        &self,
        course_id: &str,
        module_id: &str,
        lesson_id: &str,
    ) -> Result<ProgressRecord> {
        self.calls.lesson_status.fetch_add(1, Ordering::SeqCst);
        self.settle(course_id).await?;

        let key = (module_id.to_string(), lesson_id.to_string());
        if self.faults.read().await.lesson_status.contains(&key) {
            return Err(ProgressError::remote(500, "status lookup failed"));
        }

        let course = self.course.read().await;
        course
            .records
            .get(&key)
            .cloned()
            .ok_or_else(|| lesson_not_found(module_id, lesson_id))
    }

    async fn update_lesson_status(
        &self,
        course_id: &str,
        module_id: &str,
        lesson_id: &str,
        status: ProgressStatus,
    ) -> Result<ProgressRecord> {
        self.calls.updates.fetch_add(1, Ordering::SeqCst);
        self.settle(course_id).await?;

        if self.faults.read().await.updates {
            return Err(ProgressError::remote(503, "progress service unavailable"));
        }

        let mut course = self.course.write().await;
        let record = course
            .records
            .get_mut(&(module_id.to_string(), lesson_id.to_string()))
            .ok_or_else(|| lesson_not_found(module_id, lesson_id))?;
        record.status = status;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn fetch_lessons(&self, course_id: &str, module_id: &str) -> Result<Vec<Lesson>> {
        self.calls.lessons.fetch_add(1, Ordering::SeqCst);
        self.settle(course_id).await?;

        if self.faults.read().await.modules.contains(module_id) {
            return Err(ProgressError::remote(500, "lesson listing failed"));
        }

        let course = self.course.read().await;
        course
            .lessons
            .get(module_id)
            .cloned()
            .ok_or_else(|| ProgressError::remote(404, format!("Module {} not found", module_id)))
    }

    async fn fetch_modules(&self, course_id: &str) -> Result<Vec<Module>> {
        self.calls.modules.fetch_add(1, Ordering::SeqCst);
        self.settle(course_id).await?;

        Ok(self.course.read().await.modules.clone())
    }
}
