//! Progress Store Module
//!
//! Serves progress reads through the cache and performs writes optimistically.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{Cache, CacheStats};
use crate::config::Config;
use crate::error::Result;
use crate::keys::CacheKey;
use crate::models::{
    AggregateProgress, LessonWithProgress, Module, ModuleLessonsProgress, ModuleWithProgress,
    ProgressRecord,
};
use crate::optimistic::{OnFailure, Optimistic};
use crate::remote::{HttpProgressService, ProgressService, TimeoutService};
use crate::status::ProgressStatus;

// == Local State ==
/// Identifies a lesson within the store's course.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LessonRef {
    pub module_id: String,
    pub lesson_id: String,
}

impl LessonRef {
    pub fn new(module_id: impl Into<String>, lesson_id: impl Into<String>) -> Self {
        Self {
            module_id: module_id.into(),
            lesson_id: lesson_id.into(),
        }
    }
}

/// What the client currently believes, including unconfirmed writes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalProgress {
    pub statuses: HashMap<LessonRef, ProgressStatus>,
    pub aggregate: AggregateProgress,
}

impl LocalProgress {
    /// Sets a lesson status and moves the aggregate counters with it.
    ///
    /// A lesson never seen before counts as previously not started.
    pub fn apply(&mut self, lesson: &LessonRef, status: ProgressStatus) {
        let previous = self
            .statuses
            .insert(lesson.clone(), status)
            .unwrap_or_default();
        self.aggregate.apply_transition(previous, status);
    }

    /// Records a status learned from a read, leaving the aggregate alone.
    pub fn observe(&mut self, lesson: LessonRef, status: ProgressStatus) {
        self.statuses.insert(lesson, status);
    }
}

// == Progress Store ==
/// Cache-fronted access to one course's progress.
pub struct ProgressStore {
    course_id: String,
    cache: RwLock<Cache>,
    service: Arc<dyn ProgressService>,
    local: Optimistic<LocalProgress>,
}

impl ProgressStore {
    // == Constructor ==
    pub fn new(course_id: impl Into<String>, cache: Cache, service: Arc<dyn ProgressService>) -> Self {
        Self {
            course_id: course_id.into(),
            cache: RwLock::new(cache),
            service,
            local: Optimistic::new(LocalProgress::default()),
        }
    }

    /// Builds a store backed by the HTTP service, bounded by the configured timeout.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = HttpProgressService::from_config(config)?;
        let service = TimeoutService::new(http, config.request_timeout());
        let cache = Cache::new(config.cache_max_age(), config.cache_max_size);
        Ok(Self::new(config.course_id.clone(), cache, Arc::new(service)))
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    // == Read Path ==
    /// Returns the cached value for `key`, or fetches, caches and returns it.
    ///
    /// A failed fetch leaves the cache untouched.
    async fn cached<T, F, Fut>(&self, key: CacheKey<'_>, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let key = key.to_string();

        let hit = self.cache.write().await.get(&key);
        if let Some(value) = hit {
            match serde_json::from_value::<T>(value) {
                Ok(decoded) => {
                    debug!(%key, "cache hit");
                    return Ok(decoded);
                }
                Err(err) => {
                    warn!(%key, error = %err, "dropping undecodable cache entry");
                    self.cache.write().await.delete(&key);
                }
            }
        }

        debug!(%key, "cache miss");
        let fresh = fetch().await?;
        let value = serde_json::to_value(&fresh)?;
        self.cache.write().await.set(key, value);
        Ok(fresh)
    }

    /// Course-level summary. Replaces the local aggregate.
    pub async fn get_course_progress(&self) -> Result<AggregateProgress> {
        let progress = self
            .cached(
                CacheKey::CourseProgress {
                    course_id: &self.course_id,
                },
                || self.service.fetch_course_progress(&self.course_id),
            )
            .await?;

        self.local.update(|local| local.aggregate = progress).await;
        Ok(progress)
    }

    pub async fn get_lesson_status(&self, module_id: &str, lesson_id: &str) -> Result<ProgressRecord> {
        let record = self
            .cached(
                CacheKey::LessonStatus {
                    course_id: &self.course_id,
                    module_id,
                    lesson_id,
                },
                || {
                    self.service
                        .fetch_lesson_status(&self.course_id, module_id, lesson_id)
                },
            )
            .await?;

        self.local
            .update(|local| local.observe(LessonRef::new(module_id, lesson_id), record.status))
            .await;
        Ok(record)
    }

    /// Lessons of one module, each with its progress record, plus the module summary.
    ///
    /// A lesson whose status cannot be fetched is reported as not started.
    /// Failing to list the lessons themselves is an error.
    pub async fn get_module_lessons_with_progress(&self, module_id: &str) -> Result<ModuleLessonsProgress> {
        let view = self
            .cached(
                CacheKey::ModuleLessonsProgress {
                    course_id: &self.course_id,
                    module_id,
                },
                || self.load_module_lessons(module_id),
            )
            .await?;

        self.local
            .update(|local| {
                for lesson in &view.lessons {
                    local.observe(
                        LessonRef::new(module_id, lesson.lesson.id.as_str()),
                        lesson.progress.status,
                    );
                }
            })
            .await;
        Ok(view)
    }

    async fn load_module_lessons(&self, module_id: &str) -> Result<ModuleLessonsProgress> {
        let lessons = self.service.fetch_lessons(&self.course_id, module_id).await?;

        let lookups: Vec<_> = lessons
            .iter()
            .map(|lesson| self.lesson_record_or_default(module_id, &lesson.id))
            .collect();
        let records = join_all(lookups).await;

        let lessons = lessons
            .into_iter()
            .zip(records)
            .map(|(lesson, progress)| LessonWithProgress { lesson, progress })
            .collect();

        Ok(ModuleLessonsProgress::new(module_id, lessons))
    }

    async fn lesson_record_or_default(&self, module_id: &str, lesson_id: &str) -> ProgressRecord {
        match self.get_lesson_status(module_id, lesson_id).await {
            Ok(record) => record,
            Err(err) => {
                warn!(module_id, lesson_id, error = %err, "lesson status unavailable, assuming not started");
                ProgressRecord::not_started(self.course_id.as_str(), module_id, lesson_id)
            }
        }
    }

    /// Every module of the course with its lessons and summary.
    ///
    /// A module whose lessons cannot be loaded appears with a zeroed summary
    /// and no lessons. Failing to list the modules themselves is an error.
    /// Recomputes the local aggregate from the module summaries.
    pub async fn get_course_modules_with_progress(&self) -> Result<Vec<ModuleWithProgress>> {
        let modules = self
            .cached(
                CacheKey::CourseModulesProgress {
                    course_id: &self.course_id,
                },
                || self.load_course_modules(),
            )
            .await?;

        let mut aggregate = AggregateProgress::default();
        for module in &modules {
            aggregate.merge(&module.progress);
        }
        self.local.update(|local| local.aggregate = aggregate).await;

        Ok(modules)
    }

    async fn load_course_modules(&self) -> Result<Vec<ModuleWithProgress>> {
        let modules = self.service.fetch_modules(&self.course_id).await?;

        let loads: Vec<_> = modules
            .into_iter()
            .map(|module| self.module_or_unavailable(module))
            .collect();
        let views = join_all(loads).await;

        Ok(views)
    }

    async fn module_or_unavailable(&self, module: Module) -> ModuleWithProgress {
        match self.get_module_lessons_with_progress(&module.id).await {
            Ok(view) => ModuleWithProgress {
                module,
                lessons: view.lessons,
                progress: view.summary,
            },
            Err(err) => {
                warn!(module_id = %module.id, error = %err, "module progress unavailable");
                ModuleWithProgress::unavailable(module)
            }
        }
    }

    // == Write Path ==
    /// Sets a lesson status optimistically.
    ///
    /// Local state changes before the remote call. On success every cached
    /// value derived from the lesson is invalidated; on failure local state
    /// is restored and the cache is left as it was.
    pub async fn update_lesson_status(
        &self,
        module_id: &str,
        lesson_id: &str,
        status: ProgressStatus,
    ) -> Result<ProgressRecord> {
        let lesson = LessonRef::new(module_id, lesson_id);

        let outcome = self
            .local
            .run(
                |local| local.apply(&lesson, status),
                || {
                    self.service
                        .update_lesson_status(&self.course_id, module_id, lesson_id, status)
                },
                OnFailure::Rollback,
            )
            .await;

        match outcome {
            Ok(record) => {
                // Reads served while the call was in flight may have overwritten the applied status
                self.local
                    .update(|local| local.apply(&lesson, record.status))
                    .await;
                self.invalidate_lesson(module_id, lesson_id).await;
                info!(module_id, lesson_id, %status, "lesson status updated");
                Ok(record)
            }
            Err(err) => {
                warn!(module_id, lesson_id, %status, error = %err, "lesson status update failed, rolled back");
                Err(err)
            }
        }
    }

    /// Completed lessons become not started; anything else becomes completed.
    pub async fn toggle_lesson_completion(&self, module_id: &str, lesson_id: &str) -> Result<ProgressRecord> {
        let current = self.get_lesson_status(module_id, lesson_id).await?.status;
        self.update_lesson_status(module_id, lesson_id, current.toggled())
            .await
    }

    pub async fn mark_lesson_completed(&self, module_id: &str, lesson_id: &str) -> Result<ProgressRecord> {
        self.update_lesson_status(module_id, lesson_id, ProgressStatus::Completed)
            .await
    }

    pub async fn mark_lesson_in_progress(&self, module_id: &str, lesson_id: &str) -> Result<ProgressRecord> {
        self.update_lesson_status(module_id, lesson_id, ProgressStatus::InProgress)
            .await
    }

    pub async fn reset_lesson_progress(&self, module_id: &str, lesson_id: &str) -> Result<ProgressRecord> {
        self.update_lesson_status(module_id, lesson_id, ProgressStatus::NotStarted)
            .await
    }

    // == Invalidation ==
    async fn invalidate_lesson(&self, module_id: &str, lesson_id: &str) {
        let mut cache = self.cache.write().await;
        for key in CacheKey::affected_by_lesson(&self.course_id, module_id, lesson_id) {
            let key = key.to_string();
            if cache.delete(&key) {
                debug!(%key, "invalidated");
            }
        }
    }

    /// Drops every cached entry. Returns how many were dropped.
    pub async fn invalidate_all(&self) -> usize {
        let mut cache = self.cache.write().await;
        let cleared = cache.len();
        cache.clear();
        cleared
    }

    /// Drops expired entries. Returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        self.cache.write().await.purge_expired()
    }

    /// Whether a fresh-or-stale entry exists for `key`, without touching stats.
    pub async fn is_cached(&self, key: CacheKey<'_>) -> bool {
        self.cache.read().await.contains(&key.to_string())
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    // == Local State ==
    pub async fn local_status(&self, module_id: &str, lesson_id: &str) -> Option<ProgressStatus> {
        let lesson = LessonRef::new(module_id, lesson_id);
        self.local
            .read(|local| local.statuses.get(&lesson).copied())
            .await
    }

    pub async fn local_aggregate(&self) -> AggregateProgress {
        self.local.read(|local| local.aggregate).await
    }

    pub async fn local_snapshot(&self) -> LocalProgress {
        self.local.snapshot().await
    }
}
