//! API Handlers
//!
//! HTTP request handlers for each gateway endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{ProgressError, Result};
use crate::models::{
    AggregateProgress, ClearResponse, HealthResponse, LocalLessonStatus, LocalProgressResponse,
    ModuleLessonsProgress, ModuleWithProgress, ProgressRecord, StatsResponse, StatusChangeRequest,
};
use crate::store::ProgressStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ProgressStore>,
}

impl AppState {
    pub fn new(store: ProgressStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        Ok(Self::new(ProgressStore::from_config(config)?))
    }
}

/// Handler for GET /progress
pub async fn course_progress_handler(
    State(state): State<AppState>,
) -> Result<Json<AggregateProgress>> {
    Ok(Json(state.store.get_course_progress().await?))
}

/// Handler for GET /modules
pub async fn course_modules_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<ModuleWithProgress>>> {
    Ok(Json(state.store.get_course_modules_with_progress().await?))
}

/// Handler for GET /modules/:module_id/lessons
pub async fn module_lessons_handler(
    State(state): State<AppState>,
    Path(module_id): Path<String>,
) -> Result<Json<ModuleLessonsProgress>> {
    Ok(Json(
        state
            .store
            .get_module_lessons_with_progress(&module_id)
            .await?,
    ))
}

/// Handler for GET /modules/:module_id/lessons/:lesson_id/status
pub async fn lesson_status_handler(
    State(state): State<AppState>,
    Path((module_id, lesson_id)): Path<(String, String)>,
) -> Result<Json<ProgressRecord>> {
    Ok(Json(
        state
            .store
            .get_lesson_status(&module_id, &lesson_id)
            .await?,
    ))
}

/// Handler for PATCH /modules/:module_id/lessons/:lesson_id/status
pub async fn update_status_handler(
    State(state): State<AppState>,
    Path((module_id, lesson_id)): Path<(String, String)>,
    Json(req): Json<StatusChangeRequest>,
) -> Result<Json<ProgressRecord>> {
    let status = req.validate().map_err(ProgressError::InvalidRequest)?;

    Ok(Json(
        state
            .store
            .update_lesson_status(&module_id, &lesson_id, status)
            .await?,
    ))
}

/// Handler for POST /modules/:module_id/lessons/:lesson_id/toggle
pub async fn toggle_handler(
    State(state): State<AppState>,
    Path((module_id, lesson_id)): Path<(String, String)>,
) -> Result<Json<ProgressRecord>> {
    Ok(Json(
        state
            .store
            .toggle_lesson_completion(&module_id, &lesson_id)
            .await?,
    ))
}

/// Handler for POST /modules/:module_id/lessons/:lesson_id/complete
pub async fn complete_handler(
    State(state): State<AppState>,
    Path((module_id, lesson_id)): Path<(String, String)>,
) -> Result<Json<ProgressRecord>> {
    Ok(Json(
        state
            .store
            .mark_lesson_completed(&module_id, &lesson_id)
            .await?,
    ))
}

/// Handler for POST /modules/:module_id/lessons/:lesson_id/start
pub async fn start_handler(
    State(state): State<AppState>,
    Path((module_id, lesson_id)): Path<(String, String)>,
) -> Result<Json<ProgressRecord>> {
    Ok(Json(
        state
            .store
            .mark_lesson_in_progress(&module_id, &lesson_id)
            .await?,
    ))
}

/// Handler for POST /modules/:module_id/lessons/:lesson_id/reset
pub async fn reset_handler(
    State(state): State<AppState>,
    Path((module_id, lesson_id)): Path<(String, String)>,
) -> Result<Json<ProgressRecord>> {
    Ok(Json(
        state
            .store
            .reset_lesson_progress(&module_id, &lesson_id)
            .await?,
    ))
}

/// Handler for GET /local
///
/// Returns what the store currently believes, including unconfirmed writes.
pub async fn local_progress_handler(State(state): State<AppState>) -> Json<LocalProgressResponse> {
    let local = state.store.local_snapshot().await;

    let mut lessons: Vec<_> = local.statuses.into_iter().collect();
    lessons.sort_by(|(a, _), (b, _)| a.cmp(b));

    Json(LocalProgressResponse {
        course_id: state.store.course_id().to_string(),
        aggregate: local.aggregate,
        lessons: lessons
            .into_iter()
            .map(|(lesson, status)| LocalLessonStatus {
                module_id: lesson.module_id,
                lesson_id: lesson.lesson_id,
                status,
            })
            .collect(),
    })
}

/// Handler for DELETE /cache
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    Json(ClearResponse::new(state.store.invalidate_all().await))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.store.cache_stats().await))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Cache;
    use crate::remote::InMemoryProgressService;
    use crate::status::ProgressStatus;
    use std::time::Duration;

    async fn test_state() -> (AppState, Arc<InMemoryProgressService>) {
        let service = Arc::new(InMemoryProgressService::new("c1"));
        service.add_module("m1", &["l1", "l2"]).await;
        let store = ProgressStore::new("c1", Cache::new(Duration::from_secs(60), 50), service.clone());
        (AppState::new(store), service)
    }

    fn lesson_path(module_id: &str, lesson_id: &str) -> Path<(String, String)> {
        Path((module_id.to_string(), lesson_id.to_string()))
    }

    #[tokio::test]
    async fn test_update_status_handler() {
        let (state, service) = test_state().await;

        let req = StatusChangeRequest {
            status: "done".to_string(),
        };
        let response = update_status_handler(State(state), lesson_path("m1", "l1"), Json(req))
            .await
            .unwrap();

        assert_eq!(response.status, ProgressStatus::Completed);
        assert_eq!(service.status_of("m1", "l1").await, Some(ProgressStatus::Completed));
    }

    #[tokio::test]
    async fn test_update_status_handler_rejects_unknown_status() {
        let (state, service) = test_state().await;

        let req = StatusChangeRequest {
            status: "finished".to_string(),
        };
        let result = update_status_handler(State(state), lesson_path("m1", "l1"), Json(req)).await;

        assert!(matches!(result, Err(ProgressError::InvalidRequest(_))));
        assert_eq!(service.calls.updates.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_toggle_and_local_handlers() {
        let (state, _) = test_state().await;

        toggle_handler(State(state.clone()), lesson_path("m1", "l2"))
            .await
            .unwrap();
        let local = local_progress_handler(State(state)).await;

        assert_eq!(local.course_id, "c1");
        assert_eq!(local.lessons.len(), 1);
        assert_eq!(local.lessons[0].lesson_id, "l2");
        assert_eq!(local.lessons[0].status, ProgressStatus::Completed);
    }

    #[tokio::test]
    async fn test_module_lessons_handler() {
        let (state, _) = test_state().await;

        complete_handler(State(state.clone()), lesson_path("m1", "l1"))
            .await
            .unwrap();
        let view = module_lessons_handler(State(state), Path("m1".to_string()))
            .await
            .unwrap();

        assert_eq!(view.summary.progress_percentage, 50);
    }

    #[tokio::test]
    async fn test_lesson_status_handler_not_found() {
        let (state, _) = test_state().await;

        let result = lesson_status_handler(State(state), lesson_path("m1", "nope")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_stats_and_clear_handlers() {
        let (state, _) = test_state().await;

        course_modules_handler(State(state.clone())).await.unwrap();
        let stats = stats_handler(State(state.clone())).await;
        assert!(stats.total_entries > 0);

        let cleared = clear_cache_handler(State(state.clone())).await;
        assert_eq!(cleared.cleared, stats.total_entries);

        let stats = stats_handler(State(state)).await;
        assert_eq!(stats.total_entries, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
