//! API Routes
//!
//! Configures the Axum router with all gateway endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_cache_handler, complete_handler, course_modules_handler, course_progress_handler,
    health_handler, lesson_status_handler, local_progress_handler, module_lessons_handler,
    reset_handler, start_handler, stats_handler, toggle_handler, update_status_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /progress` - Course progress summary
/// - `GET /modules` - Modules with lessons and progress
/// - `GET /modules/:module_id/lessons` - One module's lessons with progress
/// - `GET|PATCH /modules/:module_id/lessons/:lesson_id/status` - Read or set a lesson status
/// - `POST /modules/:module_id/lessons/:lesson_id/{toggle,complete,start,reset}` - Status shortcuts
/// - `GET /local` - Local (optimistic) progress state
/// - `GET /stats` - Cache statistics
/// - `DELETE /cache` - Drop every cached entry
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin so a browser UI on another port can call in
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/progress", get(course_progress_handler))
        .route("/modules", get(course_modules_handler))
        .route("/modules/:module_id/lessons", get(module_lessons_handler))
        .route(
            "/modules/:module_id/lessons/:lesson_id/status",
            get(lesson_status_handler).patch(update_status_handler),
        )
        .route(
            "/modules/:module_id/lessons/:lesson_id/toggle",
            post(toggle_handler),
        )
        .route(
            "/modules/:module_id/lessons/:lesson_id/complete",
            post(complete_handler),
        )
        .route(
            "/modules/:module_id/lessons/:lesson_id/start",
            post(start_handler),
        )
        .route(
            "/modules/:module_id/lessons/:lesson_id/reset",
            post(reset_handler),
        )
        .route("/local", get(local_progress_handler))
        .route("/stats", get(stats_handler))
        .route("/cache", delete(clear_cache_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Cache;
    use crate::remote::InMemoryProgressService;
    use crate::store::ProgressStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tower::util::ServiceExt;

    async fn create_test_app() -> Router {
        let service = Arc::new(InMemoryProgressService::new("c1"));
        service.add_module("m1", &["l1"]).await;
        let store = ProgressStore::new("c1", Cache::new(Duration::from_secs(60), 50), service);
        create_router(AppState::new(store))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_lesson_toggle_route() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/modules/m1/lessons/l1/toggle")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_lesson_is_not_found() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/modules/m1/lessons/zz/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
