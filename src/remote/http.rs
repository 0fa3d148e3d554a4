//! HTTP Progress Service
//!
//! REST client for the progress service, built on reqwest.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::{ProgressError, Result};
use crate::models::{AggregateProgress, Lesson, Module, ProgressRecord, UpdateStatusRequest};
use crate::remote::ProgressService;
use crate::status::ProgressStatus;

const MAX_ERROR_BODY: usize = 200;

/// Progress service reached over HTTP with JSON bodies.
///
/// No request timeout is set here; wrap in `TimeoutService` for that.
#[derive(Debug, Clone)]
pub struct HttpProgressService {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpProgressService {
    /// Creates a client rooted at a versioned base URL such as `http://host/api/v1`.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ProgressError::InvalidRequest(format!("invalid base URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ProgressError::InvalidRequest(format!(
                "base URL cannot hold paths: {}",
                base_url
            )));
        }

        Ok(Self {
            client: Client::new(),
            base_url,
            token: None,
        })
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let service = Self::new(&config.api_base_url)?;
        Ok(match &config.api_token {
            Some(token) => service.with_token(token.clone()),
            None => service,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn status_url(&self, course_id: &str, module_id: &str, lesson_id: &str) -> Url {
        self.endpoint(&[
            "courses", course_id, "modules", module_id, "lessons", lesson_id, "status",
        ])
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| ProgressError::transport(e.to_string()))?;

        let status = response.status();
        debug!(%status, url = %response.url(), "progress service responded");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProgressError::remote(
                status.as_u16(),
                error_message(status, &body),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProgressError::transport(e.to_string()))?;
        decode(&bytes)
    }
}

/// Decodes a body that is either the payload itself or `{"data": payload}`.
///
/// An object whose only key is `data` is always treated as an envelope, so
/// payload types with defaulted fields cannot swallow it.
fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| ProgressError::InvalidResponse(e.to_string()))?;

    let payload = match value {
        Value::Object(mut map) if map.len() == 1 && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };

    serde_json::from_value(payload).map_err(|e| ProgressError::InvalidResponse(e.to_string()))
}

/// Human-readable message for a failed response.
///
/// Prefers a `detail`, `message` or `error` string in a JSON body, then the
/// raw body, then the status reason phrase.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for field in ["detail", "message", "error"] {
            if let Some(Value::String(message)) = map.get(field) {
                return message.clone();
            }
        }
    }

    let body = body.trim();
    if !body.is_empty() && !body.starts_with('{') {
        return body.chars().take(MAX_ERROR_BODY).collect();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

#[async_trait]
impl ProgressService for HttpProgressService {
    async fn fetch_course_progress(&self, course_id: &str) -> Result<AggregateProgress> {
        let url = self.endpoint(&["courses", course_id, "progress"]);
        self.send(self.client.get(url)).await
    }

    async fn fetch_lesson_status(
        &self,
        course_id: &str,
        module_id: &str,
        lesson_id: &str,
    ) -> Result<ProgressRecord> {
        let url = self.status_url(course_id, module_id, lesson_id);
        self.send(self.client.get(url)).await
    }

    async fn update_lesson_status(
        &self,
        course_id: &str,
        module_id: &str,
        lesson_id: &str,
        status: ProgressStatus,
    ) -> Result<ProgressRecord> {
        let url = self.status_url(course_id, module_id, lesson_id);
        let body = UpdateStatusRequest::new(status);
        self.send(self.client.patch(url).json(&body)).await
    }

    async fn fetch_lessons(&self, course_id: &str, module_id: &str) -> Result<Vec<Lesson>> {
        let url = self.endpoint(&["courses", course_id, "modules", module_id, "lessons"]);
        self.send(self.client.get(url)).await
    }

    async fn fetch_modules(&self, course_id: &str) -> Result<Vec<Module>> {
        let url = self.endpoint(&["courses", course_id, "modules"]);
        self.send(self.client.get(url)).await
    }
}
