//! Request DTOs for the progress gateway and the remote service.

use serde::{Deserialize, Serialize};

use crate::status::ProgressStatus;

/// Body of a lesson status update sent to the progress service (`PATCH .../status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ProgressStatus,
}

impl UpdateStatusRequest {
    pub fn new(status: ProgressStatus) -> Self {
        Self { status }
    }
}

/// Body of a lesson status change received by the gateway.
///
/// Accepts either status vocabulary; `done` reads as `completed`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusChangeRequest {
    pub status: String,
}

impl StatusChangeRequest {
    /// Validates the request data
    ///
    /// Returns the parsed status, or an error message for unknown values.
    pub fn validate(&self) -> Result<ProgressStatus, String> {
        if self.status.trim().is_empty() {
            return Err("Status cannot be empty".to_string());
        }
        ProgressStatus::parse_known(&self.status).ok_or_else(|| {
            format!(
                "Unknown status '{}', expected not_started, in_progress, completed or done",
                self.status
            )
        })
    }
}
