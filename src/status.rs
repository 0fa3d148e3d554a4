//! Status Module
//!
//! Closed status vocabularies and the pure mapping between them.
//!
//! The progress service speaks `not_started` / `in_progress` / `completed`.
//! Older clients and records use `done` in place of `completed`. Both
//! parse totally: anything unrecognised reads as not started.

use std::fmt;

use serde::{Deserialize, Serialize};

// == Progress Status ==
/// Lesson progress status in the current vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum ProgressStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressStatus {
    /// Parses either vocabulary. Unknown values map to `NotStarted`.
    pub fn parse(raw: &str) -> Self {
        Self::parse_known(raw).unwrap_or_default()
    }

    /// Parses either vocabulary, rejecting unknown values.
    pub fn parse_known(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "completed" | "done" => Some(ProgressStatus::Completed),
            "in_progress" => Some(ProgressStatus::InProgress),
            "not_started" => Some(ProgressStatus::NotStarted),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "not_started",
            ProgressStatus::InProgress => "in_progress",
            ProgressStatus::Completed => "completed",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ProgressStatus::Completed)
    }

    /// Target of a completion toggle: anything other than completed becomes completed.
    pub fn toggled(&self) -> Self {
        if self.is_completed() {
            ProgressStatus::NotStarted
        } else {
            ProgressStatus::Completed
        }
    }

    pub fn to_legacy(self) -> LegacyStatus {
        self.into()
    }
}

impl From<String> for ProgressStatus {
    fn from(raw: String) -> Self {
        ProgressStatus::parse(&raw)
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Legacy Status ==
/// Lesson progress status in the legacy vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum LegacyStatus {
    #[default]
    NotStarted,
    InProgress,
    Done,
}

impl LegacyStatus {
    /// Parses either vocabulary. Unknown values map to `NotStarted`.
    pub fn parse(raw: &str) -> Self {
        ProgressStatus::parse(raw).into()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LegacyStatus::NotStarted => "not_started",
            LegacyStatus::InProgress => "in_progress",
            LegacyStatus::Done => "done",
        }
    }
}

impl From<String> for LegacyStatus {
    fn from(raw: String) -> Self {
        LegacyStatus::parse(&raw)
    }
}

impl fmt::Display for LegacyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Conversions ==
impl From<ProgressStatus> for LegacyStatus {
    fn from(status: ProgressStatus) -> Self {
        match status {
            ProgressStatus::NotStarted => LegacyStatus::NotStarted,
            ProgressStatus::InProgress => LegacyStatus::InProgress,
            ProgressStatus::Completed => LegacyStatus::Done,
        }
    }
}

impl From<LegacyStatus> for ProgressStatus {
    fn from(status: LegacyStatus) -> Self {
        match status {
            LegacyStatus::NotStarted => ProgressStatus::NotStarted,
            LegacyStatus::InProgress => ProgressStatus::InProgress,
            LegacyStatus::Done => ProgressStatus::Completed,
        }
    }
}
