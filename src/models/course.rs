//! Course Models
//!
//! Course structure metadata and progress-annotated views of it.

use serde::{Deserialize, Serialize};

use crate::models::{AggregateProgress, ProgressRecord};

/// Lesson metadata, no progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

/// Module metadata, no progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

/// A lesson annotated with the learner's progress record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonWithProgress {
    #[serde(flatten)]
    pub lesson: Lesson,
    pub progress: ProgressRecord,
}

/// All lessons of one module with progress, plus the module summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleLessonsProgress {
    pub module_id: String,
    pub lessons: Vec<LessonWithProgress>,
    #[serde(flatten)]
    pub summary: AggregateProgress,
}

impl ModuleLessonsProgress {
    pub fn new(module_id: impl Into<String>, lessons: Vec<LessonWithProgress>) -> Self {
        let summary = AggregateProgress::from_statuses(lessons.iter().map(|l| l.progress.status));
        Self {
            module_id: module_id.into(),
            lessons,
            summary,
        }
    }
}

/// A module with its lessons and summary, as listed for a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleWithProgress {
    #[serde(flatten)]
    pub module: Module,
    pub lessons: Vec<LessonWithProgress>,
    pub progress: AggregateProgress,
}

impl ModuleWithProgress {
    /// A module whose lessons could not be loaded: zeroed summary, no lessons.
    pub fn unavailable(module: Module) -> Self {
        Self {
            module,
            lessons: Vec::new(),
            progress: AggregateProgress::default(),
        }
    }
}
