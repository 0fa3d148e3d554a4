//! Progress Models
//!
//! Per-lesson progress records and the aggregates derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::ProgressStatus;

// == Progress Record ==
/// Completion state of one lesson for the current learner.
///
/// The progress service owns the authoritative value; the store only holds copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    #[serde(alias = "lessonId")]
    pub lesson_id: String,
    #[serde(alias = "moduleId")]
    pub module_id: String,
    #[serde(default, alias = "courseId")]
    pub course_id: String,
    #[serde(default)]
    pub status: ProgressStatus,
    #[serde(alias = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    /// A `not_started` record stamped with the current time.
    ///
    /// Stands in for lessons whose status could not be fetched.
    pub fn not_started(
        course_id: impl Into<String>,
        module_id: impl Into<String>,
        lesson_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            lesson_id: lesson_id.into(),
            module_id: module_id.into(),
            course_id: course_id.into(),
            status: ProgressStatus::NotStarted,
            created_at: now,
            updated_at: now,
        }
    }
}

// == Aggregate Progress ==
/// Completion summary over a set of lessons (a module or a whole course).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AggregateProgress {
    #[serde(default, alias = "totalLessons")]
    pub total_lessons: u32,
    #[serde(default, alias = "completedLessons")]
    pub completed_lessons: u32,
    #[serde(default, alias = "inProgressLessons")]
    pub in_progress_lessons: u32,
    #[serde(default, alias = "progressPercentage")]
    pub progress_percentage: u32,
}

impl AggregateProgress {
    /// Builds the summary from individual lesson statuses.
    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = ProgressStatus>,
    {
        let mut aggregate = Self::default();
        for status in statuses {
            aggregate.total_lessons += 1;
            match status {
                ProgressStatus::Completed => aggregate.completed_lessons += 1,
                ProgressStatus::InProgress => aggregate.in_progress_lessons += 1,
                ProgressStatus::NotStarted => {}
            }
        }
        aggregate.recompute_percentage();
        aggregate
    }

    /// Adds another summary's counters to this one.
    pub fn merge(&mut self, other: &AggregateProgress) {
        self.total_lessons += other.total_lessons;
        self.completed_lessons += other.completed_lessons;
        self.in_progress_lessons += other.in_progress_lessons;
        self.recompute_percentage();
    }

    /// Adjusts counters for one lesson moving between statuses.
    ///
    /// Counters never drop below zero.
    pub fn apply_transition(&mut self, from: ProgressStatus, to: ProgressStatus) {
        if from == to {
            return;
        }
        match from {
            ProgressStatus::Completed => {
                self.completed_lessons = self.completed_lessons.saturating_sub(1)
            }
            ProgressStatus::InProgress => {
                self.in_progress_lessons = self.in_progress_lessons.saturating_sub(1)
            }
            ProgressStatus::NotStarted => {}
        }
        match to {
            ProgressStatus::Completed => self.completed_lessons += 1,
            ProgressStatus::InProgress => self.in_progress_lessons += 1,
            ProgressStatus::NotStarted => {}
        }
        self.recompute_percentage();
    }

    pub fn recompute_percentage(&mut self) {
        self.progress_percentage = percentage(self.completed_lessons, self.total_lessons);
    }
}

/// `round(completed / total * 100)`, zero for an empty total, capped at 100.
pub fn percentage(completed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let pct = (f64::from(completed) / f64::from(total) * 100.0).round() as u32;
    pct.min(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(5, 4), 100);
    }

    #[test]
    fn test_from_statuses() {
        let aggregate = AggregateProgress::from_statuses([
            ProgressStatus::Completed,
            ProgressStatus::InProgress,
            ProgressStatus::NotStarted,
            ProgressStatus::Completed,
        ]);

        assert_eq!(aggregate.total_lessons, 4);
        assert_eq!(aggregate.completed_lessons, 2);
        assert_eq!(aggregate.in_progress_lessons, 1);
        assert_eq!(aggregate.progress_percentage, 50);
    }

    #[test]
    fn test_apply_transition_clamps_at_zero() {
        let mut aggregate = AggregateProgress {
            total_lessons: 4,
            ..Default::default()
        };

        aggregate.apply_transition(ProgressStatus::Completed, ProgressStatus::NotStarted);
        assert_eq!(aggregate.completed_lessons, 0);

        aggregate.apply_transition(ProgressStatus::NotStarted, ProgressStatus::Completed);
        assert_eq!(aggregate.completed_lessons, 1);
        assert_eq!(aggregate.progress_percentage, 25);

        aggregate.apply_transition(ProgressStatus::Completed, ProgressStatus::Completed);
        assert_eq!(aggregate.completed_lessons, 1);
    }

    #[test]
    fn test_apply_transition_moves_in_progress() {
        let mut aggregate = AggregateProgress::from_statuses([
            ProgressStatus::InProgress,
            ProgressStatus::NotStarted,
        ]);

        aggregate.apply_transition(ProgressStatus::InProgress, ProgressStatus::Completed);

        assert_eq!(aggregate.in_progress_lessons, 0);
        assert_eq!(aggregate.completed_lessons, 1);
        assert_eq!(aggregate.progress_percentage, 50);
    }

    #[test]
    fn test_deserialize_camel_case_aggregate() {
        let json = r#"{"totalLessons": 10, "completedLessons": 3, "inProgressLessons": 2, "progressPercentage": 30}"#;
        let aggregate: AggregateProgress = serde_json::from_str(json).unwrap();
        assert_eq!(aggregate.total_lessons, 10);
        assert_eq!(aggregate.progress_percentage, 30);
    }

    #[test]
    fn test_deserialize_record_with_legacy_status() {
        let json = r#"{
            "lesson_id": "l1",
            "module_id": "m1",
            "course_id": "c1",
            "status": "done",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z"
        }"#;
        let record: ProgressRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.status, ProgressStatus::Completed);
        assert_eq!(record.lesson_id, "l1");
    }

    #[test]
    fn test_not_started_record() {
        let record = ProgressRecord::not_started("c1", "m1", "l1");
        assert_eq!(record.status, ProgressStatus::NotStarted);
        assert_eq!(record.course_id, "c1");
        assert_eq!(record.module_id, "m1");
        assert_eq!(record.created_at, record.updated_at);
    }
}
