//! Data models for progress records, course structure and gateway DTOs.

pub mod course;
pub mod progress;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use course::{Lesson, LessonWithProgress, Module, ModuleLessonsProgress, ModuleWithProgress};
pub use progress::{percentage, AggregateProgress, ProgressRecord};
pub use requests::{StatusChangeRequest, UpdateStatusRequest};
pub use responses::{
    ClearResponse, HealthResponse, LocalLessonStatus, LocalProgressResponse, StatsResponse,
};
