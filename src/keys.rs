//! Cache Keys Module
//!
//! Derives one cache key per cacheable query. Each key starts with its kind,
//! so keys of different kinds never collide even when identifiers coincide.

use std::fmt;

// == Cache Key ==
/// A cacheable query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey<'a> {
    CourseProgress {
        course_id: &'a str,
    },
    LessonStatus {
        course_id: &'a str,
        module_id: &'a str,
        lesson_id: &'a str,
    },
    ModuleLessonsProgress {
        course_id: &'a str,
        module_id: &'a str,
    },
    CourseModulesProgress {
        course_id: &'a str,
    },
}

impl<'a> CacheKey<'a> {
    // == Invalidation Set ==
    /// Every key whose cached value depends on the given lesson's status.
    pub fn affected_by_lesson(
        course_id: &'a str,
        module_id: &'a str,
        lesson_id: &'a str,
    ) -> [CacheKey<'a>; 4] {
        [
            CacheKey::LessonStatus {
                course_id,
                module_id,
                lesson_id,
            },
            CacheKey::ModuleLessonsProgress {
                course_id,
                module_id,
            },
            CacheKey::CourseProgress { course_id },
            CacheKey::CourseModulesProgress { course_id },
        ]
    }
}

// == Formatting ==
/// An identifier written into a key with `%` and `:` percent-encoded, so
/// the `:` separators stay unambiguous.
struct Segment<'a>(&'a str);

impl fmt::Display for Segment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in self.0.chars() {
            match ch {
                '%' => f.write_str("%25")?,
                ':' => f.write_str("%3A")?,
                other => fmt::Write::write_char(f, other)?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for CacheKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            CacheKey::CourseProgress { course_id } => {
                write!(f, "course-progress:{}", Segment(course_id))
            }
            CacheKey::LessonStatus {
                course_id,
                module_id,
                lesson_id,
            } => write!(
                f,
                "lesson-status:{}:{}:{}",
                Segment(course_id),
                Segment(module_id),
                Segment(lesson_id)
            ),
            CacheKey::ModuleLessonsProgress {
                course_id,
                module_id,
            } => write!(
                f,
                "module-lessons-progress:{}:{}",
                Segment(course_id),
                Segment(module_id)
            ),
            CacheKey::CourseModulesProgress { course_id } => {
                write!(f, "course-modules-progress:{}", Segment(course_id))
            }
        }
    }
}
