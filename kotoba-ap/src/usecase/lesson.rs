//! Lesson and activity use cases

use crate::{Error, Result};
use futures::stream::BoxStream;
use kotoba_common::models::{Activity, Lesson};
use kotoba_common::repository::{CourseRepository, LessonRepository};
use tracing::info;

pub struct GetLessonsByCourse {
    repository: LessonRepository,
}

impl GetLessonsByCourse {
    pub fn new(repository: LessonRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, course_id: &str) -> Result<Vec<Lesson>> {
        Ok(self.repository.get_lessons_by_course(course_id).await?)
    }

    pub fn observe(&self, course_id: &str) -> BoxStream<'static, kotoba_common::Result<Vec<Lesson>>> {
        self.repository.observe_lessons_by_course(course_id)
    }
}

pub struct GetLessonById {
    repository: LessonRepository,
}

impl GetLessonById {
    pub fn new(repository: LessonRepository) -> Self {
        Self { repository }
    }

    /// The lesson with its activities loaded
    pub async fn execute(&self, lesson_id: &str) -> Result<Option<Lesson>> {
        Ok(self.repository.get_lesson_with_activities(lesson_id).await?)
    }

    pub fn observe(&self, lesson_id: &str) -> BoxStream<'static, kotoba_common::Result<Option<Lesson>>> {
        self.repository.observe_lesson_by_id(lesson_id)
    }
}

pub struct GetActivitiesByLesson {
    repository: LessonRepository,
}

impl GetActivitiesByLesson {
    pub fn new(repository: LessonRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, lesson_id: &str) -> Result<Vec<Activity>> {
        Ok(self.repository.get_activities_by_lesson(lesson_id).await?)
    }

    pub fn observe(&self, lesson_id: &str) -> BoxStream<'static, kotoba_common::Result<Vec<Activity>>> {
        self.repository.observe_activities_by_lesson(lesson_id)
    }
}

/// Mark one activity completed
pub struct CompleteActivity {
    repository: LessonRepository,
}

impl CompleteActivity {
    pub fn new(repository: LessonRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, activity_id: &str) -> Result<Activity> {
        let mut activity = self
            .repository
            .get_activity_by_id(activity_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("activity {}", activity_id)))?;

        activity.is_completed = true;
        self.repository.update_activity(&activity).await?;
        Ok(activity)
    }
}

/// Mark a whole lesson completed
pub struct CompleteLesson {
    repository: LessonRepository,
}

impl CompleteLesson {
    pub fn new(repository: LessonRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, lesson_id: &str) -> Result<Lesson> {
        let mut lesson = self
            .repository
            .get_lesson_by_id(lesson_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("lesson {}", lesson_id)))?;

        lesson.is_completed = true;
        lesson.progress = 1.0;
        self.repository.update_lesson_progress(lesson_id, true, 1.0).await?;
        Ok(lesson)
    }
}

/// Result of recording an activity completion
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOutcome {
    pub activity: Activity,
    pub course_id: String,
    /// Completed fraction of the lesson's activities
    pub lesson_progress: f32,
    pub lesson_completed: bool,
    /// Completed lessons in the course after this completion
    pub course_completed_lessons: u32,
}

/// Complete an activity and roll the result up to its lesson and course
///
/// The lesson's progress becomes completed/total activities, and the lesson
/// is completed once every activity is. The course's completed lesson count
/// is recounted afterwards.
pub struct RecordActivityCompletion {
    complete_activity: CompleteActivity,
    lessons: LessonRepository,
    courses: CourseRepository,
}

impl RecordActivityCompletion {
    pub fn new(lessons: LessonRepository, courses: CourseRepository) -> Self {
        Self {
            complete_activity: CompleteActivity::new(lessons.clone()),
            lessons,
            courses,
        }
    }

    pub async fn execute(&self, activity_id: &str) -> Result<CompletionOutcome> {
        let activity = self.complete_activity.execute(activity_id).await?;

        let lesson = self
            .lessons
            .get_lesson_by_id(&activity.lesson_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("lesson {}", activity.lesson_id)))?;

        let (completed, total) = self.lessons.activity_completion(&lesson.id).await?;
        // Never un-complete a lesson that was completed directly
        let lesson_completed = lesson.is_completed || completed >= total;
        let lesson_progress = if lesson_completed || total == 0 {
            1.0
        } else {
            completed as f32 / total as f32
        };

        self.lessons
            .update_lesson_progress(&lesson.id, lesson_completed, lesson_progress)
            .await?;
        let course_completed_lessons = self.courses.refresh_completed_lessons(&lesson.course_id).await?;

        info!(
            "Activity {} completed: lesson {} at {:.0}%, course {} has {} completed lessons",
            activity.id,
            lesson.id,
            lesson_progress * 100.0,
            lesson.course_id,
            course_completed_lessons
        );

        Ok(CompletionOutcome {
            activity,
            course_id: lesson.course_id,
            lesson_progress,
            lesson_completed,
            course_completed_lessons,
        })
    }
}
