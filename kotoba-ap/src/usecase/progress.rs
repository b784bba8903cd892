//! Progress use cases

use crate::Result;
use chrono::Utc;
use futures::stream::BoxStream;
use kotoba_common::models::{ProgressStatus, UserProgress, UserStats};
use kotoba_common::repository::ProgressRepository;

pub struct GetUserStats {
    repository: ProgressRepository,
}

impl GetUserStats {
    pub fn new(repository: ProgressRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> Result<UserStats> {
        Ok(self.repository.get_user_stats().await?)
    }

    pub fn observe(&self) -> BoxStream<'static, kotoba_common::Result<UserStats>> {
        self.repository.observe_user_stats()
    }
}

pub struct GetCourseProgress {
    repository: ProgressRepository,
}

impl GetCourseProgress {
    pub fn new(repository: ProgressRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, course_id: &str) -> Result<Vec<UserProgress>> {
        Ok(self.repository.get_progress_by_course(course_id).await?)
    }

    pub fn observe(&self, course_id: &str) -> BoxStream<'static, kotoba_common::Result<Vec<UserProgress>>> {
        self.repository.observe_progress_by_course(course_id)
    }
}

/// Record progress for a lesson, or for one activity of it
///
/// The row id is derived from the course/lesson/activity triple, so saving
/// again overwrites the previous result. Accumulated study time is kept.
pub struct SaveLessonProgress {
    repository: ProgressRepository,
}

impl SaveLessonProgress {
    pub fn new(repository: ProgressRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(
        &self,
        course_id: &str,
        lesson_id: &str,
        activity_id: Option<&str>,
        score: u32,
        status: ProgressStatus,
    ) -> Result<UserProgress> {
        let mut entry = UserProgress::new(course_id, lesson_id, activity_id);
        if let Some(existing) = self.repository.get_progress_by_id(&entry.id).await? {
            entry.time_spent_seconds = existing.time_spent_seconds;
            entry.max_score = existing.max_score;
        }

        entry.status = status;
        entry.score = score;
        entry.completed_at = match status {
            ProgressStatus::Completed => Some(Utc::now()),
            _ => None,
        };

        self.repository.save_progress(&entry).await?;
        Ok(entry)
    }
}

/// Add study time to a progress row and touch its last access time
pub struct UpdateStudyTime {
    repository: ProgressRepository,
}

impl UpdateStudyTime {
    pub fn new(repository: ProgressRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, progress: &UserProgress, additional_seconds: u64) -> Result<UserProgress> {
        let mut updated = progress.clone();
        updated.time_spent_seconds = updated.time_spent_seconds.saturating_add(additional_seconds);
        updated.last_accessed_at = Utc::now();

        self.repository.update_progress(&updated).await?;
        Ok(updated)
    }
}

pub struct ResetCourseProgress {
    repository: ProgressRepository,
}

impl ResetCourseProgress {
    pub fn new(repository: ProgressRepository) -> Self {
        Self { repository }
    }

    /// Returns the number of progress rows removed
    pub async fn execute(&self, course_id: &str) -> Result<u64> {
        Ok(self.repository.reset_progress(course_id).await?)
    }
}
