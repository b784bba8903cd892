//! Progress, statistics and profile models

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default maximum score for a progress record
pub const DEFAULT_MAX_SCORE: u32 = 100;

/// Learner progress on a lesson or on one of its activities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    pub id: String,
    pub course_id: String,
    pub lesson_id: String,
    pub activity_id: Option<String>,
    pub status: ProgressStatus,
    pub score: u32,
    pub max_score: u32,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_accessed_at: DateTime<Utc>,
    pub time_spent_seconds: u64,
}

impl UserProgress {
    /// Stable id for a course/lesson/activity triple
    ///
    /// Lesson-level progress (no activity) uses the `main` suffix, so saving
    /// twice for the same triple overwrites rather than duplicates.
    pub fn progress_id(course_id: &str, lesson_id: &str, activity_id: Option<&str>) -> String {
        format!("{}_{}_{}", course_id, lesson_id, activity_id.unwrap_or("main"))
    }

    /// Fresh, not-started record for a course/lesson/activity triple
    pub fn new(course_id: &str, lesson_id: &str, activity_id: Option<&str>) -> Self {
        Self {
            id: Self::progress_id(course_id, lesson_id, activity_id),
            course_id: course_id.to_string(),
            lesson_id: lesson_id.to_string(),
            activity_id: activity_id.map(str::to_string),
            status: ProgressStatus::NotStarted,
            score: 0,
            max_score: DEFAULT_MAX_SCORE,
            completed_at: None,
            last_accessed_at: Utc::now(),
            time_spent_seconds: 0,
        }
    }

    /// Check the score bounds: 0 <= score <= max_score
    pub fn validate(&self) -> Result<()> {
        if self.score > self.max_score {
            return Err(Error::InvalidInput(format!(
                "progress {}: score {} exceeds max score {}",
                self.id, self.score, self.max_score
            )));
        }
        Ok(())
    }

    /// Score as a percentage of the maximum (0.0 when max is zero)
    pub fn percentage(&self) -> f32 {
        if self.max_score == 0 {
            return 0.0;
        }
        self.score as f32 / self.max_score as f32 * 100.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressStatus {
    /// Parse from database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "NOT_STARTED" => Some(ProgressStatus::NotStarted),
            "IN_PROGRESS" => Some(ProgressStatus::InProgress),
            "COMPLETED" => Some(ProgressStatus::Completed),
            _ => None,
        }
    }

    /// Convert to database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "NOT_STARTED",
            ProgressStatus::InProgress => "IN_PROGRESS",
            ProgressStatus::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.to_db_string())
    }
}

/// Aggregate learner statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_lessons_completed: u32,
    pub total_activities_completed: u32,
    pub total_time_spent_minutes: u64,
    /// Mean of completed score percentages (0-100)
    pub average_score: f32,
    /// Consecutive study days ending today or yesterday
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_study_date: Option<DateTime<Utc>>,
}

/// Learner settings and profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
    pub preferred_language: String,
    pub daily_goal_minutes: u32,
    pub notifications_enabled: bool,
    pub dark_mode_enabled: bool,
    pub sound_enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Profile with default preferences (Spanish UI, 15 minute daily goal)
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            preferred_language: "es".to_string(),
            daily_goal_minutes: 15,
            notifications_enabled: true,
            dark_mode_enabled: false,
            sound_enabled: true,
            created_at: Utc::now(),
        }
    }
}
