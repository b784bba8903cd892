//! Stored records
//!
//! One struct per table, mirroring the columns exactly. Timestamps are epoch
//! milliseconds; enums are their database strings. Conversion to domain
//! models happens in [`crate::mapper`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CourseRecord {
    pub id: String,
    pub name: String,
    pub name_japanese: String,
    pub description: String,
    pub level: String,
    pub total_lessons: i64,
    pub completed_lessons: i64,
    pub image_url: Option<String>,
    pub is_unlocked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LessonRecord {
    pub id: String,
    pub course_id: String,
    pub number: i64,
    pub title: String,
    pub title_japanese: String,
    pub description: String,
    pub is_completed: bool,
    pub is_unlocked: bool,
    pub progress: f64,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActivityRecord {
    pub id: String,
    pub lesson_id: String,
    pub activity_type: String,
    pub title: String,
    pub title_japanese: String,
    pub content_json: String,
    pub is_completed: bool,
    pub sort_order: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProgressRecord {
    pub id: String,
    pub course_id: String,
    pub lesson_id: String,
    pub activity_id: Option<String>,
    pub status: String,
    pub score: i64,
    pub max_score: i64,
    pub completed_at: Option<i64>,
    pub last_accessed_at: i64,
    pub time_spent_seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfileRecord {
    pub id: String,
    pub display_name: Option<String>,
    pub preferred_language: String,
    pub daily_goal_minutes: i64,
    pub notifications_enabled: bool,
    pub dark_mode_enabled: bool,
    pub sound_enabled: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct VocabularyRecord {
    pub id: String,
    pub lesson_id: String,
    pub word: String,
    pub reading: String,
    pub meaning: String,
    pub example: Option<String>,
    pub example_meaning: Option<String>,
    pub audio_url: Option<String>,
    pub is_favorite: bool,
    pub times_reviewed: i64,
}

/// Raw aggregate over completed progress rows
#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct UserStatsRecord {
    pub total_lessons_completed: i64,
    pub total_activities_completed: i64,
    pub total_time_spent_seconds: i64,
    pub average_score: Option<f64>,
}
