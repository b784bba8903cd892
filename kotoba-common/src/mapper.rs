//! Conversions between stored records and domain models
//!
//! Record → model conversions are fallible: a stored enum string or
//! timestamp may be corrupt. Model → record conversions validate the
//! domain invariants (progress fraction, score bounds, content/type match)
//! before anything reaches the database.

use crate::db::{
    ActivityRecord, CourseRecord, LessonRecord, UserProfileRecord, UserProgressRecord,
    UserStatsRecord, VocabularyRecord,
};
use crate::models::{
    Activity, ActivityContent, ActivityType, Course, CourseLevel, Lesson, ProgressStatus,
    UserProfile, UserProgress, UserStats, VocabularyEntry, VocabularyItem,
};
use crate::{Error, Result};
use chrono::{DateTime, Utc};

fn to_u32(value: i64, field: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| Error::InvalidInput(format!("{} out of range: {}", field, value)))
}

fn to_u64(value: i64, field: &str) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| Error::InvalidInput(format!("{} out of range: {}", field, value)))
}

fn from_millis(millis: i64, field: &str) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| Error::InvalidInput(format!("{} is not a valid timestamp: {}", field, millis)))
}

fn check_progress_fraction(id: &str, progress: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&progress) {
        return Err(Error::InvalidInput(format!(
            "lesson {}: progress {} outside 0.0-1.0",
            id, progress
        )));
    }
    Ok(())
}

// ==================== COURSE ====================

impl TryFrom<CourseRecord> for Course {
    type Error = Error;

    fn try_from(record: CourseRecord) -> Result<Self> {
        let level = CourseLevel::from_db_string(&record.level).ok_or_else(|| {
            Error::InvalidInput(format!("course {}: unknown level '{}'", record.id, record.level))
        })?;

        Ok(Course {
            level,
            total_lessons: to_u32(record.total_lessons, "total_lessons")?,
            completed_lessons: to_u32(record.completed_lessons, "completed_lessons")?,
            id: record.id,
            name: record.name,
            name_japanese: record.name_japanese,
            description: record.description,
            image_url: record.image_url,
            is_unlocked: record.is_unlocked,
        })
    }
}

impl From<&Course> for CourseRecord {
    fn from(course: &Course) -> Self {
        CourseRecord {
            id: course.id.clone(),
            name: course.name.clone(),
            name_japanese: course.name_japanese.clone(),
            description: course.description.clone(),
            level: course.level.to_db_string().to_string(),
            total_lessons: i64::from(course.total_lessons),
            completed_lessons: i64::from(course.completed_lessons),
            image_url: course.image_url.clone(),
            is_unlocked: course.is_unlocked,
        }
    }
}

// ==================== LESSON ====================

impl TryFrom<LessonRecord> for Lesson {
    type Error = Error;

    fn try_from(record: LessonRecord) -> Result<Self> {
        check_progress_fraction(&record.id, record.progress)?;

        Ok(Lesson {
            number: to_u32(record.number, "number")?,
            progress: record.progress as f32,
            id: record.id,
            course_id: record.course_id,
            title: record.title,
            title_japanese: record.title_japanese,
            description: record.description,
            activities: Vec::new(),
            is_completed: record.is_completed,
            is_unlocked: record.is_unlocked,
            image_url: record.image_url,
        })
    }
}

impl TryFrom<&Lesson> for LessonRecord {
    type Error = Error;

    fn try_from(lesson: &Lesson) -> Result<Self> {
        let progress = f64::from(lesson.progress);
        check_progress_fraction(&lesson.id, progress)?;

        Ok(LessonRecord {
            id: lesson.id.clone(),
            course_id: lesson.course_id.clone(),
            number: i64::from(lesson.number),
            title: lesson.title.clone(),
            title_japanese: lesson.title_japanese.clone(),
            description: lesson.description.clone(),
            is_completed: lesson.is_completed,
            is_unlocked: lesson.is_unlocked,
            progress,
            image_url: lesson.image_url.clone(),
        })
    }
}

// ==================== ACTIVITY ====================

impl TryFrom<ActivityRecord> for Activity {
    type Error = Error;

    fn try_from(record: ActivityRecord) -> Result<Self> {
        let activity_type = ActivityType::from_db_string(&record.activity_type).ok_or_else(|| {
            Error::InvalidInput(format!(
                "activity {}: unknown type '{}'",
                record.id, record.activity_type
            ))
        })?;
        let content: ActivityContent = serde_json::from_str(&record.content_json)?;

        Ok(Activity {
            activity_type,
            content,
            order: to_u32(record.sort_order, "sort_order")?,
            id: record.id,
            lesson_id: record.lesson_id,
            title: record.title,
            title_japanese: record.title_japanese,
            is_completed: record.is_completed,
        })
    }
}

impl TryFrom<&Activity> for ActivityRecord {
    type Error = Error;

    fn try_from(activity: &Activity) -> Result<Self> {
        if activity.content.activity_type() != activity.activity_type {
            return Err(Error::InvalidInput(format!(
                "activity {}: {} content on a {} activity",
                activity.id,
                activity.content.activity_type(),
                activity.activity_type
            )));
        }

        Ok(ActivityRecord {
            id: activity.id.clone(),
            lesson_id: activity.lesson_id.clone(),
            activity_type: activity.activity_type.to_db_string().to_string(),
            title: activity.title.clone(),
            title_japanese: activity.title_japanese.clone(),
            content_json: serde_json::to_string(&activity.content)?,
            is_completed: activity.is_completed,
            sort_order: i64::from(activity.order),
        })
    }
}

// ==================== PROGRESS ====================

impl TryFrom<UserProgressRecord> for UserProgress {
    type Error = Error;

    fn try_from(record: UserProgressRecord) -> Result<Self> {
        let status = ProgressStatus::from_db_string(&record.status).ok_or_else(|| {
            Error::InvalidInput(format!("progress {}: unknown status '{}'", record.id, record.status))
        })?;

        let progress = UserProgress {
            status,
            score: to_u32(record.score, "score")?,
            max_score: to_u32(record.max_score, "max_score")?,
            completed_at: record
                .completed_at
                .map(|ms| from_millis(ms, "completed_at"))
                .transpose()?,
            last_accessed_at: from_millis(record.last_accessed_at, "last_accessed_at")?,
            time_spent_seconds: to_u64(record.time_spent_seconds, "time_spent_seconds")?,
            id: record.id,
            course_id: record.course_id,
            lesson_id: record.lesson_id,
            activity_id: record.activity_id,
        };
        progress.validate()?;
        Ok(progress)
    }
}

impl TryFrom<&UserProgress> for UserProgressRecord {
    type Error = Error;

    fn try_from(progress: &UserProgress) -> Result<Self> {
        progress.validate()?;

        Ok(UserProgressRecord {
            id: progress.id.clone(),
            course_id: progress.course_id.clone(),
            lesson_id: progress.lesson_id.clone(),
            activity_id: progress.activity_id.clone(),
            status: progress.status.to_db_string().to_string(),
            score: i64::from(progress.score),
            max_score: i64::from(progress.max_score),
            completed_at: progress.completed_at.map(|t| t.timestamp_millis()),
            last_accessed_at: progress.last_accessed_at.timestamp_millis(),
            time_spent_seconds: i64::try_from(progress.time_spent_seconds).map_err(|_| {
                Error::InvalidInput(format!(
                    "progress {}: time spent out of range",
                    progress.id
                ))
            })?,
        })
    }
}

/// Raw aggregate to stats; streaks are filled in by the repository
impl From<UserStatsRecord> for UserStats {
    fn from(raw: UserStatsRecord) -> Self {
        UserStats {
            total_lessons_completed: u32::try_from(raw.total_lessons_completed).unwrap_or(0),
            total_activities_completed: u32::try_from(raw.total_activities_completed).unwrap_or(0),
            total_time_spent_minutes: u64::try_from(raw.total_time_spent_seconds / 60).unwrap_or(0),
            average_score: raw.average_score.unwrap_or(0.0) as f32,
            ..UserStats::default()
        }
    }
}

// ==================== USER PROFILE ====================

impl TryFrom<UserProfileRecord> for UserProfile {
    type Error = Error;

    fn try_from(record: UserProfileRecord) -> Result<Self> {
        Ok(UserProfile {
            daily_goal_minutes: to_u32(record.daily_goal_minutes, "daily_goal_minutes")?,
            created_at: from_millis(record.created_at, "created_at")?,
            id: record.id,
            display_name: record.display_name,
            preferred_language: record.preferred_language,
            notifications_enabled: record.notifications_enabled,
            dark_mode_enabled: record.dark_mode_enabled,
            sound_enabled: record.sound_enabled,
        })
    }
}

impl From<&UserProfile> for UserProfileRecord {
    fn from(profile: &UserProfile) -> Self {
        UserProfileRecord {
            id: profile.id.clone(),
            display_name: profile.display_name.clone(),
            preferred_language: profile.preferred_language.clone(),
            daily_goal_minutes: i64::from(profile.daily_goal_minutes),
            notifications_enabled: profile.notifications_enabled,
            dark_mode_enabled: profile.dark_mode_enabled,
            sound_enabled: profile.sound_enabled,
            created_at: profile.created_at.timestamp_millis(),
        }
    }
}

// ==================== VOCABULARY ====================

impl TryFrom<VocabularyRecord> for VocabularyEntry {
    type Error = Error;

    fn try_from(record: VocabularyRecord) -> Result<Self> {
        Ok(VocabularyEntry {
            times_reviewed: to_u32(record.times_reviewed, "times_reviewed")?,
            id: record.id,
            lesson_id: record.lesson_id,
            item: VocabularyItem {
                word: record.word,
                reading: record.reading,
                meaning: record.meaning,
                example: record.example,
                example_meaning: record.example_meaning,
                audio_url: record.audio_url,
            },
            is_favorite: record.is_favorite,
        })
    }
}

impl From<&VocabularyEntry> for VocabularyRecord {
    fn from(entry: &VocabularyEntry) -> Self {
        VocabularyRecord {
            id: entry.id.clone(),
            lesson_id: entry.lesson_id.clone(),
            word: entry.item.word.clone(),
            reading: entry.item.reading.clone(),
            meaning: entry.item.meaning.clone(),
            example: entry.item.example.clone(),
            example_meaning: entry.item.example_meaning.clone(),
            audio_url: entry.item.audio_url.clone(),
            is_favorite: entry.is_favorite,
            times_reviewed: i64::from(entry.times_reviewed),
        }
    }
}

/// Convert a list of records, failing on the first bad one
pub fn map_all<R, T>(records: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = Error>,
{
    records.into_iter().map(T::try_from).collect()
}
