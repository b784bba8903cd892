//! User progress queries

use super::{activities, courses, lessons, Database, Table, UserProgressRecord, UserStatsRecord};
use crate::{Error, Result};
use tracing::info;

const SELECT_PROGRESS: &str = r#"
    SELECT id, course_id, lesson_id, activity_id, status, score, max_score,
           completed_at, last_accessed_at, time_spent_seconds
    FROM user_progress
"#;

pub async fn get_progress_by_course(db: &Database, course_id: &str) -> Result<Vec<UserProgressRecord>> {
    let sql = format!(
        "{} WHERE course_id = ? ORDER BY lesson_id, activity_id",
        SELECT_PROGRESS
    );
    Ok(sqlx::query_as::<_, UserProgressRecord>(&sql)
        .bind(course_id)
        .fetch_all(db.pool())
        .await?)
}

/// Lesson-level progress (the row without an activity)
pub async fn get_progress_by_lesson(db: &Database, lesson_id: &str) -> Result<Option<UserProgressRecord>> {
    let sql = format!(
        "{} WHERE lesson_id = ? AND activity_id IS NULL",
        SELECT_PROGRESS
    );
    Ok(sqlx::query_as::<_, UserProgressRecord>(&sql)
        .bind(lesson_id)
        .fetch_optional(db.pool())
        .await?)
}

/// Every progress row for a lesson, lesson-level row first
pub async fn get_all_progress_for_lesson(db: &Database, lesson_id: &str) -> Result<Vec<UserProgressRecord>> {
    let sql = format!(
        "{} WHERE lesson_id = ? ORDER BY activity_id IS NOT NULL, activity_id",
        SELECT_PROGRESS
    );
    Ok(sqlx::query_as::<_, UserProgressRecord>(&sql)
        .bind(lesson_id)
        .fetch_all(db.pool())
        .await?)
}

pub async fn get_progress_by_id(db: &Database, id: &str) -> Result<Option<UserProgressRecord>> {
    let sql = format!("{} WHERE id = ?", SELECT_PROGRESS);
    Ok(sqlx::query_as::<_, UserProgressRecord>(&sql)
        .bind(id)
        .fetch_optional(db.pool())
        .await?)
}

/// Aggregate over completed progress rows
pub async fn get_user_stats_raw(db: &Database) -> Result<UserStatsRecord> {
    Ok(sqlx::query_as::<_, UserStatsRecord>(
        r#"
        SELECT
            COUNT(DISTINCT lesson_id) AS total_lessons_completed,
            COUNT(DISTINCT activity_id) AS total_activities_completed,
            COALESCE(SUM(time_spent_seconds), 0) AS total_time_spent_seconds,
            AVG(CASE WHEN max_score > 0
                     THEN CAST(score AS REAL) / max_score * 100.0
                END) AS average_score
        FROM user_progress
        WHERE status = 'COMPLETED'
        "#,
    )
    .fetch_one(db.pool())
    .await?)
}

/// Every timestamp (epoch ms) at which the learner touched or finished something
pub async fn get_study_timestamps(db: &Database) -> Result<Vec<i64>> {
    Ok(sqlx::query_scalar(
        r#"
        SELECT last_accessed_at FROM user_progress
        UNION
        SELECT completed_at FROM user_progress WHERE completed_at IS NOT NULL
        ORDER BY 1
        "#,
    )
    .fetch_all(db.pool())
    .await?)
}

/// Insert or replace a progress row; course and lesson must exist
pub async fn upsert_progress(db: &Database, progress: &UserProgressRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO user_progress (id, course_id, lesson_id, activity_id, status, score,
                                   max_score, completed_at, last_accessed_at, time_spent_seconds)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            course_id = excluded.course_id,
            lesson_id = excluded.lesson_id,
            activity_id = excluded.activity_id,
            status = excluded.status,
            score = excluded.score,
            max_score = excluded.max_score,
            completed_at = excluded.completed_at,
            last_accessed_at = excluded.last_accessed_at,
            time_spent_seconds = excluded.time_spent_seconds
        "#,
    )
    .bind(&progress.id)
    .bind(&progress.course_id)
    .bind(&progress.lesson_id)
    .bind(&progress.activity_id)
    .bind(&progress.status)
    .bind(progress.score)
    .bind(progress.max_score)
    .bind(progress.completed_at)
    .bind(progress.last_accessed_at)
    .bind(progress.time_spent_seconds)
    .execute(db.pool())
    .await?;

    db.notify(Table::UserProgress);
    Ok(())
}

/// Update an existing progress row; `NotFound` if it does not exist
pub async fn update_progress(db: &Database, progress: &UserProgressRecord) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE user_progress SET
            course_id = ?, lesson_id = ?, activity_id = ?, status = ?, score = ?,
            max_score = ?, completed_at = ?, last_accessed_at = ?, time_spent_seconds = ?
        WHERE id = ?
        "#,
    )
    .bind(&progress.course_id)
    .bind(&progress.lesson_id)
    .bind(&progress.activity_id)
    .bind(&progress.status)
    .bind(progress.score)
    .bind(progress.max_score)
    .bind(progress.completed_at)
    .bind(progress.last_accessed_at)
    .bind(progress.time_spent_seconds)
    .bind(&progress.id)
    .execute(db.pool())
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("progress {}", progress.id)));
    }

    db.notify(Table::UserProgress);
    Ok(())
}

/// Delete a course's progress rows and clear its completion state
///
/// Runs as one transaction: progress rows are deleted, lessons and
/// activities lose their completion flags, and the course's completed
/// lesson count returns to zero. Returns the number of deleted rows.
pub async fn reset_course_progress(db: &Database, course_id: &str) -> Result<u64> {
    let mut tx = db.pool().begin().await?;

    let deleted = sqlx::query("DELETE FROM user_progress WHERE course_id = ?")
        .bind(course_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let lessons_reset = lessons::reset_lessons_for_course_with(&mut *tx, course_id).await?;
    let activities_reset = activities::reset_activities_for_course_with(&mut *tx, course_id).await?;
    courses::set_completed_lessons_with(&mut *tx, course_id, 0).await?;

    tx.commit().await?;

    info!(
        "Reset course {}: {} progress rows deleted, {} lessons and {} activities cleared",
        course_id, deleted, lessons_reset, activities_reset
    );

    for table in [
        Table::UserProgress,
        Table::Lessons,
        Table::Activities,
        Table::Courses,
    ] {
        db.notify(table);
    }
    Ok(deleted)
}
