//! Lesson queries

use super::{Database, LessonRecord, Table};
use crate::{Error, Result};
use sqlx::{Executor, Sqlite};

const SELECT_LESSON: &str = r#"
    SELECT id, course_id, number, title, title_japanese, description,
           is_completed, is_unlocked, progress, image_url
    FROM lessons
"#;

pub async fn get_lessons_by_course(db: &Database, course_id: &str) -> Result<Vec<LessonRecord>> {
    let sql = format!("{} WHERE course_id = ? ORDER BY number", SELECT_LESSON);
    Ok(sqlx::query_as::<_, LessonRecord>(&sql)
        .bind(course_id)
        .fetch_all(db.pool())
        .await?)
}

pub async fn get_lesson_by_id(db: &Database, id: &str) -> Result<Option<LessonRecord>> {
    let sql = format!("{} WHERE id = ?", SELECT_LESSON);
    Ok(sqlx::query_as::<_, LessonRecord>(&sql)
        .bind(id)
        .fetch_optional(db.pool())
        .await?)
}

pub async fn count_completed_lessons(db: &Database, course_id: &str) -> Result<i64> {
    Ok(sqlx::query_scalar(
        "SELECT COUNT(*) FROM lessons WHERE course_id = ? AND is_completed = 1",
    )
    .bind(course_id)
    .fetch_one(db.pool())
    .await?)
}

/// Insert or replace a lesson; the course must exist
pub async fn upsert_lesson(db: &Database, lesson: &LessonRecord) -> Result<()> {
    upsert_lesson_with(db.pool(), lesson).await?;
    db.notify(Table::Lessons);
    Ok(())
}

pub(crate) async fn upsert_lesson_with<'e, E>(executor: E, lesson: &LessonRecord) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO lessons (id, course_id, number, title, title_japanese, description,
                             is_completed, is_unlocked, progress, image_url)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            course_id = excluded.course_id,
            number = excluded.number,
            title = excluded.title,
            title_japanese = excluded.title_japanese,
            description = excluded.description,
            is_completed = excluded.is_completed,
            is_unlocked = excluded.is_unlocked,
            progress = excluded.progress,
            image_url = excluded.image_url
        "#,
    )
    .bind(&lesson.id)
    .bind(&lesson.course_id)
    .bind(lesson.number)
    .bind(&lesson.title)
    .bind(&lesson.title_japanese)
    .bind(&lesson.description)
    .bind(lesson.is_completed)
    .bind(lesson.is_unlocked)
    .bind(lesson.progress)
    .bind(&lesson.image_url)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn upsert_lessons(db: &Database, lessons: &[LessonRecord]) -> Result<()> {
    let mut tx = db.pool().begin().await?;
    for lesson in lessons {
        upsert_lesson_with(&mut *tx, lesson).await?;
    }
    tx.commit().await?;

    db.notify(Table::Lessons);
    Ok(())
}

/// Update an existing lesson; `NotFound` if it does not exist
pub async fn update_lesson(db: &Database, lesson: &LessonRecord) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE lessons SET
            course_id = ?, number = ?, title = ?, title_japanese = ?, description = ?,
            is_completed = ?, is_unlocked = ?, progress = ?, image_url = ?
        WHERE id = ?
        "#,
    )
    .bind(&lesson.course_id)
    .bind(lesson.number)
    .bind(&lesson.title)
    .bind(&lesson.title_japanese)
    .bind(&lesson.description)
    .bind(lesson.is_completed)
    .bind(lesson.is_unlocked)
    .bind(lesson.progress)
    .bind(&lesson.image_url)
    .bind(&lesson.id)
    .execute(db.pool())
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("lesson {}", lesson.id)));
    }

    db.notify(Table::Lessons);
    Ok(())
}

/// Targeted update of completion flag and progress fraction
pub async fn update_lesson_progress(
    db: &Database,
    lesson_id: &str,
    is_completed: bool,
    progress: f64,
) -> Result<()> {
    if !(0.0..=1.0).contains(&progress) {
        return Err(Error::InvalidInput(format!(
            "lesson {}: progress {} outside 0.0-1.0",
            lesson_id, progress
        )));
    }

    let result = sqlx::query("UPDATE lessons SET is_completed = ?, progress = ? WHERE id = ?")
        .bind(is_completed)
        .bind(progress)
        .bind(lesson_id)
        .execute(db.pool())
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("lesson {}", lesson_id)));
    }

    db.notify(Table::Lessons);
    Ok(())
}

pub async fn set_lesson_unlocked(db: &Database, lesson_id: &str, unlocked: bool) -> Result<()> {
    let result = sqlx::query("UPDATE lessons SET is_unlocked = ? WHERE id = ?")
        .bind(unlocked)
        .bind(lesson_id)
        .execute(db.pool())
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("lesson {}", lesson_id)));
    }

    db.notify(Table::Lessons);
    Ok(())
}

/// Clear completion and progress for every lesson in a course
pub(crate) async fn reset_lessons_for_course_with<'e, E>(executor: E, course_id: &str) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "UPDATE lessons SET is_completed = 0, progress = 0.0 WHERE course_id = ?",
    )
    .bind(course_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
