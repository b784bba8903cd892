//! Course queries

use super::{CourseRecord, Database, Table};
use crate::{Error, Result};
use sqlx::{Executor, Sqlite};

const SELECT_COURSE: &str = r#"
    SELECT id, name, name_japanese, description, level, total_lessons,
           completed_lessons, image_url, is_unlocked
    FROM courses
"#;

/// All courses in level order
pub async fn get_all_courses(db: &Database) -> Result<Vec<CourseRecord>> {
    let sql = format!("{} ORDER BY level, name", SELECT_COURSE);
    Ok(sqlx::query_as::<_, CourseRecord>(&sql)
        .fetch_all(db.pool())
        .await?)
}

pub async fn get_course_by_id(db: &Database, id: &str) -> Result<Option<CourseRecord>> {
    let sql = format!("{} WHERE id = ?", SELECT_COURSE);
    Ok(sqlx::query_as::<_, CourseRecord>(&sql)
        .bind(id)
        .fetch_optional(db.pool())
        .await?)
}

pub async fn get_courses_by_level(db: &Database, level: &str) -> Result<Vec<CourseRecord>> {
    let sql = format!("{} WHERE level = ? ORDER BY name", SELECT_COURSE);
    Ok(sqlx::query_as::<_, CourseRecord>(&sql)
        .bind(level)
        .fetch_all(db.pool())
        .await?)
}

/// Insert or replace a course
///
/// Uses an in-place upsert rather than `INSERT OR REPLACE`: replacing would
/// delete the old row first and cascade to the course's lessons.
pub async fn upsert_course(db: &Database, course: &CourseRecord) -> Result<()> {
    upsert_course_with(db.pool(), course).await?;
    db.notify(Table::Courses);
    Ok(())
}

pub(crate) async fn upsert_course_with<'e, E>(executor: E, course: &CourseRecord) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO courses (id, name, name_japanese, description, level, total_lessons,
                             completed_lessons, image_url, is_unlocked)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            name_japanese = excluded.name_japanese,
            description = excluded.description,
            level = excluded.level,
            total_lessons = excluded.total_lessons,
            completed_lessons = excluded.completed_lessons,
            image_url = excluded.image_url,
            is_unlocked = excluded.is_unlocked
        "#,
    )
    .bind(&course.id)
    .bind(&course.name)
    .bind(&course.name_japanese)
    .bind(&course.description)
    .bind(&course.level)
    .bind(course.total_lessons)
    .bind(course.completed_lessons)
    .bind(&course.image_url)
    .bind(course.is_unlocked)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn upsert_courses(db: &Database, courses: &[CourseRecord]) -> Result<()> {
    let mut tx = db.pool().begin().await?;
    for course in courses {
        upsert_course_with(&mut *tx, course).await?;
    }
    tx.commit().await?;

    db.notify(Table::Courses);
    Ok(())
}

/// Update an existing course; `NotFound` if it does not exist
pub async fn update_course(db: &Database, course: &CourseRecord) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE courses SET
            name = ?, name_japanese = ?, description = ?, level = ?, total_lessons = ?,
            completed_lessons = ?, image_url = ?, is_unlocked = ?
        WHERE id = ?
        "#,
    )
    .bind(&course.name)
    .bind(&course.name_japanese)
    .bind(&course.description)
    .bind(&course.level)
    .bind(course.total_lessons)
    .bind(course.completed_lessons)
    .bind(&course.image_url)
    .bind(course.is_unlocked)
    .bind(&course.id)
    .execute(db.pool())
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("course {}", course.id)));
    }

    db.notify(Table::Courses);
    Ok(())
}

pub async fn set_completed_lessons(db: &Database, course_id: &str, completed: i64) -> Result<()> {
    set_completed_lessons_with(db.pool(), course_id, completed).await?;
    db.notify(Table::Courses);
    Ok(())
}

pub(crate) async fn set_completed_lessons_with<'e, E>(
    executor: E,
    course_id: &str,
    completed: i64,
) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("UPDATE courses SET completed_lessons = ? WHERE id = ?")
        .bind(completed)
        .bind(course_id)
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("course {}", course_id)));
    }
    Ok(())
}

pub async fn set_course_unlocked(db: &Database, course_id: &str, unlocked: bool) -> Result<()> {
    let result = sqlx::query("UPDATE courses SET is_unlocked = ? WHERE id = ?")
        .bind(unlocked)
        .bind(course_id)
        .execute(db.pool())
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("course {}", course_id)));
    }

    db.notify(Table::Courses);
    Ok(())
}

/// Delete a course and, through foreign keys, its lessons, activities,
/// vocabulary and progress
pub async fn delete_course(db: &Database, course_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM courses WHERE id = ?")
        .bind(course_id)
        .execute(db.pool())
        .await?;

    let deleted = result.rows_affected() > 0;
    if deleted {
        for table in [
            Table::Courses,
            Table::Lessons,
            Table::Activities,
            Table::Vocabulary,
            Table::UserProgress,
        ] {
            db.notify(table);
        }
    }
    Ok(deleted)
}
