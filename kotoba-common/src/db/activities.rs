//! Activity queries

use super::{ActivityRecord, Database, Table};
use crate::{Error, Result};
use sqlx::{Executor, Sqlite};

const SELECT_ACTIVITY: &str = r#"
    SELECT id, lesson_id, activity_type, title, title_japanese, content_json,
           is_completed, sort_order
    FROM activities
"#;

pub async fn get_activities_by_lesson(db: &Database, lesson_id: &str) -> Result<Vec<ActivityRecord>> {
    let sql = format!("{} WHERE lesson_id = ? ORDER BY sort_order", SELECT_ACTIVITY);
    Ok(sqlx::query_as::<_, ActivityRecord>(&sql)
        .bind(lesson_id)
        .fetch_all(db.pool())
        .await?)
}

pub async fn get_activity_by_id(db: &Database, id: &str) -> Result<Option<ActivityRecord>> {
    let sql = format!("{} WHERE id = ?", SELECT_ACTIVITY);
    Ok(sqlx::query_as::<_, ActivityRecord>(&sql)
        .bind(id)
        .fetch_optional(db.pool())
        .await?)
}

pub async fn count_completed_activities(db: &Database, lesson_id: &str) -> Result<i64> {
    Ok(sqlx::query_scalar(
        "SELECT COUNT(*) FROM activities WHERE lesson_id = ? AND is_completed = 1",
    )
    .bind(lesson_id)
    .fetch_one(db.pool())
    .await?)
}

pub async fn count_activities(db: &Database, lesson_id: &str) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM activities WHERE lesson_id = ?")
        .bind(lesson_id)
        .fetch_one(db.pool())
        .await?)
}

/// Insert or replace an activity; the lesson must exist
pub async fn upsert_activity(db: &Database, activity: &ActivityRecord) -> Result<()> {
    upsert_activity_with(db.pool(), activity).await?;
    db.notify(Table::Activities);
    Ok(())
}

pub(crate) async fn upsert_activity_with<'e, E>(executor: E, activity: &ActivityRecord) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO activities (id, lesson_id, activity_type, title, title_japanese,
                                content_json, is_completed, sort_order)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            lesson_id = excluded.lesson_id,
            activity_type = excluded.activity_type,
            title = excluded.title,
            title_japanese = excluded.title_japanese,
            content_json = excluded.content_json,
            is_completed = excluded.is_completed,
            sort_order = excluded.sort_order
        "#,
    )
    .bind(&activity.id)
    .bind(&activity.lesson_id)
    .bind(&activity.activity_type)
    .bind(&activity.title)
    .bind(&activity.title_japanese)
    .bind(&activity.content_json)
    .bind(activity.is_completed)
    .bind(activity.sort_order)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn upsert_activities(db: &Database, activities: &[ActivityRecord]) -> Result<()> {
    let mut tx = db.pool().begin().await?;
    for activity in activities {
        upsert_activity_with(&mut *tx, activity).await?;
    }
    tx.commit().await?;

    db.notify(Table::Activities);
    Ok(())
}

/// Update an existing activity; `NotFound` if it does not exist
pub async fn update_activity(db: &Database, activity: &ActivityRecord) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE activities SET
            lesson_id = ?, activity_type = ?, title = ?, title_japanese = ?,
            content_json = ?, is_completed = ?, sort_order = ?
        WHERE id = ?
        "#,
    )
    .bind(&activity.lesson_id)
    .bind(&activity.activity_type)
    .bind(&activity.title)
    .bind(&activity.title_japanese)
    .bind(&activity.content_json)
    .bind(activity.is_completed)
    .bind(activity.sort_order)
    .bind(&activity.id)
    .execute(db.pool())
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("activity {}", activity.id)));
    }

    db.notify(Table::Activities);
    Ok(())
}

/// Targeted update of the completion flag
pub async fn update_activity_completion(
    db: &Database,
    activity_id: &str,
    is_completed: bool,
) -> Result<()> {
    let result = sqlx::query("UPDATE activities SET is_completed = ? WHERE id = ?")
        .bind(is_completed)
        .bind(activity_id)
        .execute(db.pool())
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("activity {}", activity_id)));
    }

    db.notify(Table::Activities);
    Ok(())
}

/// Clear completion for every activity of every lesson in a course
pub(crate) async fn reset_activities_for_course_with<'e, E>(
    executor: E,
    course_id: &str,
) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE activities SET is_completed = 0
        WHERE lesson_id IN (SELECT id FROM lessons WHERE course_id = ?)
        "#,
    )
    .bind(course_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
