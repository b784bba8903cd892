//! User profile queries
//!
//! The app is single-user; the table holds at most one meaningful row.

use super::{Database, Table, UserProfileRecord};
use crate::{Error, Result};

pub async fn get_user_profile(db: &Database) -> Result<Option<UserProfileRecord>> {
    Ok(sqlx::query_as::<_, UserProfileRecord>(
        r#"
        SELECT id, display_name, preferred_language, daily_goal_minutes,
               notifications_enabled, dark_mode_enabled, sound_enabled, created_at
        FROM user_profile
        ORDER BY created_at
        LIMIT 1
        "#,
    )
    .fetch_optional(db.pool())
    .await?)
}

pub async fn upsert_user_profile(db: &Database, profile: &UserProfileRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO user_profile (id, display_name, preferred_language, daily_goal_minutes,
                                  notifications_enabled, dark_mode_enabled, sound_enabled,
                                  created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            display_name = excluded.display_name,
            preferred_language = excluded.preferred_language,
            daily_goal_minutes = excluded.daily_goal_minutes,
            notifications_enabled = excluded.notifications_enabled,
            dark_mode_enabled = excluded.dark_mode_enabled,
            sound_enabled = excluded.sound_enabled,
            created_at = excluded.created_at
        "#,
    )
    .bind(&profile.id)
    .bind(&profile.display_name)
    .bind(&profile.preferred_language)
    .bind(profile.daily_goal_minutes)
    .bind(profile.notifications_enabled)
    .bind(profile.dark_mode_enabled)
    .bind(profile.sound_enabled)
    .bind(profile.created_at)
    .execute(db.pool())
    .await?;

    db.notify(Table::UserProfile);
    Ok(())
}

/// Update an existing profile; `NotFound` if it does not exist
pub async fn update_user_profile(db: &Database, profile: &UserProfileRecord) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE user_profile SET
            display_name = ?, preferred_language = ?, daily_goal_minutes = ?,
            notifications_enabled = ?, dark_mode_enabled = ?, sound_enabled = ?
        WHERE id = ?
        "#,
    )
    .bind(&profile.display_name)
    .bind(&profile.preferred_language)
    .bind(profile.daily_goal_minutes)
    .bind(profile.notifications_enabled)
    .bind(profile.dark_mode_enabled)
    .bind(profile.sound_enabled)
    .bind(&profile.id)
    .execute(db.pool())
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("user profile {}", profile.id)));
    }

    db.notify(Table::UserProfile);
    Ok(())
}
