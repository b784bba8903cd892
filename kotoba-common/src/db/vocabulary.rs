//! Vocabulary queries

use super::{Database, Table, VocabularyRecord};
use crate::{Error, Result};
use sqlx::{Executor, Sqlite};

const SELECT_VOCABULARY: &str = r#"
    SELECT id, lesson_id, word, reading, meaning, example, example_meaning,
           audio_url, is_favorite, times_reviewed
    FROM vocabulary
"#;

pub async fn get_vocabulary_by_lesson(db: &Database, lesson_id: &str) -> Result<Vec<VocabularyRecord>> {
    let sql = format!("{} WHERE lesson_id = ? ORDER BY id", SELECT_VOCABULARY);
    Ok(sqlx::query_as::<_, VocabularyRecord>(&sql)
        .bind(lesson_id)
        .fetch_all(db.pool())
        .await?)
}

pub async fn get_vocabulary_by_id(db: &Database, id: &str) -> Result<Option<VocabularyRecord>> {
    let sql = format!("{} WHERE id = ?", SELECT_VOCABULARY);
    Ok(sqlx::query_as::<_, VocabularyRecord>(&sql)
        .bind(id)
        .fetch_optional(db.pool())
        .await?)
}

pub async fn get_favorite_vocabulary(db: &Database) -> Result<Vec<VocabularyRecord>> {
    let sql = format!("{} WHERE is_favorite = 1 ORDER BY word", SELECT_VOCABULARY);
    Ok(sqlx::query_as::<_, VocabularyRecord>(&sql)
        .fetch_all(db.pool())
        .await?)
}

/// Substring match on the word, its reading, or its meaning
///
/// `%` and `_` in the query match literally.
pub async fn search_vocabulary(db: &Database, query: &str) -> Result<Vec<VocabularyRecord>> {
    let pattern = format!("%{}%", escape_like(query));
    let sql = format!(
        r#"{} WHERE word LIKE ?1 ESCAPE '\' OR reading LIKE ?1 ESCAPE '\' OR meaning LIKE ?1 ESCAPE '\'
        ORDER BY word"#,
        SELECT_VOCABULARY
    );
    Ok(sqlx::query_as::<_, VocabularyRecord>(&sql)
        .bind(pattern)
        .fetch_all(db.pool())
        .await?)
}

fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Insert or replace a vocabulary row; the lesson must exist
pub async fn upsert_vocabulary(db: &Database, item: &VocabularyRecord) -> Result<()> {
    upsert_vocabulary_with(db.pool(), item).await?;
    db.notify(Table::Vocabulary);
    Ok(())
}

pub(crate) async fn upsert_vocabulary_with<'e, E>(executor: E, item: &VocabularyRecord) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO vocabulary (id, lesson_id, word, reading, meaning, example,
                                example_meaning, audio_url, is_favorite, times_reviewed)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            lesson_id = excluded.lesson_id,
            word = excluded.word,
            reading = excluded.reading,
            meaning = excluded.meaning,
            example = excluded.example,
            example_meaning = excluded.example_meaning,
            audio_url = excluded.audio_url,
            is_favorite = excluded.is_favorite,
            times_reviewed = excluded.times_reviewed
        "#,
    )
    .bind(&item.id)
    .bind(&item.lesson_id)
    .bind(&item.word)
    .bind(&item.reading)
    .bind(&item.meaning)
    .bind(&item.example)
    .bind(&item.example_meaning)
    .bind(&item.audio_url)
    .bind(item.is_favorite)
    .bind(item.times_reviewed)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn upsert_vocabulary_list(db: &Database, items: &[VocabularyRecord]) -> Result<()> {
    let mut tx = db.pool().begin().await?;
    for item in items {
        upsert_vocabulary_with(&mut *tx, item).await?;
    }
    tx.commit().await?;

    db.notify(Table::Vocabulary);
    Ok(())
}

pub async fn update_favorite_status(db: &Database, vocabulary_id: &str, is_favorite: bool) -> Result<()> {
    let result = sqlx::query("UPDATE vocabulary SET is_favorite = ? WHERE id = ?")
        .bind(is_favorite)
        .bind(vocabulary_id)
        .execute(db.pool())
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("vocabulary {}", vocabulary_id)));
    }

    db.notify(Table::Vocabulary);
    Ok(())
}

pub async fn increment_review_count(db: &Database, vocabulary_id: &str) -> Result<()> {
    let result = sqlx::query("UPDATE vocabulary SET times_reviewed = times_reviewed + 1 WHERE id = ?")
        .bind(vocabulary_id)
        .execute(db.pool())
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("vocabulary {}", vocabulary_id)));
    }

    db.notify(Table::Vocabulary);
    Ok(())
}
