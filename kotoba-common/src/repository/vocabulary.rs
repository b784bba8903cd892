//! Vocabulary repository

use crate::db::{vocabulary, Database, Table, VocabularyRecord};
use crate::mapper::map_all;
use crate::models::VocabularyEntry;
use crate::Result;
use futures::stream::BoxStream;

#[derive(Debug, Clone)]
pub struct VocabularyRepository {
    db: Database,
}

impl VocabularyRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn get_vocabulary_by_lesson(&self, lesson_id: &str) -> Result<Vec<VocabularyEntry>> {
        map_all(vocabulary::get_vocabulary_by_lesson(&self.db, lesson_id).await?)
    }

    pub fn observe_vocabulary_by_lesson(&self, lesson_id: &str) -> BoxStream<'static, Result<Vec<VocabularyEntry>>> {
        let lesson_id = lesson_id.to_string();
        self.db.observe(&[Table::Vocabulary], move |db| {
            let lesson_id = lesson_id.clone();
            async move {
                map_all::<_, VocabularyEntry>(vocabulary::get_vocabulary_by_lesson(&db, &lesson_id).await?)
            }
        })
    }

    pub async fn get_entry(&self, id: &str) -> Result<Option<VocabularyEntry>> {
        vocabulary::get_vocabulary_by_id(&self.db, id)
            .await?
            .map(VocabularyEntry::try_from)
            .transpose()
    }

    pub async fn get_favorites(&self) -> Result<Vec<VocabularyEntry>> {
        map_all(vocabulary::get_favorite_vocabulary(&self.db).await?)
    }

    pub fn observe_favorites(&self) -> BoxStream<'static, Result<Vec<VocabularyEntry>>> {
        self.db.observe(&[Table::Vocabulary], |db| async move {
            map_all::<_, VocabularyEntry>(vocabulary::get_favorite_vocabulary(&db).await?)
        })
    }

    pub async fn search(&self, query: &str) -> Result<Vec<VocabularyEntry>> {
        map_all(vocabulary::search_vocabulary(&self.db, query).await?)
    }

    pub async fn save_entry(&self, entry: &VocabularyEntry) -> Result<()> {
        vocabulary::upsert_vocabulary(&self.db, &VocabularyRecord::from(entry)).await
    }

    pub async fn save_entries(&self, entries: &[VocabularyEntry]) -> Result<()> {
        let records: Vec<VocabularyRecord> = entries.iter().map(VocabularyRecord::from).collect();
        vocabulary::upsert_vocabulary_list(&self.db, &records).await
    }

    pub async fn set_favorite(&self, id: &str, is_favorite: bool) -> Result<()> {
        vocabulary::update_favorite_status(&self.db, id, is_favorite).await
    }

    pub async fn mark_reviewed(&self, id: &str) -> Result<()> {
        vocabulary::increment_review_count(&self.db, id).await
    }
}
