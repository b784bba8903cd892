//! Vocabulary use cases

use crate::{Error, Result};
use kotoba_common::models::VocabularyEntry;
use kotoba_common::repository::VocabularyRepository;

pub struct GetVocabularyByLesson {
    repository: VocabularyRepository,
}

impl GetVocabularyByLesson {
    pub fn new(repository: VocabularyRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, lesson_id: &str) -> Result<Vec<VocabularyEntry>> {
        Ok(self.repository.get_vocabulary_by_lesson(lesson_id).await?)
    }
}

pub struct GetFavoriteVocabulary {
    repository: VocabularyRepository,
}

impl GetFavoriteVocabulary {
    pub fn new(repository: VocabularyRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> Result<Vec<VocabularyEntry>> {
        Ok(self.repository.get_favorites().await?)
    }
}

/// Match a query against word, reading and meaning
pub struct SearchVocabulary {
    repository: VocabularyRepository,
}

impl SearchVocabulary {
    pub fn new(repository: VocabularyRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, query: &str) -> Result<Vec<VocabularyEntry>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::BadRequest("Search query is empty".to_string()));
        }
        Ok(self.repository.search(query).await?)
    }
}

/// Flip an entry's favorite flag; returns the new value
pub struct ToggleFavorite {
    repository: VocabularyRepository,
}

impl ToggleFavorite {
    pub fn new(repository: VocabularyRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, vocabulary_id: &str) -> Result<bool> {
        let entry = self
            .repository
            .get_entry(vocabulary_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("vocabulary {}", vocabulary_id)))?;

        let is_favorite = !entry.is_favorite;
        self.repository.set_favorite(vocabulary_id, is_favorite).await?;
        Ok(is_favorite)
    }
}

pub struct MarkVocabularyReviewed {
    repository: VocabularyRepository,
}

impl MarkVocabularyReviewed {
    pub fn new(repository: VocabularyRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, vocabulary_id: &str) -> Result<()> {
        Ok(self.repository.mark_reviewed(vocabulary_id).await?)
    }
}
