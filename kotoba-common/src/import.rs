//! Content pack import
//!
//! A content pack is a JSON document listing courses, lessons (each with its
//! activities inline) and vocabulary. Import is all-or-nothing: every row is
//! written inside one transaction and observers are notified after commit.

use crate::db::{
    activities, courses, lessons, vocabulary, ActivityRecord, CourseRecord, Database,
    LessonRecord, Table, VocabularyRecord,
};
use crate::models::{Course, Lesson, VocabularyEntry};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Importable course content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentPack {
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub vocabulary: Vec<VocabularyEntry>,
}

/// Row counts written by an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub courses: usize,
    pub lessons: usize,
    pub activities: usize,
    pub vocabulary: usize,
}

impl ContentPack {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub async fn from_file(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    /// Convert every item to its stored form, rejecting inconsistent content
    fn to_records(
        &self,
    ) -> Result<(
        Vec<CourseRecord>,
        Vec<LessonRecord>,
        Vec<ActivityRecord>,
        Vec<VocabularyRecord>,
    )> {
        let course_records: Vec<CourseRecord> = self.courses.iter().map(CourseRecord::from).collect();

        let mut lesson_records = Vec::with_capacity(self.lessons.len());
        let mut activity_records = Vec::new();
        for lesson in &self.lessons {
            lesson_records.push(LessonRecord::try_from(lesson)?);
            for activity in &lesson.activities {
                if activity.lesson_id != lesson.id {
                    return Err(Error::InvalidInput(format!(
                        "Activity {} is listed under lesson {} but belongs to {}",
                        activity.id, lesson.id, activity.lesson_id
                    )));
                }
                activity_records.push(ActivityRecord::try_from(activity)?);
            }
        }

        let vocabulary_records: Vec<VocabularyRecord> =
            self.vocabulary.iter().map(VocabularyRecord::from).collect();

        Ok((course_records, lesson_records, activity_records, vocabulary_records))
    }
}

/// Write a content pack to the store in one transaction
///
/// Existing rows with the same ids are updated in place. Any failure
/// (a dangling foreign key, bad activity content) rolls the whole pack back.
pub async fn import_content_pack(db: &Database, pack: &ContentPack) -> Result<ImportSummary> {
    let (course_records, lesson_records, activity_records, vocabulary_records) = pack.to_records()?;

    let mut tx = db.pool().begin().await?;
    for course in &course_records {
        courses::upsert_course_with(&mut *tx, course).await?;
    }
    for lesson in &lesson_records {
        lessons::upsert_lesson_with(&mut *tx, lesson).await?;
    }
    for activity in &activity_records {
        activities::upsert_activity_with(&mut *tx, activity).await?;
    }
    for item in &vocabulary_records {
        vocabulary::upsert_vocabulary_with(&mut *tx, item).await?;
    }
    tx.commit().await?;

    for table in [Table::Courses, Table::Lessons, Table::Activities, Table::Vocabulary] {
        db.notify(table);
    }

    let summary = ImportSummary {
        courses: course_records.len(),
        lessons: lesson_records.len(),
        activities: activity_records.len(),
        vocabulary: vocabulary_records.len(),
    };
    info!(
        "Imported {} courses, {} lessons, {} activities, {} vocabulary items",
        summary.courses, summary.lessons, summary.activities, summary.vocabulary
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACK: &str = r#"{
        "courses": [
            {"id": "inicial", "name": "Inicial", "name_japanese": "入門",
             "description": "Primeros pasos", "level": "INICIAL", "is_unlocked": true}
        ],
        "lessons": [
            {"id": "inicial_1", "course_id": "inicial", "number": 1,
             "title": "Saludos", "title_japanese": "あいさつ", "description": "",
             "activities": [
                {"id": "inicial_1_audio", "lesson_id": "inicial_1", "type": "AUDICION",
                 "title": "Escucha", "title_japanese": "聴解", "order": 0,
                 "content": {"kind": "listening", "audio_url": "audio/1.mp3", "duration": 60000}}
             ]}
        ],
        "vocabulary": [
            {"id": "v1", "lesson_id": "inicial_1", "word": "こんにちは",
             "reading": "konnichiwa", "meaning": "hola"}
        ]
    }"#;

    #[test]
    fn test_parse_pack_applies_defaults() {
        let pack = ContentPack::from_json(PACK).unwrap();
        assert_eq!(pack.courses[0].total_lessons, crate::models::course::DEFAULT_LESSONS_PER_COURSE);
        assert_eq!(pack.lessons[0].activities.len(), 1);
        assert!(!pack.vocabulary[0].is_favorite);
    }

    #[test]
    fn test_activity_under_wrong_lesson_rejected() {
        let mut pack = ContentPack::from_json(PACK).unwrap();
        pack.lessons[0].activities[0].lesson_id = "inicial_2".to_string();
        assert!(matches!(pack.to_records(), Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_import_into_memory_database() {
        let db = crate::db::init_memory_database().await.unwrap();
        let pack = ContentPack::from_json(PACK).unwrap();

        let summary = import_content_pack(&db, &pack).await.unwrap();
        assert_eq!(
            summary,
            ImportSummary { courses: 1, lessons: 1, activities: 1, vocabulary: 1 }
        );

        // Re-import updates in place
        let again = import_content_pack(&db, &pack).await.unwrap();
        assert_eq!(again, summary);
        assert_eq!(activities::count_activities(&db, "inicial_1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_import_with_dangling_lesson_rolls_back() {
        let db = crate::db::init_memory_database().await.unwrap();
        let mut pack = ContentPack::from_json(PACK).unwrap();
        pack.lessons[0].course_id = "missing".to_string();

        assert!(import_content_pack(&db, &pack).await.is_err());
        assert!(courses::get_all_courses(&db).await.unwrap().is_empty());
    }
}
