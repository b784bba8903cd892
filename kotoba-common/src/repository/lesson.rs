//! Lesson and activity repository

use crate::db::{activities, lessons, ActivityRecord, Database, LessonRecord, Table};
use crate::mapper::map_all;
use crate::models::{Activity, Lesson};
use crate::Result;
use futures::stream::BoxStream;

#[derive(Debug, Clone)]
pub struct LessonRepository {
    db: Database,
}

impl LessonRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn get_lessons_by_course(&self, course_id: &str) -> Result<Vec<Lesson>> {
        map_all(lessons::get_lessons_by_course(&self.db, course_id).await?)
    }

    pub fn observe_lessons_by_course(&self, course_id: &str) -> BoxStream<'static, Result<Vec<Lesson>>> {
        let course_id = course_id.to_string();
        self.db.observe(&[Table::Lessons], move |db| {
            let course_id = course_id.clone();
            async move { map_all::<_, Lesson>(lessons::get_lessons_by_course(&db, &course_id).await?) }
        })
    }

    pub async fn get_lesson_by_id(&self, id: &str) -> Result<Option<Lesson>> {
        lessons::get_lesson_by_id(&self.db, id)
            .await?
            .map(Lesson::try_from)
            .transpose()
    }

    pub fn observe_lesson_by_id(&self, id: &str) -> BoxStream<'static, Result<Option<Lesson>>> {
        let id = id.to_string();
        self.db.observe(&[Table::Lessons], move |db| {
            let id = id.clone();
            async move {
                lessons::get_lesson_by_id(&db, &id)
                    .await?
                    .map(Lesson::try_from)
                    .transpose()
            }
        })
    }

    /// Lesson with its activities attached, in activity order
    pub async fn get_lesson_with_activities(&self, id: &str) -> Result<Option<Lesson>> {
        let Some(mut lesson) = self.get_lesson_by_id(id).await? else {
            return Ok(None);
        };
        lesson.activities = self.get_activities_by_lesson(id).await?;
        Ok(Some(lesson))
    }

    pub async fn get_activities_by_lesson(&self, lesson_id: &str) -> Result<Vec<Activity>> {
        map_all(activities::get_activities_by_lesson(&self.db, lesson_id).await?)
    }

    pub fn observe_activities_by_lesson(&self, lesson_id: &str) -> BoxStream<'static, Result<Vec<Activity>>> {
        let lesson_id = lesson_id.to_string();
        self.db.observe(&[Table::Activities], move |db| {
            let lesson_id = lesson_id.clone();
            async move {
                map_all::<_, Activity>(activities::get_activities_by_lesson(&db, &lesson_id).await?)
            }
        })
    }

    pub async fn get_activity_by_id(&self, id: &str) -> Result<Option<Activity>> {
        activities::get_activity_by_id(&self.db, id)
            .await?
            .map(Activity::try_from)
            .transpose()
    }

    pub fn observe_activity_by_id(&self, id: &str) -> BoxStream<'static, Result<Option<Activity>>> {
        let id = id.to_string();
        self.db.observe(&[Table::Activities], move |db| {
            let id = id.clone();
            async move {
                activities::get_activity_by_id(&db, &id)
                    .await?
                    .map(Activity::try_from)
                    .transpose()
            }
        })
    }

    /// (completed, total) activities for a lesson
    pub async fn activity_completion(&self, lesson_id: &str) -> Result<(u32, u32)> {
        let completed = activities::count_completed_activities(&self.db, lesson_id).await?;
        let total = activities::count_activities(&self.db, lesson_id).await?;
        Ok((
            u32::try_from(completed).unwrap_or(0),
            u32::try_from(total).unwrap_or(0),
        ))
    }

    pub async fn save_lesson(&self, lesson: &Lesson) -> Result<()> {
        lessons::upsert_lesson(&self.db, &LessonRecord::try_from(lesson)?).await
    }

    pub async fn update_lesson(&self, lesson: &Lesson) -> Result<()> {
        lessons::update_lesson(&self.db, &LessonRecord::try_from(lesson)?).await
    }

    pub async fn update_lesson_progress(&self, lesson_id: &str, is_completed: bool, progress: f32) -> Result<()> {
        lessons::update_lesson_progress(&self.db, lesson_id, is_completed, f64::from(progress)).await
    }

    pub async fn unlock_lesson(&self, lesson_id: &str) -> Result<()> {
        lessons::set_lesson_unlocked(&self.db, lesson_id, true).await
    }

    pub async fn save_activity(&self, activity: &Activity) -> Result<()> {
        activities::upsert_activity(&self.db, &ActivityRecord::try_from(activity)?).await
    }

    pub async fn update_activity(&self, activity: &Activity) -> Result<()> {
        activities::update_activity(&self.db, &ActivityRecord::try_from(activity)?).await
    }

    pub async fn set_activity_completed(&self, activity_id: &str, is_completed: bool) -> Result<()> {
        activities::update_activity_completion(&self.db, activity_id, is_completed).await
    }
}
