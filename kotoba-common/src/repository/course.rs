//! Course repository

use crate::db::{courses, lessons, CourseRecord, Database, Table};
use crate::mapper::map_all;
use crate::models::{Course, CourseLevel};
use crate::Result;
use futures::stream::BoxStream;

#[derive(Debug, Clone)]
pub struct CourseRepository {
    db: Database,
}

impl CourseRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn get_all_courses(&self) -> Result<Vec<Course>> {
        map_all(courses::get_all_courses(&self.db).await?)
    }

    pub fn observe_all_courses(&self) -> BoxStream<'static, Result<Vec<Course>>> {
        self.db.observe(&[Table::Courses], |db| async move {
            map_all::<_, Course>(courses::get_all_courses(&db).await?)
        })
    }

    pub async fn get_course_by_id(&self, id: &str) -> Result<Option<Course>> {
        courses::get_course_by_id(&self.db, id)
            .await?
            .map(Course::try_from)
            .transpose()
    }

    pub fn observe_course_by_id(&self, id: &str) -> BoxStream<'static, Result<Option<Course>>> {
        let id = id.to_string();
        self.db.observe(&[Table::Courses], move |db| {
            let id = id.clone();
            async move {
                courses::get_course_by_id(&db, &id)
                    .await?
                    .map(Course::try_from)
                    .transpose()
            }
        })
    }

    pub async fn get_courses_by_level(&self, level: CourseLevel) -> Result<Vec<Course>> {
        map_all(courses::get_courses_by_level(&self.db, level.to_db_string()).await?)
    }

    pub fn observe_courses_by_level(&self, level: CourseLevel) -> BoxStream<'static, Result<Vec<Course>>> {
        self.db.observe(&[Table::Courses], move |db| async move {
            map_all::<_, Course>(courses::get_courses_by_level(&db, level.to_db_string()).await?)
        })
    }

    pub async fn save_course(&self, course: &Course) -> Result<()> {
        courses::upsert_course(&self.db, &CourseRecord::from(course)).await
    }

    pub async fn update_course(&self, course: &Course) -> Result<()> {
        courses::update_course(&self.db, &CourseRecord::from(course)).await
    }

    /// Recount completed lessons and store the count on the course
    pub async fn refresh_completed_lessons(&self, course_id: &str) -> Result<u32> {
        let completed = lessons::count_completed_lessons(&self.db, course_id).await?;
        courses::set_completed_lessons(&self.db, course_id, completed).await?;
        Ok(u32::try_from(completed).unwrap_or(u32::MAX))
    }

    pub async fn unlock_course(&self, course_id: &str) -> Result<()> {
        courses::set_course_unlocked(&self.db, course_id, true).await
    }

    /// Delete a course with its lessons, activities, vocabulary and progress
    pub async fn delete_course(&self, course_id: &str) -> Result<bool> {
        courses::delete_course(&self.db, course_id).await
    }
}
