//! Course use cases

use crate::Result;
use futures::stream::BoxStream;
use kotoba_common::models::{Course, CourseLevel};
use kotoba_common::repository::CourseRepository;

pub struct GetAllCourses {
    repository: CourseRepository,
}

impl GetAllCourses {
    pub fn new(repository: CourseRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> Result<Vec<Course>> {
        Ok(self.repository.get_all_courses().await?)
    }

    pub fn observe(&self) -> BoxStream<'static, kotoba_common::Result<Vec<Course>>> {
        self.repository.observe_all_courses()
    }
}

pub struct GetCourseById {
    repository: CourseRepository,
}

impl GetCourseById {
    pub fn new(repository: CourseRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, course_id: &str) -> Result<Option<Course>> {
        Ok(self.repository.get_course_by_id(course_id).await?)
    }
}

pub struct GetCoursesByLevel {
    repository: CourseRepository,
}

impl GetCoursesByLevel {
    pub fn new(repository: CourseRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, level: CourseLevel) -> Result<Vec<Course>> {
        Ok(self.repository.get_courses_by_level(level).await?)
    }
}
