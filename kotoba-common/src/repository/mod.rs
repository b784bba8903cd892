//! Repositories
//!
//! Domain-typed façades over the persisted store. Each repository offers
//! one-shot reads (`get_*`), reactive reads (`observe_*`, a stream that
//! yields the current value and again after every relevant write), and
//! mutations that take domain models.

pub mod course;
pub mod lesson;
pub mod progress;
pub mod user;
pub mod vocabulary;

pub use course::CourseRepository;
pub use lesson::LessonRepository;
pub use progress::ProgressRepository;
pub use user::UserRepository;
pub use vocabulary::VocabularyRepository;

use crate::db::Database;

/// All repositories over one database
#[derive(Debug, Clone)]
pub struct Repositories {
    pub courses: CourseRepository,
    pub lessons: LessonRepository,
    pub progress: ProgressRepository,
    pub users: UserRepository,
    pub vocabulary: VocabularyRepository,
}

impl Repositories {
    pub fn new(db: Database) -> Self {
        Self {
            courses: CourseRepository::new(db.clone()),
            lessons: LessonRepository::new(db.clone()),
            progress: ProgressRepository::new(db.clone()),
            users: UserRepository::new(db.clone()),
            vocabulary: VocabularyRepository::new(db),
        }
    }
}
