//! Domain models
//!
//! Plain data types shared by the repositories, the use cases and the
//! playback component. Stored records live in [`crate::db::records`];
//! conversions between the two live in [`crate::mapper`].

pub mod audio;
pub mod course;
pub mod lesson;
pub mod progress;

pub use audio::{AudioError, AudioState, AudioTrack, PlaybackSpeed};
pub use course::{Course, CourseLevel};
pub use lesson::{
    Activity, ActivityContent, ActivityType, Dialogue, Lesson, Question, QuestionType,
    VocabularyEntry, VocabularyItem,
};
pub use progress::{ProgressStatus, UserProfile, UserProgress, UserStats};
