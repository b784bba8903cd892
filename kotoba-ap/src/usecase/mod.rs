//! Use cases
//!
//! One struct per user intent. Each is a thin call into a repository or
//! the audio controller; the command-line front end composes them.

pub mod audio;
pub mod course;
pub mod lesson;
pub mod progress;
pub mod user;
pub mod vocabulary;

pub use audio::{
    ObserveAudioState, PauseAudio, PlayAudio, ResumeAudio, SeekAudio, SetPlaybackSpeed, SetVolume,
    StopAudio,
};
pub use course::{GetAllCourses, GetCourseById, GetCoursesByLevel};
pub use lesson::{
    CompleteActivity, CompleteLesson, CompletionOutcome, GetActivitiesByLesson, GetLessonById,
    GetLessonsByCourse, RecordActivityCompletion,
};
pub use progress::{GetCourseProgress, GetUserStats, ResetCourseProgress, SaveLessonProgress, UpdateStudyTime};
pub use user::{GetUserProfile, SaveUserProfile};
pub use vocabulary::{
    GetFavoriteVocabulary, GetVocabularyByLesson, MarkVocabularyReviewed, SearchVocabulary,
    ToggleFavorite,
};
