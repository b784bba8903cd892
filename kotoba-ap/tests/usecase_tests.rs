//! Use case tests against an in-memory store

use futures::StreamExt;
use kotoba_ap::playback::{AudioController, PlaybackOptions, SimulatedPlayer};
use kotoba_ap::usecase::*;
use kotoba_ap::Error;
use kotoba_common::db::init_memory_database;
use kotoba_common::import::{import_content_pack, ContentPack};
use kotoba_common::models::{AudioTrack, CourseLevel, PlaybackSpeed, ProgressStatus, UserProfile};
use kotoba_common::repository::Repositories;
use std::sync::Arc;

const PACK: &str = r#"{
    "courses": [
        {"id": "inicial", "name": "Inicial", "name_japanese": "入門",
         "description": "", "level": "INICIAL", "total_lessons": 2, "is_unlocked": true}
    ],
    "lessons": [
        {"id": "inicial_1", "course_id": "inicial", "number": 1,
         "title": "Saludos", "title_japanese": "あいさつ", "description": "",
         "activities": [
            {"id": "inicial_1_audio", "lesson_id": "inicial_1", "type": "AUDICION",
             "title": "Escucha", "title_japanese": "聴解", "order": 0,
             "content": {"kind": "listening", "audio_url": "audio/1.mp3", "duration": 60000}},
            {"id": "inicial_1_read", "lesson_id": "inicial_1", "type": "LECTURA",
             "title": "Lee", "title_japanese": "読解", "order": 1,
             "content": {"kind": "reading", "text": "Hola", "text_japanese": "こんにちは"}}
         ]},
        {"id": "inicial_2", "course_id": "inicial", "number": 2,
         "title": "Números", "title_japanese": "数字", "description": ""}
    ],
    "vocabulary": [
        {"id": "v1", "lesson_id": "inicial_1", "word": "こんにちは",
         "reading": "konnichiwa", "meaning": "hola"}
    ]
}"#;

async fn seeded() -> Repositories {
    let db = init_memory_database().await.unwrap();
    import_content_pack(&db, &ContentPack::from_json(PACK).unwrap()).await.unwrap();
    Repositories::new(db)
}

#[tokio::test]
async fn test_course_queries() {
    let repos = seeded().await;

    let all = GetAllCourses::new(repos.courses.clone()).execute().await.unwrap();
    assert_eq!(all.len(), 1);
    let by_level = GetCoursesByLevel::new(repos.courses.clone())
        .execute(CourseLevel::Basico2)
        .await
        .unwrap();
    assert!(by_level.is_empty());
    let course = GetCourseById::new(repos.courses.clone()).execute("inicial").await.unwrap();
    assert_eq!(course.map(|c| c.total_lessons), Some(2));
}

#[tokio::test]
async fn test_lesson_queries() {
    let repos = seeded().await;

    let lessons = GetLessonsByCourse::new(repos.lessons.clone()).execute("inicial").await.unwrap();
    assert_eq!(lessons.iter().map(|l| l.number).collect::<Vec<_>>(), vec![1, 2]);

    let lesson = GetLessonById::new(repos.lessons.clone()).execute("inicial_1").await.unwrap().unwrap();
    assert_eq!(lesson.activities.len(), 2);

    let activities = GetActivitiesByLesson::new(repos.lessons.clone()).execute("inicial_1").await.unwrap();
    assert_eq!(activities[1].id, "inicial_1_read");
}

#[tokio::test]
async fn test_complete_activity_and_lesson() {
    let repos = seeded().await;

    let activity = CompleteActivity::new(repos.lessons.clone()).execute("inicial_1_audio").await.unwrap();
    assert!(activity.is_completed);
    let stored = repos.lessons.get_activity_by_id("inicial_1_audio").await.unwrap().unwrap();
    assert!(stored.is_completed);

    let lesson = CompleteLesson::new(repos.lessons.clone()).execute("inicial_2").await.unwrap();
    assert!(lesson.is_completed);
    let stored = repos.lessons.get_lesson_by_id("inicial_2").await.unwrap().unwrap();
    assert!(stored.is_completed);
    assert_eq!(stored.progress, 1.0);

    let missing = CompleteActivity::new(repos.lessons.clone()).execute("nope").await;
    assert!(matches!(missing, Err(Error::NotFound(_))));
}

/// **Given:** a lesson with two activities
/// **When:** each activity is completed in turn
/// **Then:** lesson progress and the course's completed lesson count follow
#[tokio::test]
async fn test_record_activity_completion_rolls_up() {
    let repos = seeded().await;
    let record = RecordActivityCompletion::new(repos.lessons.clone(), repos.courses.clone());

    let first = record.execute("inicial_1_audio").await.unwrap();
    assert_eq!(first.lesson_progress, 0.5);
    assert!(!first.lesson_completed);
    assert_eq!(first.course_completed_lessons, 0);
    assert_eq!(first.course_id, "inicial");

    let second = record.execute("inicial_1_read").await.unwrap();
    assert_eq!(second.lesson_progress, 1.0);
    assert!(second.lesson_completed);
    assert_eq!(second.course_completed_lessons, 1);

    let course = repos.courses.get_course_by_id("inicial").await.unwrap().unwrap();
    assert_eq!(course.completed_lessons, 1);
}

#[tokio::test]
async fn test_save_lesson_progress() {
    let repos = seeded().await;
    let save = SaveLessonProgress::new(repos.progress.clone());

    let started = save
        .execute("inicial", "inicial_1", None, 0, ProgressStatus::InProgress)
        .await
        .unwrap();
    assert_eq!(started.id, "inicial_inicial_1_main");
    assert!(started.completed_at.is_none());

    let done = save
        .execute("inicial", "inicial_1", Some("inicial_1_audio"), 90, ProgressStatus::Completed)
        .await
        .unwrap();
    assert_eq!(done.id, "inicial_inicial_1_inicial_1_audio");
    assert!(done.completed_at.is_some());

    let rows = GetCourseProgress::new(repos.progress.clone()).execute("inicial").await.unwrap();
    assert_eq!(rows.len(), 2);

    let too_high = save
        .execute("inicial", "inicial_1", None, 101, ProgressStatus::Completed)
        .await;
    assert!(matches!(too_high, Err(Error::Common(kotoba_common::Error::InvalidInput(_)))));
}

#[tokio::test]
async fn test_update_study_time_accumulates() {
    let repos = seeded().await;
    let saved = SaveLessonProgress::new(repos.progress.clone())
        .execute("inicial", "inicial_1", None, 0, ProgressStatus::InProgress)
        .await
        .unwrap();

    let update = UpdateStudyTime::new(repos.progress.clone());
    let once = update.execute(&saved, 90).await.unwrap();
    let twice = update.execute(&once, 30).await.unwrap();
    assert_eq!(twice.time_spent_seconds, 120);
    assert!(twice.last_accessed_at >= saved.last_accessed_at);

    // Saving again keeps the accumulated time
    let resaved = SaveLessonProgress::new(repos.progress.clone())
        .execute("inicial", "inicial_1", None, 100, ProgressStatus::Completed)
        .await
        .unwrap();
    assert_eq!(resaved.time_spent_seconds, 120);

    let stats = GetUserStats::new(repos.progress.clone()).execute().await.unwrap();
    assert_eq!(stats.total_lessons_completed, 1);
    assert_eq!(stats.total_time_spent_minutes, 2);
}

#[tokio::test]
async fn test_reset_course_progress() {
    let repos = seeded().await;
    RecordActivityCompletion::new(repos.lessons.clone(), repos.courses.clone())
        .execute("inicial_1_audio")
        .await
        .unwrap();
    SaveLessonProgress::new(repos.progress.clone())
        .execute("inicial", "inicial_1", Some("inicial_1_audio"), 80, ProgressStatus::Completed)
        .await
        .unwrap();

    let removed = ResetCourseProgress::new(repos.progress.clone()).execute("inicial").await.unwrap();
    assert_eq!(removed, 1);

    let lesson = repos.lessons.get_lesson_by_id("inicial_1").await.unwrap().unwrap();
    assert_eq!(lesson.progress, 0.0);
    let stats = GetUserStats::new(repos.progress.clone()).execute().await.unwrap();
    assert_eq!(stats.total_activities_completed, 0);
}

#[tokio::test]
async fn test_vocabulary_use_cases() {
    let repos = seeded().await;

    let toggle = ToggleFavorite::new(repos.vocabulary.clone());
    assert!(toggle.execute("v1").await.unwrap());
    let favorites = GetFavoriteVocabulary::new(repos.vocabulary.clone()).execute().await.unwrap();
    assert_eq!(favorites.len(), 1);
    assert!(!toggle.execute("v1").await.unwrap());

    MarkVocabularyReviewed::new(repos.vocabulary.clone()).execute("v1").await.unwrap();
    let lesson_words = GetVocabularyByLesson::new(repos.vocabulary.clone())
        .execute("inicial_1")
        .await
        .unwrap();
    assert_eq!(lesson_words[0].times_reviewed, 1);

    let search = SearchVocabulary::new(repos.vocabulary.clone());
    assert_eq!(search.execute("konni").await.unwrap().len(), 1);
    assert!(matches!(search.execute("   ").await, Err(Error::BadRequest(_))));
    assert!(matches!(toggle.execute("missing").await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_profile_use_cases() {
    let repos = seeded().await;
    assert!(GetUserProfile::new(repos.users.clone()).execute().await.unwrap().is_none());

    let profile = UserProfile::new("learner");
    SaveUserProfile::new(repos.users.clone()).execute(&profile).await.unwrap();

    let loaded = GetUserProfile::new(repos.users.clone()).execute().await.unwrap().unwrap();
    assert_eq!(loaded.id, "learner");
    assert_eq!(loaded.preferred_language, "es");
}

#[tokio::test]
async fn test_audio_use_cases_drive_controller() {
    let controller = Arc::new(
        AudioController::new(PlaybackOptions::default(), SimulatedPlayer::manual).unwrap(),
    );
    let mut states = ObserveAudioState::new(controller.clone()).execute();
    assert!(states.next().await.unwrap().is_idle());

    let track = AudioTrack::new("inicial_1_audio", "audio/1.mp3", "Escucha").with_duration(60_000);
    PlayAudio::new(controller.clone()).execute(track);
    assert_eq!(controller.state().current_track_id.as_deref(), Some("inicial_1_audio"));

    SetPlaybackSpeed::new(controller.clone()).execute(PlaybackSpeed::Faster);
    SetVolume::new(controller.clone()).execute(0.5);
    SeekAudio::new(controller.clone()).execute(10_000);
    let state = controller.state();
    assert_eq!(state.playback_speed, 1.5);
    assert_eq!(state.volume, 0.5);
    assert_eq!(state.current_position, 10_000);

    PauseAudio::new(controller.clone()).execute();
    assert!(controller.state().is_paused);
    ResumeAudio::new(controller.clone()).execute();
    assert!(!controller.state().is_paused);

    StopAudio::new(controller.clone()).execute();
    assert!(controller.state().is_idle());
}
