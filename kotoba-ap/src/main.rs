//! Kotoba Audio Player (kotoba-ap) - command-line front end
//!
//! Imports course content, reports and records progress, browses
//! vocabulary, and plays lesson audio through the simulated player.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use kotoba_ap::config::Config;
use kotoba_ap::playback::{AudioController, AutoOptions, SimulatedPlayer};
use kotoba_ap::usecase::{
    GetActivitiesByLesson, GetAllCourses, GetCoursesByLevel, GetFavoriteVocabulary,
    GetLessonsByCourse, GetUserStats, MarkVocabularyReviewed, PlayAudio, RecordActivityCompletion,
    ResetCourseProgress, SaveLessonProgress, SearchVocabulary, SeekAudio, SetPlaybackSpeed,
    StopAudio, ToggleFavorite,
};
use kotoba_common::config::TomlConfig;
use kotoba_common::db::{init_database, Database};
use kotoba_common::import::{import_content_pack, ContentPack};
use kotoba_common::models::{AudioState, AudioTrack, CourseLevel, PlaybackSpeed, ProgressStatus};
use kotoba_common::repository::Repositories;
use tokio::signal;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for kotoba-ap
#[derive(Parser, Debug)]
#[command(name = "kotoba-ap")]
#[command(about = "Japanese course player and progress tracker")]
#[command(version)]
struct Args {
    /// Root folder holding the database
    #[arg(short, long, env = "KOTOBA_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Database file (defaults to <root-folder>/kotoba.db)
    #[arg(short, long, env = "KOTOBA_DATABASE")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a JSON content pack
    Import { pack: PathBuf },

    /// List courses
    Courses {
        /// INICIAL, BASICO_1 or BASICO_2
        #[arg(short, long, value_parser = parse_level)]
        level: Option<CourseLevel>,
    },

    /// List the lessons of a course
    Lessons { course_id: String },

    /// List the activities of a lesson
    Activities { lesson_id: String },

    /// Record an activity as completed
    Complete {
        activity_id: String,
        /// Score out of 100
        #[arg(short, long, default_value = "100")]
        score: u32,
    },

    /// Show learner statistics
    Stats,

    /// Reset all progress in a course
    Reset { course_id: String },

    /// Browse and review vocabulary
    Vocab {
        #[command(subcommand)]
        command: VocabCommand,
    },

    /// Play an audio file through the simulated player
    Play {
        url: String,
        #[arg(short, long, default_value = "Audio")]
        title: String,
        /// Media duration in milliseconds
        #[arg(short, long, default_value = "30000")]
        duration: u64,
        /// 0.75, 1.0, 1.25 or 1.5
        #[arg(long, value_parser = parse_speed)]
        speed: Option<PlaybackSpeed>,
        /// Start position in milliseconds
        #[arg(long)]
        seek: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
enum VocabCommand {
    /// Search word, reading and meaning
    Search { query: String },
    /// List favorites
    Favorites,
    /// Toggle an entry's favorite flag
    Favorite { id: String },
    /// Count a review of an entry
    Review { id: String },
}

fn parse_level(s: &str) -> std::result::Result<CourseLevel, String> {
    CourseLevel::from_db_string(&s.to_uppercase())
        .ok_or_else(|| format!("unknown level '{}' (INICIAL, BASICO_1, BASICO_2)", s))
}

fn parse_speed(s: &str) -> std::result::Result<PlaybackSpeed, String> {
    let value: f32 = s.parse().map_err(|e| format!("{}", e))?;
    PlaybackSpeed::from_value(value).ok_or_else(|| format!("unsupported speed {} (0.75, 1.0, 1.25, 1.5)", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let toml_config = TomlConfig::load_or_default();

    // Initialize tracing
    let default_filter = format!(
        "kotoba_ap={level},kotoba_common={level}",
        level = toml_config.logging.level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("{}", kotoba_ap::build_info());

    let config = Config::resolve(args.root_folder.as_deref(), args.database.as_deref(), &toml_config)
        .context("Failed to resolve configuration")?;
    debug!("Configuration: {:?}", config);

    match args.command {
        Command::Play { url, title, duration, speed, seek } => {
            play(&config, url, title, duration, speed, seek).await?;
        }
        Command::Import { pack } => {
            let db = open_database(&config).await?;
            let content = ContentPack::from_file(&pack)
                .await
                .with_context(|| format!("Failed to read content pack {}", pack.display()))?;
            let summary = import_content_pack(&db, &content).await.context("Import failed")?;
            println!(
                "Imported {} courses, {} lessons, {} activities, {} vocabulary items",
                summary.courses, summary.lessons, summary.activities, summary.vocabulary
            );
        }
        Command::Courses { level } => {
            let repos = Repositories::new(open_database(&config).await?);
            let courses = match level {
                Some(level) => GetCoursesByLevel::new(repos.courses.clone()).execute(level).await?,
                None => GetAllCourses::new(repos.courses.clone()).execute().await?,
            };
            for course in courses {
                let lock = if course.is_unlocked { " " } else { "🔒" };
                println!(
                    "{} {:<12} {:<10} {} / {}  {}/{} lessons",
                    lock,
                    course.id,
                    course.level.to_string(),
                    course.name,
                    course.name_japanese,
                    course.completed_lessons,
                    course.total_lessons
                );
            }
        }
        Command::Lessons { course_id } => {
            let repos = Repositories::new(open_database(&config).await?);
            for lesson in GetLessonsByCourse::new(repos.lessons.clone()).execute(&course_id).await? {
                let mark = if lesson.is_completed { "✓" } else { " " };
                println!(
                    "{} {:>2}. {:<16} {} / {}  {:.0}%",
                    mark,
                    lesson.number,
                    lesson.id,
                    lesson.title,
                    lesson.title_japanese,
                    lesson.progress * 100.0
                );
            }
        }
        Command::Activities { lesson_id } => {
            let repos = Repositories::new(open_database(&config).await?);
            for activity in GetActivitiesByLesson::new(repos.lessons.clone()).execute(&lesson_id).await? {
                let mark = if activity.is_completed { "✓" } else { " " };
                let audio = activity.audio_track().map(|t| format!("  ♪ {}", t.url)).unwrap_or_default();
                println!(
                    "{} {:<20} {:<13} {} / {}{}",
                    mark, activity.id, activity.activity_type.to_string(), activity.title, activity.title_japanese, audio
                );
            }
        }
        Command::Complete { activity_id, score } => {
            let repos = Repositories::new(open_database(&config).await?);
            let outcome = RecordActivityCompletion::new(repos.lessons.clone(), repos.courses.clone())
                .execute(&activity_id)
                .await?;
            SaveLessonProgress::new(repos.progress.clone())
                .execute(
                    &outcome.course_id,
                    &outcome.activity.lesson_id,
                    Some(&outcome.activity.id),
                    score,
                    ProgressStatus::Completed,
                )
                .await?;
            if outcome.lesson_completed {
                SaveLessonProgress::new(repos.progress.clone())
                    .execute(&outcome.course_id, &outcome.activity.lesson_id, None, score, ProgressStatus::Completed)
                    .await?;
            }
            println!(
                "Completed {}: lesson {:.0}%{}, {} lessons completed in {}",
                outcome.activity.id,
                outcome.lesson_progress * 100.0,
                if outcome.lesson_completed { " (lesson complete)" } else { "" },
                outcome.course_completed_lessons,
                outcome.course_id
            );
        }
        Command::Stats => {
            let repos = Repositories::new(open_database(&config).await?);
            let stats = GetUserStats::new(repos.progress.clone()).execute().await?;
            println!("Lessons completed:    {}", stats.total_lessons_completed);
            println!("Activities completed: {}", stats.total_activities_completed);
            println!("Study time:           {} min", stats.total_time_spent_minutes);
            println!("Average score:        {:.1}", stats.average_score);
            println!("Current streak:       {} days", stats.current_streak);
            println!("Longest streak:       {} days", stats.longest_streak);
            if let Some(last) = stats.last_study_date {
                println!("Last study:           {}", last.format("%Y-%m-%d %H:%M"));
            }
        }
        Command::Reset { course_id } => {
            let repos = Repositories::new(open_database(&config).await?);
            let removed = ResetCourseProgress::new(repos.progress.clone()).execute(&course_id).await?;
            println!("Reset {}: {} progress records removed", course_id, removed);
        }
        Command::Vocab { command } => {
            let repos = Repositories::new(open_database(&config).await?);
            vocab(&repos, command).await?;
        }
    }

    Ok(())
}

async fn open_database(config: &Config) -> Result<Database> {
    init_database(&config.db_path)
        .await
        .with_context(|| format!("Failed to open database {}", config.db_path.display()))
}

async fn vocab(repos: &Repositories, command: VocabCommand) -> Result<()> {
    let entries = match command {
        VocabCommand::Search { query } => SearchVocabulary::new(repos.vocabulary.clone()).execute(&query).await?,
        VocabCommand::Favorites => GetFavoriteVocabulary::new(repos.vocabulary.clone()).execute().await?,
        VocabCommand::Favorite { id } => {
            let favorite = ToggleFavorite::new(repos.vocabulary.clone()).execute(&id).await?;
            println!("{} {}", id, if favorite { "added to favorites" } else { "removed from favorites" });
            return Ok(());
        }
        VocabCommand::Review { id } => {
            MarkVocabularyReviewed::new(repos.vocabulary.clone()).execute(&id).await?;
            println!("{} reviewed", id);
            return Ok(());
        }
    };

    for entry in entries {
        let star = if entry.is_favorite { "★" } else { " " };
        println!(
            "{} {:<8} {} ({}) - {}",
            star, entry.id, entry.item.word, entry.item.reading, entry.item.meaning
        );
    }
    Ok(())
}

/// Play through the simulated player, printing transitions until the end
async fn play(
    config: &Config,
    url: String,
    title: String,
    duration: u64,
    speed: Option<PlaybackSpeed>,
    seek: Option<u64>,
) -> Result<()> {
    let options = AutoOptions {
        media_duration_ms: Some(duration),
        ..AutoOptions::default()
    };
    let controller = Arc::new(
        AudioController::new(config.playback, |events| SimulatedPlayer::auto(events, options))
            .context("Failed to initialize audio controller")?,
    );

    let mut states = controller.subscribe();
    let track = AudioTrack::new(uuid::Uuid::new_v4().to_string(), url, title).with_duration(duration);
    PlayAudio::new(controller.clone()).execute(track);
    if let Some(speed) = speed {
        SetPlaybackSpeed::new(controller.clone()).execute(speed);
    }

    let mut seek = seek;
    let mut last_second = None;
    let mut previous = AudioState::default();

    loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, stopping playback");
                StopAudio::new(controller.clone()).execute();
                break;
            }
        }

        let state = states.borrow_and_update().clone();

        if let Some(error) = &state.error {
            return Err(anyhow!("Playback failed: {}", error));
        }
        if previous.is_buffering && !state.is_buffering {
            println!("Ready: {} ms", state.duration);
            if let Some(position) = seek.take() {
                SeekAudio::new(controller.clone()).execute(position);
            }
        }
        if state.is_playing != previous.is_playing {
            println!("{}", if state.is_playing { "Playing" } else { "Stopped" });
        }

        let second = state.current_position / 1000;
        if state.is_playing && last_second != Some(second) {
            last_second = Some(second);
            println!("  {:>5.1}s / {:.1}s", state.current_position as f64 / 1000.0, state.duration as f64 / 1000.0);
        }

        if state.is_finished() {
            println!("Ended");
            break;
        }
        previous = state;
    }

    controller.release();
    // Let the final log lines flush
    tokio::time::sleep(Duration::from_millis(10)).await;
    Ok(())
}
