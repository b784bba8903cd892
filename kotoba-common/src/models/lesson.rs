//! Lesson, activity and vocabulary models
//!
//! Every lesson carries four activities, one per skill: listening,
//! conversation, reading and writing. Activity content is a tagged enum
//! stored as JSON in the `activities.content_json` column.

use super::audio::AudioTrack;
use serde::{Deserialize, Serialize};

/// A single lesson within a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub course_id: String,
    pub number: u32,
    pub title: String,
    pub title_japanese: String,
    pub description: String,
    /// Loaded separately; never stored on the lesson row
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub is_unlocked: bool,
    /// Completion fraction, 0.0 to 1.0
    #[serde(default)]
    pub progress: f32,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Activity kinds available in each lesson
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    /// 聴解 listening comprehension
    Audicion,
    /// 会話 conversation practice
    Conversacion,
    /// 読解 reading comprehension
    Lectura,
    /// 作文 writing practice
    Escritura,
}

impl ActivityType {
    /// Parse from database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "AUDICION" => Some(ActivityType::Audicion),
            "CONVERSACION" => Some(ActivityType::Conversacion),
            "LECTURA" => Some(ActivityType::Lectura),
            "ESCRITURA" => Some(ActivityType::Escritura),
            _ => None,
        }
    }

    /// Convert to database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            ActivityType::Audicion => "AUDICION",
            ActivityType::Conversacion => "CONVERSACION",
            ActivityType::Lectura => "LECTURA",
            ActivityType::Escritura => "ESCRITURA",
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityType::Audicion => f.pad("Audición"),
            ActivityType::Conversacion => f.pad("Conversación"),
            ActivityType::Lectura => f.pad("Lectura"),
            ActivityType::Escritura => f.pad("Escritura"),
        }
    }
}

/// An activity within a lesson
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub lesson_id: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub title: String,
    pub title_japanese: String,
    pub content: ActivityContent,
    #[serde(default)]
    pub is_completed: bool,
    pub order: u32,
}

impl Activity {
    /// Build a playable track for activities that have audio
    ///
    /// Returns None for reading/writing activities and for conversations
    /// without a recording.
    pub fn audio_track(&self) -> Option<AudioTrack> {
        let (url, duration) = match &self.content {
            ActivityContent::Listening {
                audio_url,
                duration,
                ..
            } => (audio_url.as_str(), *duration),
            ActivityContent::Conversation {
                audio_url: Some(url),
                ..
            } => (url.as_str(), 0),
            _ => return None,
        };

        if url.is_empty() {
            return None;
        }

        Some(AudioTrack {
            id: self.id.clone(),
            url: url.to_string(),
            title: self.title.clone(),
            title_japanese: Some(self.title_japanese.clone()),
            duration,
            lesson_id: Some(self.lesson_id.clone()),
            activity_id: Some(self.id.clone()),
        })
    }
}

/// Content of each activity kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityContent {
    Listening {
        audio_url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transcript: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transcript_japanese: Option<String>,
        #[serde(default)]
        questions: Vec<Question>,
        /// Milliseconds
        #[serde(default)]
        duration: u64,
    },
    Conversation {
        #[serde(default)]
        dialogues: Vec<Dialogue>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        audio_url: Option<String>,
        #[serde(default)]
        vocabulary: Vec<VocabularyItem>,
    },
    Reading {
        text: String,
        text_japanese: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        furigana: Option<String>,
        #[serde(default)]
        questions: Vec<Question>,
        #[serde(default)]
        vocabulary: Vec<VocabularyItem>,
    },
    Writing {
        prompt: String,
        prompt_japanese: String,
        #[serde(default)]
        examples: Vec<String>,
        #[serde(default)]
        hints: Vec<String>,
    },
}

impl ActivityContent {
    /// Activity type this content belongs to
    pub fn activity_type(&self) -> ActivityType {
        match self {
            ActivityContent::Listening { .. } => ActivityType::Audicion,
            ActivityContent::Conversation { .. } => ActivityType::Conversacion,
            ActivityContent::Reading { .. } => ActivityType::Lectura,
            ActivityContent::Writing { .. } => ActivityType::Escritura,
        }
    }

    /// Questions attached to this content, if any
    pub fn questions(&self) -> &[Question] {
        match self {
            ActivityContent::Listening { questions, .. }
            | ActivityContent::Reading { questions, .. } => questions,
            _ => &[],
        }
    }
}

/// A line of dialogue in a conversation activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dialogue {
    pub speaker: String,
    pub speaker_japanese: String,
    pub text: String,
    pub text_japanese: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

/// Assessment question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub text_japanese: String,
    #[serde(default)]
    pub options: Vec<String>,
    /// Index into `options`
    #[serde(default)]
    pub correct_answer: usize,
    #[serde(rename = "type", default)]
    pub question_type: QuestionType,
}

impl Question {
    pub fn is_correct(&self, answer: usize) -> bool {
        answer == self.correct_answer
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    MultipleChoice,
    TrueFalse,
    FillInBlank,
    Ordering,
}

/// Vocabulary item as shown to the learner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyItem {
    pub word: String,
    /// Hiragana/Katakana reading
    pub reading: String,
    pub meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_meaning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

/// Stored vocabulary row: an item plus its review bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub id: String,
    pub lesson_id: String,
    #[serde(flatten)]
    pub item: VocabularyItem,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub times_reviewed: u32,
}
