//! Course model

use serde::{Deserialize, Serialize};

/// Lessons per course when a content pack does not say otherwise
pub const DEFAULT_LESSONS_PER_COURSE: u32 = 18;

/// Course difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseLevel {
    Inicial,
    #[serde(rename = "BASICO_1")]
    Basico1,
    #[serde(rename = "BASICO_2")]
    Basico2,
}

impl CourseLevel {
    /// Parse from database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "INICIAL" => Some(CourseLevel::Inicial),
            "BASICO_1" => Some(CourseLevel::Basico1),
            "BASICO_2" => Some(CourseLevel::Basico2),
            _ => None,
        }
    }

    /// Convert to database string representation
    ///
    /// The stored values sort in level order, so `ORDER BY level` works.
    pub fn to_db_string(&self) -> &'static str {
        match self {
            CourseLevel::Inicial => "INICIAL",
            CourseLevel::Basico1 => "BASICO_1",
            CourseLevel::Basico2 => "BASICO_2",
        }
    }

    /// Get human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            CourseLevel::Inicial => "Inicial",
            CourseLevel::Basico1 => "Básico 1",
            CourseLevel::Basico2 => "Básico 2",
        }
    }
}

impl std::fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.display_name())
    }
}

/// A course (Inicial, Básico 1, Básico 2)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub name_japanese: String,
    pub description: String,
    pub level: CourseLevel,
    #[serde(default = "default_total_lessons")]
    pub total_lessons: u32,
    #[serde(default)]
    pub completed_lessons: u32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_unlocked: bool,
}

fn default_total_lessons() -> u32 {
    DEFAULT_LESSONS_PER_COURSE
}

impl Course {
    /// Fraction of lessons completed (0.0-1.0)
    pub fn completion_ratio(&self) -> f32 {
        if self.total_lessons == 0 {
            return 0.0;
        }
        (self.completed_lessons as f32 / self.total_lessons as f32).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_db_strings() {
        for level in [CourseLevel::Inicial, CourseLevel::Basico1, CourseLevel::Basico2] {
            assert_eq!(CourseLevel::from_db_string(level.to_db_string()), Some(level));
        }
        assert_eq!(CourseLevel::from_db_string("AVANZADO"), None);
    }

    #[test]
    fn test_level_db_strings_sort_in_level_order() {
        let mut stored = vec!["BASICO_2", "INICIAL", "BASICO_1"];
        stored.sort();
        let levels: Vec<_> = stored
            .into_iter()
            .filter_map(CourseLevel::from_db_string)
            .collect();
        assert_eq!(
            levels,
            vec![CourseLevel::Inicial, CourseLevel::Basico1, CourseLevel::Basico2]
        );
    }

    #[test]
    fn test_completion_ratio() {
        let mut course = Course {
            id: "inicial".to_string(),
            name: "Inicial".to_string(),
            name_japanese: "入門".to_string(),
            description: String::new(),
            level: CourseLevel::Inicial,
            total_lessons: 18,
            completed_lessons: 9,
            image_url: None,
            is_unlocked: true,
        };
        assert_eq!(course.completion_ratio(), 0.5);

        course.total_lessons = 0;
        assert_eq!(course.completion_ratio(), 0.0);
    }
}
