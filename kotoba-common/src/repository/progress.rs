//! Progress repository

use crate::db::{progress, Database, Table, UserProgressRecord};
use crate::mapper::map_all;
use crate::models::{UserProgress, UserStats};
use crate::Result;
use chrono::{DateTime, NaiveDate, Utc};
use futures::stream::BoxStream;

#[derive(Debug, Clone)]
pub struct ProgressRepository {
    db: Database,
}

impl ProgressRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn get_progress_by_course(&self, course_id: &str) -> Result<Vec<UserProgress>> {
        map_all(progress::get_progress_by_course(&self.db, course_id).await?)
    }

    pub fn observe_progress_by_course(&self, course_id: &str) -> BoxStream<'static, Result<Vec<UserProgress>>> {
        let course_id = course_id.to_string();
        self.db.observe(&[Table::UserProgress], move |db| {
            let course_id = course_id.clone();
            async move {
                map_all::<_, UserProgress>(progress::get_progress_by_course(&db, &course_id).await?)
            }
        })
    }

    /// Lesson-level progress row, if the lesson has been started
    pub async fn get_progress_by_lesson(&self, lesson_id: &str) -> Result<Option<UserProgress>> {
        progress::get_progress_by_lesson(&self.db, lesson_id)
            .await?
            .map(UserProgress::try_from)
            .transpose()
    }

    pub fn observe_progress_by_lesson(&self, lesson_id: &str) -> BoxStream<'static, Result<Option<UserProgress>>> {
        let lesson_id = lesson_id.to_string();
        self.db.observe(&[Table::UserProgress], move |db| {
            let lesson_id = lesson_id.clone();
            async move {
                progress::get_progress_by_lesson(&db, &lesson_id)
                    .await?
                    .map(UserProgress::try_from)
                    .transpose()
            }
        })
    }

    pub async fn get_progress_by_id(&self, id: &str) -> Result<Option<UserProgress>> {
        progress::get_progress_by_id(&self.db, id)
            .await?
            .map(UserProgress::try_from)
            .transpose()
    }

    pub async fn get_user_stats(&self) -> Result<UserStats> {
        load_user_stats(&self.db, Utc::now().date_naive()).await
    }

    pub fn observe_user_stats(&self) -> BoxStream<'static, Result<UserStats>> {
        self.db.observe(&[Table::UserProgress], |db| async move {
            load_user_stats(&db, Utc::now().date_naive()).await
        })
    }

    /// Insert or overwrite a progress row
    pub async fn save_progress(&self, entry: &UserProgress) -> Result<()> {
        progress::upsert_progress(&self.db, &UserProgressRecord::try_from(entry)?).await
    }

    /// Update an existing progress row; `NotFound` if it was never saved
    pub async fn update_progress(&self, entry: &UserProgress) -> Result<()> {
        progress::update_progress(&self.db, &UserProgressRecord::try_from(entry)?).await
    }

    /// Delete every progress row of a course and clear its completion state
    pub async fn reset_progress(&self, course_id: &str) -> Result<u64> {
        progress::reset_course_progress(&self.db, course_id).await
    }
}

async fn load_user_stats(db: &Database, today: NaiveDate) -> Result<UserStats> {
    let mut stats = UserStats::from(progress::get_user_stats_raw(db).await?);

    let timestamps = progress::get_study_timestamps(db).await?;
    let mut days: Vec<NaiveDate> = timestamps
        .iter()
        .filter_map(|ms| DateTime::from_timestamp_millis(*ms))
        .map(|t| t.date_naive())
        .collect();
    days.sort();
    days.dedup();

    let (current, longest) = compute_streaks(&days, today);
    stats.current_streak = current;
    stats.longest_streak = longest;
    stats.last_study_date = timestamps
        .iter()
        .max()
        .and_then(|ms| DateTime::from_timestamp_millis(*ms));

    Ok(stats)
}

/// (current, longest) runs of consecutive study days
///
/// `days` must be sorted and deduplicated. The current streak counts only
/// if the last study day is today or yesterday.
pub fn compute_streaks(days: &[NaiveDate], today: NaiveDate) -> (u32, u32) {
    let mut longest = 0u32;
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;

    for day in days {
        run = match previous {
            Some(prev) if prev.succ_opt() == Some(*day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(*day);
    }

    let current = match previous {
        Some(last) if last == today || last.succ_opt() == Some(today) => run,
        _ => 0,
    };

    (current, longest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_no_study_days() {
        assert_eq!(compute_streaks(&[], day(10)), (0, 0));
    }

    #[test]
    fn test_current_streak_ending_today() {
        let days = [day(1), day(2), day(8), day(9), day(10)];
        assert_eq!(compute_streaks(&days, day(10)), (3, 3));
    }

    #[test]
    fn test_current_streak_survives_until_tomorrow() {
        let days = [day(8), day(9)];
        assert_eq!(compute_streaks(&days, day(10)), (2, 2));
    }

    #[test]
    fn test_broken_streak_keeps_longest() {
        let days = [day(1), day(2), day(3), day(4), day(7)];
        assert_eq!(compute_streaks(&days, day(10)), (0, 4));
    }
}
