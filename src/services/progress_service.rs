//! Progress Service - toggling days and the per-user views of a challenge

use std::collections::BTreeSet;

use chrono::Utc;
use serde::Serialize;

use crate::domain::{DomainError, ProgressEntry, ProgressRepository};

/// What a toggle did to the stored entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ToggleOutcome {
    Logged { entry: ProgressEntry },
    Removed { id: String },
}

/// A user's standing in one challenge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSummary {
    pub challenge_id: String,
    pub completed_days: Vec<i32>,
    pub completed_count: usize,
    pub duration: i32,
    /// Whole-number percentage
    pub percent: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub day: i32,
    pub label: String,
    pub value: f64,
}

/// Mark `day` done if it is not, undo it if it is.
///
/// The stored entry is addressed by its derived id, so repeating a toggle
/// alternates between exactly one entry and none.
pub async fn toggle_day(
    repo: &dyn ProgressRepository,
    challenge_id: &str,
    user_id: &str,
    day: i32,
) -> Result<ToggleOutcome, DomainError> {
    if day < 1 {
        return Err(DomainError::Validation(format!(
            "day must be 1 or later, got {}",
            day
        )));
    }

    let entry = ProgressEntry::new(challenge_id, user_id, day, 1.0, Utc::now());

    match repo.toggle(entry.clone()).await? {
        Some(entry) => {
            tracing::info!("Logged day {} of {} for {}", day, challenge_id, user_id);
            Ok(ToggleOutcome::Logged { entry })
        }
        None => {
            tracing::info!("Removed day {} of {} for {}", day, challenge_id, user_id);
            Ok(ToggleOutcome::Removed { id: entry.id })
        }
    }
}

/// Days `user_id` has completed in `challenge_id`.
pub fn completed_days(entries: &[ProgressEntry], challenge_id: &str, user_id: &str) -> BTreeSet<i32> {
    entries
        .iter()
        .filter(|p| p.challenge_id == challenge_id && p.user_id == user_id)
        .map(|p| p.day)
        .collect()
}

pub fn progress_summary(
    entries: &[ProgressEntry],
    challenge_id: &str,
    duration: i32,
    user_id: &str,
) -> ProgressSummary {
    let days = completed_days(entries, challenge_id, user_id);
    let completed_count = days.len();
    let percent = if duration > 0 {
        (completed_count as f64 * 100.0 / f64::from(duration)).round() as i64
    } else {
        0
    };

    ProgressSummary {
        challenge_id: challenge_id.to_string(),
        completed_days: days.into_iter().collect(),
        completed_count,
        duration,
        percent,
    }
}

/// One point per day `1..=duration`, holding the logged value or 0.
///
/// `entries` should already be narrowed to one user and one challenge.
pub fn chart_series(entries: &[ProgressEntry], duration: i32) -> Vec<ChartPoint> {
    (1..=duration.max(0))
        .map(|day| {
            let value = entries
                .iter()
                .rev()
                .find(|p| p.day == day)
                .map(|p| p.value)
                .unwrap_or(0.0);
            ChartPoint {
                day,
                label: format!("Day {}", day),
                value,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(challenge: &str, user: &str, day: i32, value: f64) -> ProgressEntry {
        ProgressEntry::new(challenge, user, day, value, Utc::now())
    }

    #[test]
    fn test_completed_days_only_for_that_user_and_challenge() {
        let entries = vec![
            entry("A", "me", 2, 1.0),
            entry("A", "me", 1, 1.0),
            entry("A", "you", 3, 1.0),
            entry("B", "me", 4, 1.0),
        ];

        let days = completed_days(&entries, "A", "me");
        assert_eq!(days.into_iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_summary_rounds_to_whole_percent() {
        let entries = vec![entry("A", "me", 1, 1.0), entry("A", "me", 2, 1.0)];

        let summary = progress_summary(&entries, "A", 3, "me");

        assert_eq!(summary.completed_days, vec![1, 2]);
        assert_eq!(summary.completed_count, 2);
        assert_eq!(summary.percent, 67);
    }

    #[test]
    fn test_summary_with_zero_duration() {
        let entries = vec![entry("A", "me", 1, 1.0)];
        assert_eq!(progress_summary(&entries, "A", 0, "me").percent, 0);
    }

    #[test]
    fn test_chart_fills_missing_days_with_zero() {
        let entries = vec![entry("A", "me", 2, 3.5), entry("A", "me", 9, 1.0)];

        let series = chart_series(&entries, 3);

        assert_eq!(series.len(), 3);
        assert_eq!(series[0].label, "Day 1");
        assert_eq!(series[0].value, 0.0);
        assert_eq!(series[1].value, 3.5);
        assert_eq!(series[2].value, 0.0);
    }

    #[test]
    fn test_chart_for_non_positive_duration_is_empty() {
        assert!(chart_series(&[], 0).is_empty());
        assert!(chart_series(&[], -4).is_empty());
    }
}
