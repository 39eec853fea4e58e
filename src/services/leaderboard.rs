//! Leaderboard aggregation
//!
//! Both leaderboards are pure functions of a snapshot: they never fail, never
//! mutate their inputs and keep no state between calls.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Challenge, ProgressEntry};

/// One participant of a single challenge
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChallengeLeaderboardRow {
    pub user_id: String,
    pub display_label: String,
    pub days_logged: usize,
    /// Unrounded, used for ordering
    pub completion_percentage: f64,
    /// One decimal, for display
    pub completion_rounded: f64,
}

/// One participant across every challenge they have touched
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GlobalLeaderboardRow {
    pub user_id: String,
    pub display_label: String,
    pub total_days_logged: usize,
    pub total_days_possible: i64,
    pub completion_percentage: f64,
    pub completion_rounded: f64,
}

/// Distinct days logged per user and challenge.
///
/// Users are kept in the order they first appear in the input, which is the
/// only tie-break the leaderboards apply.
#[derive(Debug, Default)]
struct DayLedger<'a> {
    users: Vec<&'a str>,
    days: HashMap<&'a str, HashMap<&'a str, HashSet<i32>>>,
}

impl<'a> DayLedger<'a> {
    fn from_entries(entries: &'a [ProgressEntry]) -> Self {
        let mut ledger = Self::default();
        for entry in entries {
            ledger.record(entry);
        }
        ledger
    }

    fn record(&mut self, entry: &'a ProgressEntry) {
        let user = entry.user_id.as_str();
        if !self.days.contains_key(user) {
            self.users.push(user);
        }
        self.days
            .entry(user)
            .or_default()
            .entry(entry.challenge_id.as_str())
            .or_default()
            .insert(entry.day);
    }

    /// Users in first-seen order with their per-challenge day sets.
    fn users(&self) -> impl Iterator<Item = (&'a str, &HashMap<&'a str, HashSet<i32>>)> + '_ {
        self.users.iter().map(move |user| (*user, &self.days[user]))
    }
}

/// Count of distinct day numbers, whatever challenge they were logged against.
fn distinct_days(per_challenge: &HashMap<&str, HashSet<i32>>) -> usize {
    per_challenge
        .values()
        .flatten()
        .collect::<HashSet<_>>()
        .len()
}

/// Count of distinct (challenge, day) pairs.
fn distinct_challenge_days(per_challenge: &HashMap<&str, HashSet<i32>>) -> usize {
    per_challenge.values().map(HashSet::len).sum()
}

/// `logged / possible * 100`, or 0 when nothing is possible.
pub fn completion_percentage(logged: usize, possible: i64) -> f64 {
    if possible <= 0 {
        return 0.0;
    }
    logged as f64 * 100.0 / possible as f64
}

/// Round to one decimal place for presentation.
pub fn round_percentage(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Shorten a raw user id for public display.
///
/// This is a mask, not an identity: two users may share a label.
pub fn mask_user_id(user_id: &str) -> String {
    let chars: Vec<char> = user_id.chars().collect();
    if chars.len() <= 8 {
        return user_id.to_string();
    }
    let head: String = chars[..5].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Rank the participants of one challenge.
///
/// `entries` are expected to belong to that challenge already. Days beyond
/// `duration` still count; a non-positive `duration` yields 0% for everyone.
pub fn compute_challenge_leaderboard(
    entries: &[ProgressEntry],
    duration: i32,
) -> Vec<ChallengeLeaderboardRow> {
    let ledger = DayLedger::from_entries(entries);

    let mut rows: Vec<ChallengeLeaderboardRow> = ledger
        .users()
        .map(|(user_id, per_challenge)| {
            let days_logged = distinct_days(per_challenge);
            let completion = completion_percentage(days_logged, i64::from(duration));
            ChallengeLeaderboardRow {
                user_id: user_id.to_string(),
                display_label: mask_user_id(user_id),
                days_logged,
                completion_percentage: completion,
                completion_rounded: round_percentage(completion),
            }
        })
        .collect();

    // sort_by is stable: equal percentages keep first-seen order
    rows.sort_by(|a, b| b.completion_percentage.total_cmp(&a.completion_percentage));
    rows
}

/// Rank every user across all challenges they have logged at least once.
///
/// A user's possible days are the summed durations of the challenges they
/// touched; challenge ids missing from `challenges` contribute nothing.
pub fn compute_global_leaderboard(
    challenges: &[Challenge],
    entries: &[ProgressEntry],
) -> Vec<GlobalLeaderboardRow> {
    let durations: HashMap<&str, i32> = challenges
        .iter()
        .map(|c| (c.id.as_str(), c.duration))
        .collect();
    let ledger = DayLedger::from_entries(entries);

    let mut rows: Vec<GlobalLeaderboardRow> = ledger
        .users()
        .map(|(user_id, per_challenge)| {
            let total_days_logged = distinct_challenge_days(per_challenge);
            let total_days_possible: i64 = per_challenge
                .keys()
                .map(|id| i64::from(durations.get(id).copied().unwrap_or(0).max(0)))
                .sum();
            let completion = completion_percentage(total_days_logged, total_days_possible);
            GlobalLeaderboardRow {
                user_id: user_id.to_string(),
                display_label: mask_user_id(user_id),
                total_days_logged,
                total_days_possible,
                completion_percentage: completion,
                completion_rounded: round_percentage(completion),
            }
        })
        .collect();

    rows.sort_by(|a, b| b.completion_percentage.total_cmp(&a.completion_percentage));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(challenge: &str, user: &str, day: i32) -> ProgressEntry {
        ProgressEntry::new(challenge, user, day, 1.0, Utc::now())
    }

    fn challenge(id: &str, duration: i32) -> Challenge {
        Challenge {
            id: id.to_string(),
            title: format!("Challenge {}", id),
            goal: "Move".to_string(),
            duration,
            owner_id: "owner".to_string(),
            created_at: Utc::now(),
        }
    }

    fn assert_non_increasing(values: &[f64]) {
        for pair in values.windows(2) {
            assert!(pair[0] >= pair[1], "{:?} is not sorted descending", values);
        }
    }

    #[test]
    fn test_empty_input_gives_empty_board() {
        assert!(compute_challenge_leaderboard(&[], 30).is_empty());
        assert!(compute_global_leaderboard(&[challenge("a", 10)], &[]).is_empty());
    }

    #[test]
    fn test_three_days_of_ten() {
        let entries = vec![entry("A", "U1", 1), entry("A", "U1", 2), entry("A", "U1", 3)];

        let rows = compute_challenge_leaderboard(&entries, 10);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, "U1");
        assert_eq!(rows[0].days_logged, 3);
        assert_eq!(rows[0].completion_percentage, 30.0);
        assert_eq!(rows[0].completion_rounded, 30.0);
    }

    #[test]
    fn test_one_row_per_user() {
        let entries = vec![
            entry("A", "alice", 1),
            entry("A", "bob", 1),
            entry("A", "alice", 2),
            entry("A", "carol", 5),
        ];

        let rows = compute_challenge_leaderboard(&entries, 10);

        let mut users: Vec<&str> = rows.iter().map(|r| r.user_id.as_str()).collect();
        users.sort();
        assert_eq!(users, vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_duplicate_day_counts_once() {
        let once = vec![entry("A", "U1", 4)];
        let twice = vec![entry("A", "U1", 4), entry("A", "U1", 4)];

        assert_eq!(
            compute_challenge_leaderboard(&once, 10)[0].days_logged,
            compute_challenge_leaderboard(&twice, 10)[0].days_logged
        );
        assert_eq!(compute_challenge_leaderboard(&twice, 10)[0].days_logged, 1);
    }

    #[test]
    fn test_days_past_duration_still_count() {
        let entries = vec![entry("A", "U1", 1), entry("A", "U1", 2), entry("A", "U1", 15)];

        let rows = compute_challenge_leaderboard(&entries, 2);

        assert_eq!(rows[0].days_logged, 3);
        assert_eq!(rows[0].completion_percentage, 150.0);
    }

    #[test]
    fn test_zero_duration_is_zero_percent() {
        let entries = vec![entry("A", "U1", 1)];
        let rows = compute_challenge_leaderboard(&entries, 0);
        assert_eq!(rows[0].days_logged, 1);
        assert_eq!(rows[0].completion_percentage, 0.0);
    }

    #[test]
    fn test_challenge_board_sorted_descending() {
        let entries = vec![
            entry("A", "slow", 1),
            entry("A", "fast", 1),
            entry("A", "fast", 2),
            entry("A", "fast", 3),
            entry("A", "mid", 1),
            entry("A", "mid", 2),
        ];

        let rows = compute_challenge_leaderboard(&entries, 7);

        let order: Vec<&str> = rows.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(order, vec!["fast", "mid", "slow"]);
        let pcts: Vec<f64> = rows.iter().map(|r| r.completion_percentage).collect();
        assert_non_increasing(&pcts);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let entries = vec![
            entry("A", "second", 1),
            entry("A", "first", 1),
            entry("A", "third", 1),
        ];

        let rows = compute_challenge_leaderboard(&entries, 3);

        let order: Vec<&str> = rows.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(order, vec!["second", "first", "third"]);
    }

    #[test]
    fn test_rounding_keeps_raw_value() {
        let entries = vec![entry("A", "U1", 1)];
        let rows = compute_challenge_leaderboard(&entries, 3);
        assert!((rows[0].completion_percentage - 33.333_333).abs() < 1e-4);
        assert_eq!(rows[0].completion_rounded, 33.3);
    }

    #[test]
    fn test_same_day_number_in_two_challenges_counts_twice() {
        let challenges = vec![challenge("A", 10), challenge("B", 10)];
        let entries = vec![entry("A", "U1", 3), entry("B", "U1", 3)];

        let rows = compute_global_leaderboard(&challenges, &entries);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_days_logged, 2);
        assert_eq!(rows[0].total_days_possible, 20);
    }

    #[test]
    fn test_untouched_challenge_not_in_denominator() {
        let challenges = vec![challenge("A", 10), challenge("C", 100)];
        let entries = vec![entry("A", "U1", 1)];

        let rows = compute_global_leaderboard(&challenges, &entries);

        assert_eq!(rows[0].total_days_possible, 10);
        assert_eq!(rows[0].completion_percentage, 10.0);
    }

    #[test]
    fn test_global_end_to_end() {
        let challenges = vec![challenge("A", 10), challenge("B", 20)];
        let entries = vec![entry("A", "U1", 1), entry("B", "U1", 1), entry("B", "U1", 2)];

        let rows = compute_global_leaderboard(&challenges, &entries);

        assert_eq!(rows[0].total_days_logged, 3);
        assert_eq!(rows[0].total_days_possible, 30);
        assert_eq!(rows[0].completion_percentage, 10.0);
    }

    #[test]
    fn test_dangling_challenge_contributes_nothing() {
        let challenges = vec![challenge("A", 10)];
        let entries = vec![entry("A", "U1", 1), entry("gone", "U1", 1)];

        let rows = compute_global_leaderboard(&challenges, &entries);

        assert_eq!(rows[0].total_days_logged, 2);
        assert_eq!(rows[0].total_days_possible, 10);
        assert_eq!(rows[0].completion_percentage, 20.0);
    }

    #[test]
    fn test_only_dangling_progress_is_zero_percent() {
        let entries = vec![entry("gone", "U1", 1), entry("gone", "U1", 2)];

        let rows = compute_global_leaderboard(&[], &entries);

        assert_eq!(rows[0].total_days_logged, 2);
        assert_eq!(rows[0].total_days_possible, 0);
        assert_eq!(rows[0].completion_percentage, 0.0);
    }

    #[test]
    fn test_global_duplicates_collapse() {
        let challenges = vec![challenge("A", 4)];
        let entries = vec![entry("A", "U1", 2), entry("A", "U1", 2), entry("A", "U1", 3)];

        let rows = compute_global_leaderboard(&challenges, &entries);

        assert_eq!(rows[0].total_days_logged, 2);
        assert_eq!(rows[0].completion_percentage, 50.0);
    }

    #[test]
    fn test_global_sorted_descending() {
        let challenges = vec![challenge("A", 10), challenge("B", 5)];
        let entries = vec![
            entry("A", "u-low", 1),
            entry("B", "u-high", 1),
            entry("B", "u-high", 2),
            entry("B", "u-high", 3),
            entry("A", "u-mid", 1),
            entry("A", "u-mid", 2),
            entry("B", "u-mid", 1),
        ];

        let rows = compute_global_leaderboard(&challenges, &entries);

        let order: Vec<&str> = rows.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(order, vec!["u-high", "u-mid", "u-low"]);
        let pcts: Vec<f64> = rows.iter().map(|r| r.completion_percentage).collect();
        assert_non_increasing(&pcts);
    }

    #[test]
    fn test_mask_user_id() {
        assert_eq!(mask_user_id("short"), "short");
        assert_eq!(mask_user_id("exactly8"), "exactly8");
        assert_eq!(mask_user_id("abcdefghijklmnop"), "abcde...op");
        assert_eq!(mask_user_id("ééééééééééxy"), "ééééé...xy");
    }
}
