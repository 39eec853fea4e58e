//! Records held in the two live collections, `challenges` and `progress`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-defined goal with a fixed day-count duration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    pub title: String,
    pub goal: String,
    /// Number of days, at least 1 for anything created through the services
    pub duration: i32,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

/// One user completing one day of one challenge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    /// Always `progress_entry_id(challenge_id, user_id, day)`
    pub id: String,
    pub challenge_id: String,
    pub user_id: String,
    pub day: i32,
    pub value: f64,
    pub logged_at: DateTime<Utc>,
}

impl ProgressEntry {
    /// Build an entry whose id is derived from the (challenge, user, day) triple.
    pub fn new(
        challenge_id: impl Into<String>,
        user_id: impl Into<String>,
        day: i32,
        value: f64,
        logged_at: DateTime<Utc>,
    ) -> Self {
        let challenge_id = challenge_id.into();
        let user_id = user_id.into();
        Self {
            id: progress_entry_id(&challenge_id, &user_id, day),
            challenge_id,
            user_id,
            day,
            value,
            logged_at,
        }
    }
}

/// Document id of the progress entry for `(challenge_id, user_id, day)`.
///
/// Components are joined with `_`; any `_` or `%` inside a component is
/// percent-escaped first so two different triples never share an id.
pub fn progress_entry_id(challenge_id: &str, user_id: &str, day: i32) -> String {
    format!(
        "{}_{}_{}",
        escape_component(challenge_id),
        escape_component(user_id),
        day
    )
}

fn escape_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '%' => out.push_str("%25"),
            '_' => out.push_str("%5F"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_deterministic() {
        assert_eq!(progress_entry_id("c1", "u1", 3), "c1_u1_3");
        assert_eq!(
            progress_entry_id("c1", "u1", 3),
            progress_entry_id("c1", "u1", 3)
        );
    }

    #[test]
    fn test_id_distinguishes_every_component() {
        let base = progress_entry_id("c1", "u1", 3);
        assert_ne!(base, progress_entry_id("c2", "u1", 3));
        assert_ne!(base, progress_entry_id("c1", "u2", 3));
        assert_ne!(base, progress_entry_id("c1", "u1", 4));
    }

    #[test]
    fn test_underscores_cannot_collide() {
        assert_ne!(
            progress_entry_id("a_b", "c", 1),
            progress_entry_id("a", "b_c", 1)
        );
        assert_ne!(
            progress_entry_id("a%5F", "b", 1),
            progress_entry_id("a_", "b", 1)
        );
    }

    #[test]
    fn test_new_entry_carries_derived_id() {
        let entry = ProgressEntry::new("chal", "user", 7, 1.0, Utc::now());
        assert_eq!(entry.id, progress_entry_id("chal", "user", 7));
        assert_eq!(entry.day, 7);
    }
}
