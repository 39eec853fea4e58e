//! Leaderboards that follow the live collections.
//!
//! Each push on either feed triggers a full recomputation from the latest
//! snapshot of *both* feeds; nothing is carried over between runs.

use futures::stream::{self, Stream};
use serde::Serialize;

use crate::domain::{Challenge, ProgressEntry};
use crate::infrastructure::live::{Snapshot, Subscription};

/// What a live leaderboard currently shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LeaderboardUpdate<R> {
    /// No progress snapshot yet
    Loading,
    /// The progress feed failed; nothing was computed
    Unavailable { reason: String },
    Ranked { rows: Vec<R> },
}

/// Compute one update from a snapshot pair.
///
/// A missing or failed challenge feed is treated as an empty challenge list,
/// so progress simply resolves to dangling references until it arrives.
pub fn recompute<R, F>(
    challenges: &Snapshot<Challenge>,
    progress: &Snapshot<ProgressEntry>,
    compute: &F,
) -> LeaderboardUpdate<R>
where
    F: Fn(&[Challenge], &[ProgressEntry]) -> Vec<R>,
{
    let progress = match progress {
        Snapshot::Loading => return LeaderboardUpdate::Loading,
        Snapshot::Failed(reason) => {
            return LeaderboardUpdate::Unavailable {
                reason: reason.clone(),
            }
        }
        Snapshot::Ready(rows) => rows.as_slice(),
    };

    let challenges: &[Challenge] = match challenges {
        Snapshot::Ready(rows) => rows.as_slice(),
        Snapshot::Loading | Snapshot::Failed(_) => &[],
    };

    let rows = compute(challenges, progress);
    tracing::debug!(
        "Recomputed leaderboard: {} rows from {} challenges, {} entries",
        rows.len(),
        challenges.len(),
        progress.len()
    );
    LeaderboardUpdate::Ranked { rows }
}

struct Feeds<F> {
    challenges: Subscription<Challenge>,
    progress: Subscription<ProgressEntry>,
    compute: F,
    primed: bool,
}

/// Stream one update immediately, then one per push on either feed.
///
/// The stream ends when either collection goes away; dropping it releases
/// both subscriptions.
pub fn watch_leaderboard<R, F>(
    challenges: Subscription<Challenge>,
    progress: Subscription<ProgressEntry>,
    compute: F,
) -> impl Stream<Item = LeaderboardUpdate<R>> + Send
where
    R: Send + 'static,
    F: Fn(&[Challenge], &[ProgressEntry]) -> Vec<R> + Send + 'static,
{
    let feeds = Feeds {
        challenges,
        progress,
        compute,
        primed: false,
    };

    stream::unfold(feeds, |mut feeds| async move {
        if feeds.primed {
            let alive = tokio::select! {
                alive = feeds.challenges.changed() => alive,
                alive = feeds.progress.changed() => alive,
            };
            if !alive {
                return None;
            }
        }
        feeds.primed = true;

        let challenges = feeds.challenges.snapshot();
        let progress = feeds.progress.snapshot();
        let update = recompute(&challenges, &progress, &feeds.compute);
        Some((update, feeds))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::live::LiveCollection;
    use crate::services::leaderboard::{compute_global_leaderboard, GlobalLeaderboardRow};
    use chrono::Utc;
    use futures::StreamExt;
    use std::sync::Arc;
    use std::time::Duration;

    fn challenge(id: &str, duration: i32) -> Challenge {
        Challenge {
            id: id.to_string(),
            title: id.to_string(),
            goal: "goal".to_string(),
            duration,
            owner_id: "owner".to_string(),
            created_at: Utc::now(),
        }
    }

    fn entry(challenge: &str, user: &str, day: i32) -> ProgressEntry {
        ProgressEntry::new(challenge, user, day, 1.0, Utc::now())
    }

    fn global(c: &[Challenge], p: &[ProgressEntry]) -> Vec<GlobalLeaderboardRow> {
        compute_global_leaderboard(c, p)
    }

    async fn next<S>(updates: &mut S) -> LeaderboardUpdate<GlobalLeaderboardRow>
    where
        S: Stream<Item = LeaderboardUpdate<GlobalLeaderboardRow>> + Unpin,
    {
        tokio::time::timeout(Duration::from_secs(1), updates.next())
            .await
            .expect("no update within a second")
            .expect("stream ended")
    }

    #[test]
    fn test_recompute_states() {
        let ready_challenges = Snapshot::Ready(Arc::new(vec![challenge("A", 10)]));
        let loading: Snapshot<ProgressEntry> = Snapshot::Loading;
        let failed: Snapshot<ProgressEntry> = Snapshot::Failed("offline".into());

        assert_eq!(
            recompute(&ready_challenges, &loading, &global),
            LeaderboardUpdate::Loading
        );
        assert_eq!(
            recompute(&ready_challenges, &failed, &global),
            LeaderboardUpdate::Unavailable {
                reason: "offline".into()
            }
        );
    }

    #[test]
    fn test_recompute_tolerates_missing_challenges() {
        let progress = Snapshot::Ready(Arc::new(vec![entry("A", "U1", 1)]));
        let challenges: Snapshot<Challenge> = Snapshot::Failed("offline".into());

        match recompute(&challenges, &progress, &global) {
            LeaderboardUpdate::Ranked { rows } => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].total_days_possible, 0);
                assert_eq!(rows[0].completion_percentage, 0.0);
            }
            other => panic!("unexpected update {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stream_follows_both_feeds() {
        let challenges = LiveCollection::new("challenges");
        let progress = LiveCollection::new("progress");
        progress.publish(vec![entry("A", "U1", 1)]);

        let mut updates = Box::pin(watch_leaderboard(
            challenges.subscribe(),
            progress.subscribe(),
            global,
        ));

        // Challenge feed not loaded yet: dangling, 0%
        match next(&mut updates).await {
            LeaderboardUpdate::Ranked { rows } => assert_eq!(rows[0].total_days_possible, 0),
            other => panic!("unexpected update {:?}", other),
        }

        challenges.publish(vec![challenge("A", 10)]);
        match next(&mut updates).await {
            LeaderboardUpdate::Ranked { rows } => {
                assert_eq!(rows[0].total_days_possible, 10);
                assert_eq!(rows[0].completion_percentage, 10.0);
            }
            other => panic!("unexpected update {:?}", other),
        }

        progress.publish(vec![entry("A", "U1", 1), entry("A", "U1", 2)]);
        match next(&mut updates).await {
            LeaderboardUpdate::Ranked { rows } => {
                assert_eq!(rows[0].total_days_logged, 2);
                assert_eq!(rows[0].completion_percentage, 20.0);
            }
            other => panic!("unexpected update {:?}", other),
        }

        progress.fail("backend error");
        assert_eq!(
            next(&mut updates).await,
            LeaderboardUpdate::Unavailable {
                reason: "backend error".into()
            }
        );
    }

    #[tokio::test]
    async fn test_dropping_stream_releases_subscriptions() {
        let challenges: LiveCollection<Challenge> = LiveCollection::new("challenges");
        let progress: LiveCollection<ProgressEntry> = LiveCollection::new("progress");

        let updates = watch_leaderboard(challenges.subscribe(), progress.subscribe(), global);
        assert_eq!(challenges.subscriber_count(), 1);
        assert_eq!(progress.subscriber_count(), 1);

        drop(updates);
        assert_eq!(challenges.subscriber_count(), 0);
        assert_eq!(progress.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_stream_ends_when_collection_is_gone() {
        let challenges: LiveCollection<Challenge> = LiveCollection::new("challenges");
        let progress: LiveCollection<ProgressEntry> = LiveCollection::new("progress");
        progress.publish(Vec::new());

        let mut updates = Box::pin(watch_leaderboard(
            challenges.subscribe(),
            progress.subscribe(),
            global,
        ));
        assert_eq!(next(&mut updates).await, LeaderboardUpdate::Ranked { rows: vec![] });

        drop(challenges);
        let ended = tokio::time::timeout(Duration::from_secs(1), updates.next())
            .await
            .expect("stream did not end");
        assert!(ended.is_none());
    }
}
