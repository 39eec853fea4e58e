//! Services Layer
//!
//! This module contains pure business logic extracted from HTTP handlers.
//! Aggregations work on snapshots; writes go through the repository traits.

pub mod challenge_service;
pub mod leaderboard;
pub mod live_board;
pub mod progress_service;

// Re-export for convenience
pub use leaderboard::{
    compute_challenge_leaderboard, compute_global_leaderboard, ChallengeLeaderboardRow,
    GlobalLeaderboardRow,
};
pub use live_board::{watch_leaderboard, LeaderboardUpdate};
