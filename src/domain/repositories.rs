//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use serde::Deserialize;

use super::{Challenge, DomainError, ProgressEntry};

/// Filter criteria for challenge queries
#[derive(Debug, Default, Clone)]
pub struct ChallengeFilter {
    pub owner_id: Option<String>,
}

/// Filter criteria for progress queries
#[derive(Debug, Default, Clone)]
pub struct ProgressFilter {
    pub challenge_id: Option<String>,
    pub user_id: Option<String>,
}

/// Input for creating a challenge
#[derive(Debug, Clone, Deserialize)]
pub struct CreateChallengeInput {
    pub title: String,
    pub goal: String,
    pub duration: i32,
}

/// Input for updating a challenge; only these fields are ever mutable
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateChallengeInput {
    pub title: String,
    pub goal: String,
    pub duration: i32,
}

/// Repository trait for the `challenges` collection
#[async_trait]
pub trait ChallengeRepository: Send + Sync {
    /// Find all challenges matching the filter, newest first
    async fn find_all(&self, filter: ChallengeFilter) -> Result<Vec<Challenge>, DomainError>;

    /// Find a challenge by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Challenge>, DomainError>;

    /// Create a challenge owned by `owner_id`
    async fn create(
        &self,
        owner_id: &str,
        input: CreateChallengeInput,
    ) -> Result<Challenge, DomainError>;

    /// Update title, goal and duration
    async fn update(&self, id: &str, input: UpdateChallengeInput)
        -> Result<Challenge, DomainError>;

    /// Delete a challenge by ID
    async fn delete(&self, id: &str) -> Result<(), DomainError>;
}

/// Repository trait for the `progress` collection
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Find all entries matching the filter
    async fn find_all(&self, filter: ProgressFilter) -> Result<Vec<ProgressEntry>, DomainError>;

    /// Find an entry by its derived ID
    async fn find_by_id(&self, id: &str) -> Result<Option<ProgressEntry>, DomainError>;

    /// Insert or overwrite the entry stored under `entry.id`
    async fn upsert(&self, entry: ProgressEntry) -> Result<ProgressEntry, DomainError>;

    /// Remove the entry stored under `entry.id` if there is one, otherwise insert `entry`.
    ///
    /// Returns the inserted entry, or `None` when an existing one was removed.
    /// Concurrent toggles of one id are applied one after the other.
    async fn toggle(&self, entry: ProgressEntry) -> Result<Option<ProgressEntry>, DomainError>;

    /// Delete an entry; deleting a missing entry is not an error
    async fn delete(&self, id: &str) -> Result<(), DomainError>;
}
