//! Challenge Service - owner-checked writes and the browse/dashboard views

use serde::Serialize;

use crate::domain::{
    Challenge, ChallengeRepository, CreateChallengeInput, DomainError, UpdateChallengeInput,
};

/// Challenges up to this many days count as "active" on the dashboard
pub const ACTIVE_MAX_DURATION: i32 = 30;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_created: usize,
    pub active_challenges: usize,
    pub long_term_challenges: usize,
}

fn validate(title: &str, goal: &str, duration: i32) -> Result<(String, String), DomainError> {
    let title = title.trim();
    let goal = goal.trim();

    if title.is_empty() {
        return Err(DomainError::Validation("title is required".to_string()));
    }
    if goal.is_empty() {
        return Err(DomainError::Validation("goal is required".to_string()));
    }
    if duration < 1 {
        return Err(DomainError::Validation(format!(
            "duration must be at least 1 day, got {}",
            duration
        )));
    }

    Ok((title.to_string(), goal.to_string()))
}

/// Load a challenge and make sure `caller` owns it.
async fn owned_challenge(
    repo: &dyn ChallengeRepository,
    caller: &str,
    id: &str,
) -> Result<Challenge, DomainError> {
    let challenge = repo.find_by_id(id).await?.ok_or(DomainError::NotFound)?;

    if challenge.owner_id != caller {
        tracing::warn!("{} tried to modify challenge {} owned by {}", caller, id, challenge.owner_id);
        return Err(DomainError::Forbidden(
            "only the owner can modify a challenge".to_string(),
        ));
    }

    Ok(challenge)
}

pub async fn create_challenge(
    repo: &dyn ChallengeRepository,
    owner_id: &str,
    input: CreateChallengeInput,
) -> Result<Challenge, DomainError> {
    let (title, goal) = validate(&input.title, &input.goal, input.duration)?;

    let challenge = repo
        .create(
            owner_id,
            CreateChallengeInput {
                title,
                goal,
                duration: input.duration,
            },
        )
        .await?;

    tracing::info!("Challenge {} created by {}", challenge.id, owner_id);
    Ok(challenge)
}

pub async fn update_challenge(
    repo: &dyn ChallengeRepository,
    caller: &str,
    id: &str,
    input: UpdateChallengeInput,
) -> Result<Challenge, DomainError> {
    owned_challenge(repo, caller, id).await?;
    let (title, goal) = validate(&input.title, &input.goal, input.duration)?;

    repo.update(
        id,
        UpdateChallengeInput {
            title,
            goal,
            duration: input.duration,
        },
    )
    .await
}

/// Delete a challenge. Its progress entries are left in place.
pub async fn delete_challenge(
    repo: &dyn ChallengeRepository,
    caller: &str,
    id: &str,
) -> Result<(), DomainError> {
    owned_challenge(repo, caller, id).await?;
    repo.delete(id).await?;
    tracing::info!("Challenge {} deleted by {}", id, caller);
    Ok(())
}

/// Case-insensitive match on title or goal; a blank query matches everything.
pub fn search_challenges(challenges: &[Challenge], query: &str) -> Vec<Challenge> {
    let needle = query.trim().to_lowercase();
    challenges
        .iter()
        .filter(|c| {
            needle.is_empty()
                || c.title.to_lowercase().contains(&needle)
                || c.goal.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Challenges created by `owner_id`, newest first.
pub fn owned_by(challenges: &[Challenge], owner_id: &str) -> Vec<Challenge> {
    let mut owned: Vec<Challenge> = challenges
        .iter()
        .filter(|c| c.owner_id == owner_id)
        .cloned()
        .collect();
    owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    owned
}

pub fn dashboard_stats(challenges: &[Challenge]) -> DashboardStats {
    let active_challenges = challenges
        .iter()
        .filter(|c| c.duration <= ACTIVE_MAX_DURATION)
        .count();

    DashboardStats {
        total_created: challenges.len(),
        active_challenges,
        long_term_challenges: challenges.len() - active_challenges,
    }
}
