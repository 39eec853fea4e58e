use crate::domain::{ChallengeFilter, CreateChallengeInput, DomainError};
use crate::infrastructure::AppState;
use crate::services::{challenge_service, progress_service};

/// Demo challenges and a few logged days. Does nothing if challenges exist.
pub async fn seed_demo_data(state: &AppState) -> Result<(), DomainError> {
    let existing = state
        .challenge_repo
        .find_all(ChallengeFilter::default())
        .await?;
    if !existing.is_empty() {
        tracing::info!("Skipping demo seed, {} challenges present", existing.len());
        return Ok(());
    }

    // 1. Create Challenges
    let challenges = vec![
        ("demo-alice", "Morning Run", "Run 5k before breakfast", 30),
        ("demo-alice", "Plank Month", "Hold a plank for 2 minutes", 60),
        ("demo-bob", "Pushup Week", "100 pushups a day", 7),
    ];

    let mut created = Vec::new();
    for (owner, title, goal, duration) in challenges {
        let challenge = challenge_service::create_challenge(
            state.challenge_repo.as_ref(),
            owner,
            CreateChallengeInput {
                title: title.to_string(),
                goal: goal.to_string(),
                duration,
            },
        )
        .await?;
        created.push(challenge);
    }

    // 2. Log Progress
    let logs: [(&str, usize, i32); 4] = [
        ("demo-alice", 0, 5),
        ("demo-bob", 0, 2),
        ("demo-bob", 2, 6),
        ("demo-carol", 1, 12),
    ];

    for (user, challenge_idx, days) in logs {
        let challenge_id = &created[challenge_idx].id;
        for day in 1..=days {
            progress_service::toggle_day(state.progress_repo.as_ref(), challenge_id, user, day)
                .await?;
        }
    }

    state.refresh_all().await;
    Ok(())
}
