use axum::{
    extract::{Path, State},
    Json,
};

use crate::auth::Claims;
use crate::domain::{Challenge, DomainError};
use crate::infrastructure::AppState;
use crate::services::progress_service::{self, ChartPoint, ProgressSummary, ToggleOutcome};

async fn load_challenge(state: &AppState, id: &str) -> Result<Challenge, DomainError> {
    state
        .challenge_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)
}

/// The caller's completed days in a challenge
pub async fn my_progress(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<String>,
) -> Result<Json<ProgressSummary>, DomainError> {
    let challenge = load_challenge(&state, &id).await?;
    let progress = state.progress().await?;

    Ok(Json(progress_service::progress_summary(
        &progress,
        &challenge.id,
        challenge.duration,
        claims.user_id(),
    )))
}

/// Mark a day done, or undo it
pub async fn toggle_day(
    State(state): State<AppState>,
    claims: Claims,
    Path((id, day)): Path<(String, i32)>,
) -> Result<Json<ToggleOutcome>, DomainError> {
    let challenge = load_challenge(&state, &id).await?;

    let outcome = progress_service::toggle_day(
        state.progress_repo.as_ref(),
        &challenge.id,
        claims.user_id(),
        day,
    )
    .await?;

    state.refresh_progress().await;

    Ok(Json(outcome))
}

/// The caller's value for every day of a challenge
pub async fn my_chart(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<String>,
) -> Result<Json<Vec<ChartPoint>>, DomainError> {
    let challenge = load_challenge(&state, &id).await?;
    let progress = state.progress().await?;

    let mine: Vec<_> = progress
        .iter()
        .filter(|p| p.challenge_id == challenge.id && p.user_id == claims.user_id())
        .cloned()
        .collect();

    Ok(Json(progress_service::chart_series(&mine, challenge.duration)))
}
