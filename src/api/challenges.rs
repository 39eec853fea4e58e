use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::auth::Claims;
use crate::domain::{Challenge, CreateChallengeInput, DomainError, UpdateChallengeInput};
use crate::infrastructure::AppState;
use crate::services::challenge_service;

#[derive(Debug, Default, Deserialize)]
pub struct ListChallengesQuery {
    /// Search text matched against title and goal
    pub q: Option<String>,
    /// Only challenges created by this user
    pub owner: Option<String>,
}

/// Browse challenges, newest first
pub async fn list_challenges(
    State(state): State<AppState>,
    Query(query): Query<ListChallengesQuery>,
) -> Result<Json<Vec<Challenge>>, DomainError> {
    let all = state.challenges().await?;

    let mut found = match query.owner.as_deref() {
        Some(owner) => challenge_service::owned_by(&all, owner),
        None => all.to_vec(),
    };
    if let Some(q) = query.q.as_deref() {
        found = challenge_service::search_challenges(&found, q);
    }
    found.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(found))
}

pub async fn get_challenge(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Challenge>, DomainError> {
    let challenge = state
        .challenge_repo
        .find_by_id(&id)
        .await?
        .ok_or(DomainError::NotFound)?;

    Ok(Json(challenge))
}

pub async fn create_challenge(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<CreateChallengeInput>,
) -> Result<impl IntoResponse, DomainError> {
    let challenge = challenge_service::create_challenge(
        state.challenge_repo.as_ref(),
        claims.user_id(),
        payload,
    )
    .await?;

    state.refresh_challenges().await;

    Ok((StatusCode::CREATED, Json(challenge)))
}

pub async fn update_challenge(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<String>,
    Json(payload): Json<UpdateChallengeInput>,
) -> Result<Json<Challenge>, DomainError> {
    let challenge = challenge_service::update_challenge(
        state.challenge_repo.as_ref(),
        claims.user_id(),
        &id,
        payload,
    )
    .await?;

    state.refresh_challenges().await;

    Ok(Json(challenge))
}

pub async fn delete_challenge(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<String>,
) -> Result<StatusCode, DomainError> {
    challenge_service::delete_challenge(state.challenge_repo.as_ref(), claims.user_id(), &id)
        .await?;

    state.refresh_challenges().await;

    Ok(StatusCode::NO_CONTENT)
}
