use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{Stream, StreamExt};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Challenge, DomainError, ProgressEntry};
use crate::infrastructure::AppState;
use crate::services::{
    compute_challenge_leaderboard, compute_global_leaderboard, watch_leaderboard,
    ChallengeLeaderboardRow, GlobalLeaderboardRow, LeaderboardUpdate,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ChallengeLeaderboardView {
    pub challenge_id: String,
    pub title: String,
    pub duration: i32,
    pub rows: Vec<ChallengeLeaderboardRow>,
}

/// Duration of `challenge_id` in a snapshot; 0 once it has been deleted.
fn duration_of(challenges: &[Challenge], challenge_id: &str) -> i32 {
    challenges
        .iter()
        .find(|c| c.id == challenge_id)
        .map(|c| c.duration)
        .unwrap_or(0)
}

fn to_events<R, S>(updates: S) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    R: Serialize,
    S: Stream<Item = LeaderboardUpdate<R>> + Send + 'static,
{
    let events = updates.map(|update| {
        Ok(Event::default()
            .event("leaderboard")
            .json_data(&update)
            .unwrap_or_else(|e| Event::default().event("error").data(e.to_string())))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

#[utoipa::path(
    get,
    path = "/api/challenges/{id}/leaderboard",
    params(("id" = String, Path, description = "Challenge id")),
    responses(
        (status = 200, description = "Participants ranked by completion", body = ChallengeLeaderboardView),
        (status = 404, description = "Unknown challenge"),
        (status = 503, description = "Progress could not be loaded")
    )
)]
pub async fn challenge_leaderboard(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ChallengeLeaderboardView>, DomainError> {
    let challenges = state.challenges().await?;
    let challenge = challenges
        .iter()
        .find(|c| c.id == id)
        .ok_or(DomainError::NotFound)?;

    let progress = state.progress().await?;
    let entries: Vec<ProgressEntry> = progress
        .iter()
        .filter(|p| p.challenge_id == challenge.id)
        .cloned()
        .collect();

    Ok(Json(ChallengeLeaderboardView {
        challenge_id: challenge.id.clone(),
        title: challenge.title.clone(),
        duration: challenge.duration,
        rows: compute_challenge_leaderboard(&entries, challenge.duration),
    }))
}

/// Server-sent events: the challenge leaderboard, recomputed on every change
pub async fn challenge_leaderboard_stream(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, DomainError> {
    if state.challenge_repo.find_by_id(&id).await?.is_none() {
        return Err(DomainError::NotFound);
    }
    state.reload_stale().await;

    let progress = {
        let id = id.clone();
        state
            .live
            .progress
            .subscribe_where(move |p: &ProgressEntry| p.challenge_id == id)
    };

    let updates = watch_leaderboard(
        state.live.challenges.subscribe(),
        progress,
        move |challenges: &[Challenge], entries: &[ProgressEntry]| {
            compute_challenge_leaderboard(entries, duration_of(challenges, &id))
        },
    );

    Ok(to_events(updates))
}

#[utoipa::path(
    get,
    path = "/api/leaderboard",
    responses(
        (status = 200, description = "Users ranked across every challenge they joined", body = [GlobalLeaderboardRow]),
        (status = 503, description = "Progress could not be loaded")
    )
)]
pub async fn global_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<GlobalLeaderboardRow>>, DomainError> {
    let progress = state.progress().await?;
    // Unknown challenges only shrink the denominator, so a failed feed is not fatal
    let challenges = match state.challenges().await {
        Ok(challenges) => challenges,
        Err(e) => {
            tracing::warn!("Global leaderboard ranked without challenge durations: {}", e);
            Default::default()
        }
    };

    Ok(Json(compute_global_leaderboard(&challenges, &progress)))
}

/// Server-sent events: the global leaderboard, recomputed on every change
pub async fn global_leaderboard_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    state.reload_stale().await;

    let updates = watch_leaderboard(
        state.live.challenges.subscribe(),
        state.live.progress.subscribe(),
        |challenges: &[Challenge], entries: &[ProgressEntry]| {
            compute_global_leaderboard(challenges, entries)
        },
    );

    to_events(updates)
}
