use axum::{extract::State, Json};
use serde::Serialize;

use crate::auth::Claims;
use crate::domain::{Challenge, DomainError};
use crate::infrastructure::AppState;
use crate::services::challenge_service::{self, DashboardStats};

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub stats: DashboardStats,
    pub challenges: Vec<Challenge>,
}

/// The caller's own challenges with summary counts
pub async fn get_dashboard(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<DashboardView>, DomainError> {
    let all = state.challenges().await?;
    let challenges = challenge_service::owned_by(&all, claims.user_id());

    Ok(Json(DashboardView {
        stats: challenge_service::dashboard_stats(&challenges),
        challenges,
    }))
}
