pub mod challenges;
pub mod dashboard;
pub mod health;
pub mod leaderboard;
pub mod progress;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::domain::DomainError;
use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Challenges
        .route(
            "/challenges",
            get(challenges::list_challenges).post(challenges::create_challenge),
        )
        .route(
            "/challenges/:id",
            get(challenges::get_challenge)
                .put(challenges::update_challenge)
                .delete(challenges::delete_challenge),
        )
        // Per-challenge leaderboard
        .route(
            "/challenges/:id/leaderboard",
            get(leaderboard::challenge_leaderboard),
        )
        .route(
            "/challenges/:id/leaderboard/stream",
            get(leaderboard::challenge_leaderboard_stream),
        )
        // Progress
        .route("/challenges/:id/progress/me", get(progress::my_progress))
        .route(
            "/challenges/:id/progress/:day/toggle",
            post(progress::toggle_day),
        )
        .route("/challenges/:id/chart/me", get(progress::my_chart))
        // Global leaderboard
        .route("/leaderboard", get(leaderboard::global_leaderboard))
        .route(
            "/leaderboard/stream",
            get(leaderboard::global_leaderboard_stream),
        )
        // Dashboard
        .route("/dashboard", get(dashboard::get_dashboard))
        .with_state(state)
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = match &self {
            DomainError::NotFound => StatusCode::NOT_FOUND,
            DomainError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            DomainError::Database(_) | DomainError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        (
            status,
            Json(json!({ "error": self.to_string(), "retryable": self.is_retryable() })),
        )
            .into_response()
    }
}
