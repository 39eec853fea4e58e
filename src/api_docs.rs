use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::leaderboard::challenge_leaderboard,
        api::leaderboard::global_leaderboard,
    ),
    components(
        schemas(
            api::leaderboard::ChallengeLeaderboardView,
            crate::services::ChallengeLeaderboardRow,
            crate::services::GlobalLeaderboardRow,
        )
    ),
    tags(
        (name = "streakboard", description = "Streakboard API")
    )
)]
pub struct ApiDoc;
