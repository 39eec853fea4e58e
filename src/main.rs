use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use streakboard::infrastructure::AppState;
use streakboard::{auth, config, db, seed, server};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "streakboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    // Check for --profile CLI argument
    let args: Vec<String> = std::env::args().collect();
    if let Some(pos) = args.iter().position(|arg| arg == "--profile") {
        if let Some(val) = args.get(pos + 1) {
            std::env::set_var("PROFILE", val);
        }
    }

    let config = config::Config::from_env();
    tracing::info!("Starting streakboard (profile: {})", config.profile);

    // A missing signing secret fails here, not per request
    if let Err(e) = auth::jwt_secret() {
        tracing::error!("Invalid auth configuration: {}", e);
        std::process::exit(1);
    }

    // Initialize database
    let db = db::init_db(&config.database_url)
        .await
        .expect("Failed to initialize database");

    let state = AppState::new(db);

    // Check for seed flag
    if config.seed_demo {
        tracing::info!("Seeding demo data...");
        if let Err(e) = seed::seed_demo_data(&state).await {
            tracing::error!("Failed to seed data: {}", e);
        } else {
            tracing::info!("Demo data seeded successfully.");
        }
    }

    // First snapshot of both collections before serving
    state.refresh_all().await;

    let (_port, handle) = server::start_server(state, config.port, &config.cors_allowed_origins)
        .await
        .expect("Failed to start server");

    if let Err(e) = handle.await {
        tracing::error!("Server task ended abnormally: {}", e);
    }
}
