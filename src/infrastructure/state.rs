//! Application state containing repositories and the live collections

use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{
    Challenge, ChallengeFilter, ChallengeRepository, DomainError, ProgressEntry, ProgressFilter,
    ProgressRepository,
};
use crate::infrastructure::live::{LiveCollections, Snapshot};
use crate::infrastructure::{SeaOrmChallengeRepository, SeaOrmProgressRepository};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Challenge repository
    pub challenge_repo: Arc<dyn ChallengeRepository>,
    /// Progress repository
    pub progress_repo: Arc<dyn ProgressRepository>,
    /// Latest snapshot of each collection
    pub live: Arc<LiveCollections>,
    /// Serialises refreshes so an older read never overwrites a newer one
    refresh_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_repositories(
            Arc::new(SeaOrmChallengeRepository::new(db.clone())),
            Arc::new(SeaOrmProgressRepository::new(db)),
        )
    }

    pub fn with_repositories(
        challenge_repo: Arc<dyn ChallengeRepository>,
        progress_repo: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            challenge_repo,
            progress_repo,
            live: Arc::new(LiveCollections::new()),
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Re-read the challenges collection and push it to subscribers.
    pub async fn refresh_challenges(&self) {
        let _guard = self.refresh_lock.lock().await;
        match self.challenge_repo.find_all(ChallengeFilter::default()).await {
            Ok(rows) => self.live.challenges.publish(rows),
            Err(e) => {
                tracing::error!("Failed to load challenges: {}", e);
                self.live.challenges.fail(e.to_string());
            }
        }
    }

    /// Re-read the progress collection and push it to subscribers.
    pub async fn refresh_progress(&self) {
        let _guard = self.refresh_lock.lock().await;
        match self.progress_repo.find_all(ProgressFilter::default()).await {
            Ok(rows) => self.live.progress.publish(rows),
            Err(e) => {
                tracing::error!("Failed to load progress: {}", e);
                self.live.progress.fail(e.to_string());
            }
        }
    }

    pub async fn refresh_all(&self) {
        self.refresh_challenges().await;
        self.refresh_progress().await;
    }

    /// Reload whichever collection failed or never loaded.
    pub async fn reload_stale(&self) {
        if !self.live.challenges.current().is_ready() {
            self.refresh_challenges().await;
        }
        if !self.live.progress.current().is_ready() {
            self.refresh_progress().await;
        }
    }

    /// Current challenges. A failed or missing snapshot is reloaded once first.
    pub async fn challenges(&self) -> Result<Arc<Vec<Challenge>>, DomainError> {
        if let Snapshot::Ready(rows) = self.live.challenges.current() {
            return Ok(rows);
        }
        self.refresh_challenges().await;
        self.live.challenges.current().into_ready("challenges")
    }

    /// Current progress entries. A failed or missing snapshot is reloaded once first.
    pub async fn progress(&self) -> Result<Arc<Vec<ProgressEntry>>, DomainError> {
        if let Snapshot::Ready(rows) = self.live.progress.current() {
            return Ok(rows);
        }
        self.refresh_progress().await;
        self.live.progress.current().into_ready("progress")
    }
}
