//! Repository implementations using SeaORM

pub mod challenge_repository;
pub mod progress_repository;

pub use challenge_repository::SeaOrmChallengeRepository;
pub use progress_repository::SeaOrmProgressRepository;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::DomainError;

/// Fixed-width UTC timestamp so text ordering matches time ordering.
fn format_timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored RFC 3339 timestamp.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DomainError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| DomainError::Internal(format!("bad timestamp '{}': {}", raw, e)))
}
