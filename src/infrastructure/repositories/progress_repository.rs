//! SeaORM implementation of ProgressRepository

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{format_timestamp, parse_timestamp};
use crate::domain::{DomainError, ProgressEntry, ProgressFilter, ProgressRepository};
use crate::models::progress::{self, ActiveModel, Column, Entity as ProgressEntity};

/// SeaORM-based implementation of ProgressRepository
pub struct SeaOrmProgressRepository {
    db: DatabaseConnection,
    /// Held across the read and the write of a toggle
    toggle_lock: Arc<Mutex<()>>,
}

impl SeaOrmProgressRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            toggle_lock: Arc::new(Mutex::new(())),
        }
    }
}

fn to_active_model(entry: &ProgressEntry) -> ActiveModel {
    ActiveModel {
        id: Set(entry.id.clone()),
        challenge_id: Set(entry.challenge_id.clone()),
        user_id: Set(entry.user_id.clone()),
        day: Set(entry.day),
        value: Set(entry.value),
        logged_at: Set(format_timestamp(entry.logged_at)),
    }
}

/// Insert or overwrite by id on any connection or transaction.
async fn upsert_on<C: ConnectionTrait>(conn: &C, entry: &ProgressEntry) -> Result<(), DomainError> {
    // Same id means same (challenge, user, day): overwrite, never duplicate
    ProgressEntity::insert(to_active_model(entry))
        .on_conflict(
            OnConflict::column(Column::Id)
                .update_columns([Column::Value, Column::LoggedAt])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

impl TryFrom<progress::Model> for ProgressEntry {
    type Error = DomainError;

    fn try_from(model: progress::Model) -> Result<Self, Self::Error> {
        Ok(ProgressEntry {
            logged_at: parse_timestamp(&model.logged_at)?,
            id: model.id,
            challenge_id: model.challenge_id,
            user_id: model.user_id,
            day: model.day,
            value: model.value,
        })
    }
}

#[async_trait]
impl ProgressRepository for SeaOrmProgressRepository {
    async fn find_all(&self, filter: ProgressFilter) -> Result<Vec<ProgressEntry>, DomainError> {
        let mut query = ProgressEntity::find();

        if let Some(challenge_id) = filter.challenge_id {
            query = query.filter(Column::ChallengeId.eq(challenge_id));
        }

        if let Some(user_id) = filter.user_id {
            query = query.filter(Column::UserId.eq(user_id));
        }

        let entries = query
            .order_by_asc(Column::LoggedAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;

        entries.into_iter().map(ProgressEntry::try_from).collect()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ProgressEntry>, DomainError> {
        ProgressEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(ProgressEntry::try_from)
            .transpose()
    }

    async fn upsert(&self, entry: ProgressEntry) -> Result<ProgressEntry, DomainError> {
        upsert_on(&self.db, &entry).await?;
        Ok(entry)
    }

    async fn toggle(&self, entry: ProgressEntry) -> Result<Option<ProgressEntry>, DomainError> {
        let _guard = self.toggle_lock.lock().await;
        let txn = self.db.begin().await?;

        let removed = ProgressEntity::delete_by_id(entry.id.as_str())
            .exec(&txn)
            .await?
            .rows_affected
            > 0;
        if !removed {
            upsert_on(&txn, &entry).await?;
        }

        txn.commit().await?;
        Ok(if removed { None } else { Some(entry) })
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        ProgressEntity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}
