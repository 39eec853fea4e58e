//! SeaORM implementation of ChallengeRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp};
use crate::domain::{
    Challenge, ChallengeFilter, ChallengeRepository, CreateChallengeInput, DomainError,
    UpdateChallengeInput,
};
use crate::models::challenge::{self, ActiveModel, Column, Entity as ChallengeEntity};

/// SeaORM-based implementation of ChallengeRepository
pub struct SeaOrmChallengeRepository {
    db: DatabaseConnection,
}

impl SeaOrmChallengeRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl TryFrom<challenge::Model> for Challenge {
    type Error = DomainError;

    fn try_from(model: challenge::Model) -> Result<Self, Self::Error> {
        Ok(Challenge {
            created_at: parse_timestamp(&model.created_at)?,
            id: model.id,
            title: model.title,
            goal: model.goal,
            duration: model.duration,
            owner_id: model.owner_id,
        })
    }
}

#[async_trait]
impl ChallengeRepository for SeaOrmChallengeRepository {
    async fn find_all(&self, filter: ChallengeFilter) -> Result<Vec<Challenge>, DomainError> {
        let mut query = ChallengeEntity::find();

        if let Some(owner_id) = filter.owner_id {
            query = query.filter(Column::OwnerId.eq(owner_id));
        }

        let challenges = query
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await?;

        challenges.into_iter().map(Challenge::try_from).collect()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Challenge>, DomainError> {
        ChallengeEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Challenge::try_from)
            .transpose()
    }

    async fn create(
        &self,
        owner_id: &str,
        input: CreateChallengeInput,
    ) -> Result<Challenge, DomainError> {
        let now = format_timestamp(chrono::Utc::now());

        let new_challenge = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            title: Set(input.title),
            goal: Set(input.goal),
            duration: Set(input.duration),
            owner_id: Set(owner_id.to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        let result = new_challenge.insert(&self.db).await?;
        Challenge::try_from(result)
    }

    async fn update(
        &self,
        id: &str,
        input: UpdateChallengeInput,
    ) -> Result<Challenge, DomainError> {
        let existing = ChallengeEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        active.title = Set(input.title);
        active.goal = Set(input.goal);
        active.duration = Set(input.duration);
        active.updated_at = Set(format_timestamp(chrono::Utc::now()));

        let updated = active.update(&self.db).await?;
        Challenge::try_from(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let result = ChallengeEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        Ok(())
    }
}
