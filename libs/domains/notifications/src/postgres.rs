use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use tokio::sync::RwLock;
use tracing::instrument;

use crate::{
    entity::{self, to_db_id},
    error::NotificationResult,
    models::{Email, NewEmail, Pagination},
    repository::EmailsRepository,
};

/// Communication log in PostgreSQL
///
/// Saves take the write half of `lock` and reads the read half, so a reader
/// never observes a save halfway through on this instance.
pub struct PgEmailsRepository {
    db: DatabaseConnection,
    lock: RwLock<()>,
}

impl PgEmailsRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            lock: RwLock::new(()),
        }
    }
}

#[async_trait]
impl EmailsRepository for PgEmailsRepository {
    #[instrument(skip(self, email), fields(user_id = email.user_id))]
    async fn save_communication(&self, email: NewEmail) -> NotificationResult<u64> {
        let active_model: entity::ActiveModel = email.try_into()?;

        let _guard = self.lock.write().await;
        let result = entity::Entity::insert(active_model).exec(&self.db).await?;

        tracing::debug!(email_id = result.last_insert_id, "Saved email communication");
        Ok(result.last_insert_id as u64)
    }

    #[instrument(skip(self))]
    async fn get_user_communications(
        &self,
        user_id: u64,
        pagination: Option<Pagination>,
    ) -> NotificationResult<Vec<Email>> {
        let pagination = pagination.unwrap_or_default();

        let mut query = entity::Entity::find()
            .filter(entity::Column::UserId.eq(to_db_id(user_id)?))
            .order_by_desc(entity::Column::Id);

        if let Some(limit) = pagination.limit {
            query = query.limit(limit);
        }
        if let Some(offset) = pagination.offset {
            query = query.offset(offset);
        }

        let _guard = self.lock.read().await;
        let models = query.all(&self.db).await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn count_user_communications(&self, user_id: u64) -> NotificationResult<u64> {
        let _guard = self.lock.read().await;
        let count = entity::Entity::find()
            .filter(entity::Column::UserId.eq(to_db_id(user_id)?))
            .count(&self.db)
            .await?;

        Ok(count)
    }
}
