use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreError, UserField, UserStore};
use crate::db;
use crate::models::User;

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find(&self, field: UserField, value: &str) -> Result<Option<User>, StoreError> {
        tracing::debug!("Looking up user by {}", field.as_str());
        let user = match field {
            UserField::Email => db::users::find_by_email(&self.pool, value).await?,
            UserField::ResetToken => db::users::find_by_reset_token(&self.pool, value).await?,
        };
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, StoreError> {
        db::users::update(&self.pool, user)
            .await?
            .ok_or(StoreError::MissingUser(user.id))
    }

    async fn set_reset_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        db::users::set_reset_token(&self.pool, user_id, token, expires_at)
            .await?
            .ok_or(StoreError::MissingUser(user_id))
    }

    async fn update_if_token(
        &self,
        user: &User,
        expected: &str,
    ) -> Result<Option<User>, StoreError> {
        Ok(db::users::update_if_token(&self.pool, user, expected).await?)
    }
}
