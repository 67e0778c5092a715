use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use super::{StoreError, UserField, UserStore};
use crate::models::User;

/// Process-local user store keyed by user id.
#[derive(Default)]
pub struct MemoryUserStore {
    users: DashMap<Uuid, User>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: User) -> User {
        self.users.insert(user.id, user.clone());
        user
    }

    pub fn get(&self, id: Uuid) -> Option<User> {
        self.users.get(&id).map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find(&self, field: UserField, value: &str) -> Result<Option<User>, StoreError> {
        let found = self.users.iter().find(|entry| {
            let user = entry.value();
            match field {
                UserField::Email => user.email == value,
                UserField::ResetToken => user.reset_token.as_deref() == Some(value),
            }
        });
        Ok(found.map(|entry| entry.value().clone()))
    }

    async fn update(&self, user: &User) -> Result<User, StoreError> {
        let mut stored = self
            .users
            .get_mut(&user.id)
            .ok_or(StoreError::MissingUser(user.id))?;
        *stored = user.clone();
        Ok(user.clone())
    }

    async fn set_reset_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        let mut stored = self
            .users
            .get_mut(&user_id)
            .ok_or(StoreError::MissingUser(user_id))?;
        stored.reset_token = Some(token.to_string());
        stored.reset_token_expires_at = Some(expires_at);
        Ok(stored.clone())
    }

    async fn update_if_token(
        &self,
        user: &User,
        expected: &str,
    ) -> Result<Option<User>, StoreError> {
        let mut stored = self
            .users
            .get_mut(&user.id)
            .ok_or(StoreError::MissingUser(user.id))?;
        if stored.reset_token.as_deref() != Some(expected) {
            return Ok(None);
        }
        stored.password_hash = user.password_hash.clone();
        stored.reset_token = user.reset_token.clone();
        stored.reset_token_expires_at = user.reset_token_expires_at;
        Ok(Some(stored.clone()))
    }
}
