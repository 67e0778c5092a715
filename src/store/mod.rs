pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::User;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

/// Fields a user can be looked up by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Email,
    ResetToken,
}

impl UserField {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserField::Email => "email",
            UserField::ResetToken => "reset_token",
        }
    }
}

#[derive(Debug)]
pub enum StoreError {
    Database(sqlx::Error),
    MissingUser(Uuid),
    Unavailable(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Database(err) => write!(f, "Database error: {err}"),
            StoreError::MissingUser(id) => write!(f, "User {id} no longer exists"),
            StoreError::Unavailable(msg) => write!(f, "Store unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find(&self, field: UserField, value: &str) -> Result<Option<User>, StoreError>;

    /// Persist `user` unconditionally.
    async fn update(&self, user: &User) -> Result<User, StoreError>;

    /// Store a fresh reset token and its expiry, leaving every other field
    /// as it is in the store.
    async fn set_reset_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<User, StoreError>;

    /// Persist the password hash and reset fields of `user`, only if its
    /// stored reset token still equals `expected`. `Ok(None)` means the token
    /// was consumed or replaced in the meantime.
    async fn update_if_token(
        &self,
        user: &User,
        expected: &str,
    ) -> Result<Option<User>, StoreError>;
}
