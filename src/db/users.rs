use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::User;

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_reset_token(
    pool: &PgPool,
    token: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE reset_token = $1")
        .bind(token)
        .fetch_optional(pool)
        .await
}

/// Write the mutable fields of `user`. Returns `None` if the row is gone.
pub async fn update(pool: &PgPool, user: &User) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "UPDATE users
         SET name = $2, email = $3, password_hash = $4,
             reset_token = $5, reset_token_expires_at = $6
         WHERE id = $1 RETURNING *",
    )
    .bind(user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.reset_token)
    .bind(user.reset_token_expires_at)
    .fetch_optional(pool)
    .await
}

/// Store a new reset token. Touches only the two reset columns.
pub async fn set_reset_token(
    pool: &PgPool,
    id: Uuid,
    token: &str,
    expires_at: DateTime<Utc>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "UPDATE users
         SET reset_token = $2, reset_token_expires_at = $3
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(token)
    .bind(expires_at)
    .fetch_optional(pool)
    .await
}

/// Write the password hash and reset columns of `user`, but only while the
/// stored reset token still equals `expected`. Returns `None` when another
/// request got there first.
pub async fn update_if_token(
    pool: &PgPool,
    user: &User,
    expected: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "UPDATE users
         SET password_hash = $2, reset_token = $3, reset_token_expires_at = $4
         WHERE id = $1 AND reset_token = $5 RETURNING *",
    )
    .bind(user.id)
    .bind(&user.password_hash)
    .bind(&user.reset_token)
    .bind(user.reset_token_expires_at)
    .bind(expected)
    .fetch_optional(pool)
    .await
}
