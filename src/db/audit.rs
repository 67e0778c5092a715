use sqlx::PgPool;
use uuid::Uuid;

pub async fn log_event(
    pool: &PgPool,
    user_id: Option<Uuid>,
    action: &str,
    details: Option<serde_json::Value>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO audit_events (user_id, action, details)
         VALUES ($1, $2, $3)",
    )
    .bind(user_id)
    .bind(action)
    .bind(details)
    .execute(pool)
    .await?;
    Ok(())
}
