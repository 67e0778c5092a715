use serde_json::json;
use sqlx::PgPool;

use crate::models::User;

/// Hooks invoked after reset state has been persisted.
pub trait ResetObserver: Send + Sync {
    /// A token was stored and the notification was accepted.
    fn on_issued(&self, _user: &User) {}

    /// A token was consumed and the new credential stored.
    fn on_completed(&self, _user: &User) {}
}

pub struct TracingObserver;

impl ResetObserver for TracingObserver {
    fn on_issued(&self, user: &User) {
        tracing::info!("Password reset link sent to user {}", user.id);
    }

    fn on_completed(&self, user: &User) {
        tracing::info!("Password changed via reset link for user {}", user.id);
    }
}

/// Records reset events in `audit_events`. Writes run in the background and
/// failures are logged only.
pub struct AuditObserver {
    pool: PgPool,
}

impl AuditObserver {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn record(&self, user: &User, action: &'static str) {
        let pool = self.pool.clone();
        let user_id = user.id;
        let details = json!({ "email": user.email });

        tokio::spawn(async move {
            if let Err(e) =
                crate::db::audit::log_event(&pool, Some(user_id), action, Some(details)).await
            {
                tracing::error!("Failed to log audit event: {e}");
            }
        });
    }
}

impl ResetObserver for AuditObserver {
    fn on_issued(&self, user: &User) {
        self.record(user, "password_reset.requested");
    }

    fn on_completed(&self, user: &User) {
        self.record(user, "password_reset.completed");
    }
}
