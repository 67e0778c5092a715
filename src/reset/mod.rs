//! Password reset token lifecycle.
//!
//! Per user: no active reset, or one pending token with an expiry. Issuing
//! stores a token, a successful password change consumes it, and any access
//! at or after the expiry clears it. All state lives in the [`UserStore`].

pub mod observer;
pub mod token;

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::auth::password;
use crate::models::User;
use crate::notify::{Notifier, NotifyError};
use crate::store::{StoreError, UserField, UserStore};

use observer::ResetObserver;

pub const INVALID_EMAIL: &str = "Email is invalid";
pub const MISSING_PASSWORD: &str = "Please enter a password";

#[derive(Debug, Clone)]
pub struct ResetPolicy {
    /// Lifetime of an issued token.
    pub token_ttl: Duration,
    /// Reuse the Argon2 cost recorded in the user's current hash.
    pub honor_user_cost: bool,
}

impl Default for ResetPolicy {
    fn default() -> Self {
        Self {
            token_ttl: Duration::days(1),
            honor_user_cost: true,
        }
    }
}

/// Result of [`PasswordResetCoordinator::request_reset`]. Unknown addresses
/// also yield `Sent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    Sent,
    InvalidInput(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Token is live; a read does not consume it.
    Valid(String),
    /// Token consumed and the new password stored.
    Success,
    /// Token existed but its window has passed. It has been cleared.
    Expired,
    /// Malformed or unknown token.
    NotFound,
    InvalidInput(String),
}

#[derive(Debug)]
pub enum ResetError {
    Store(StoreError),
    Notify(NotifyError),
    Hash(String),
}

impl std::fmt::Display for ResetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResetError::Store(err) => write!(f, "User store failed: {err}"),
            ResetError::Notify(err) => write!(f, "Sending reset link failed: {err}"),
            ResetError::Hash(msg) => write!(f, "Password hashing failed: {msg}"),
        }
    }
}

impl std::error::Error for ResetError {}

impl From<StoreError> for ResetError {
    fn from(err: StoreError) -> Self {
        ResetError::Store(err)
    }
}

impl From<NotifyError> for ResetError {
    fn from(err: NotifyError) -> Self {
        ResetError::Notify(err)
    }
}

enum Lookup {
    Missing,
    Expired,
    Live(User),
}

pub struct PasswordResetCoordinator {
    store: Arc<dyn UserStore>,
    notifier: Arc<dyn Notifier>,
    observers: Vec<Arc<dyn ResetObserver>>,
    policy: ResetPolicy,
}

impl PasswordResetCoordinator {
    pub fn new(
        store: Arc<dyn UserStore>,
        notifier: Arc<dyn Notifier>,
        policy: ResetPolicy,
    ) -> Self {
        Self {
            store,
            notifier,
            observers: Vec::new(),
            policy,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ResetObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Issue a reset token for `email` and send it. Any earlier token of the
    /// same user is replaced.
    pub async fn request_reset(&self, email: &str) -> Result<RequestOutcome, ResetError> {
        if !token::is_valid_email(email) {
            return Ok(RequestOutcome::InvalidInput(INVALID_EMAIL.to_string()));
        }

        let Some(user) = self.store.find(UserField::Email, email).await? else {
            tracing::debug!("Password reset requested for unknown address");
            return Ok(RequestOutcome::Sent);
        };

        let token = token::generate();
        let expires_at = Utc::now() + self.policy.token_ttl;
        // Writes the reset fields only, never the hash read above.
        let user = self
            .store
            .set_reset_token(user.id, &token, expires_at)
            .await?;

        // The token is already stored; a failed send leaves it to expire.
        self.notifier
            .send_reset(&user.name, &user.email, &token)
            .await?;

        for observer in &self.observers {
            observer.on_issued(&user);
        }
        Ok(RequestOutcome::Sent)
    }

    /// Check a token from a reset link without consuming it.
    pub async fn resolve_token(&self, token: &str) -> Result<Resolution, ResetError> {
        if !token::is_well_formed(token) {
            return Ok(Resolution::NotFound);
        }

        Ok(match self.lookup(token).await? {
            Lookup::Missing => Resolution::NotFound,
            Lookup::Expired => Resolution::Expired,
            Lookup::Live(_) => Resolution::Valid(token.to_string()),
        })
    }

    /// Consume a token and replace the user's password.
    pub async fn complete_reset(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<Resolution, ResetError> {
        if !token::is_well_formed(token) {
            return Ok(Resolution::NotFound);
        }
        if new_password.is_empty() {
            return Ok(Resolution::InvalidInput(MISSING_PASSWORD.to_string()));
        }

        let mut user = match self.lookup(token).await? {
            Lookup::Missing => return Ok(Resolution::NotFound),
            Lookup::Expired => return Ok(Resolution::Expired),
            Lookup::Live(user) => user,
        };

        user.password_hash = self.hash_for(&user, new_password)?;
        user.clear_reset();

        let Some(user) = self.store.update_if_token(&user, token).await? else {
            tracing::warn!("Reset token for user {} was consumed concurrently", user.id);
            return Ok(Resolution::NotFound);
        };

        for observer in &self.observers {
            observer.on_completed(&user);
        }
        Ok(Resolution::Success)
    }

    async fn lookup(&self, token: &str) -> Result<Lookup, ResetError> {
        let Some(mut user) = self.store.find(UserField::ResetToken, token).await? else {
            return Ok(Lookup::Missing);
        };

        let live = user
            .reset_token_expires_at
            .is_some_and(|expires_at| Utc::now() < expires_at);
        if live {
            return Ok(Lookup::Live(user));
        }

        tracing::warn!("Expired reset token used for user {}", user.id);
        user.clear_reset();
        // Losing this race to a concurrent clear or a newer token is fine.
        self.store.update_if_token(&user, token).await?;
        Ok(Lookup::Expired)
    }

    fn hash_for(&self, user: &User, new_password: &str) -> Result<String, ResetError> {
        let params = if self.policy.honor_user_cost {
            password::cost_params(&user.password_hash)
        } else {
            None
        };

        let hashed = match params {
            Some(params) => password::hash_with_params(new_password, params),
            None => password::hash(new_password),
        };
        hashed.map_err(ResetError::Hash)
    }
}
