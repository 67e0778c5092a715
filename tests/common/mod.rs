#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use tokio::sync::Notify;
use uuid::Uuid;

use forgot_password::auth::password;
use forgot_password::config::{Config, ForgotPasswordConfig};
use forgot_password::models::User;
use forgot_password::notify::{Notifier, NotifyError};
use forgot_password::reset::observer::ResetObserver;
use forgot_password::reset::{PasswordResetCoordinator, ResetPolicy};
use forgot_password::store::{MemoryUserStore, StoreError, UserField, UserStore};

pub const OLD_PASSWORD: &str = "password";

/// Memory store that counts every call and can be switched to fail.
#[derive(Default)]
pub struct SpyStore {
    pub inner: MemoryUserStore,
    pub finds: AtomicUsize,
    pub updates: AtomicUsize,
    pub fail: AtomicBool,
}

impl SpyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.finds.load(Ordering::SeqCst) + self.updates.load(Ordering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("spy store switched off".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UserStore for SpyStore {
    async fn find(&self, field: UserField, value: &str) -> Result<Option<User>, StoreError> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.find(field, value).await
    }

    async fn update(&self, user: &User) -> Result<User, StoreError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.update(user).await
    }

    async fn set_reset_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.set_reset_token(user_id, token, expires_at).await
    }

    async fn update_if_token(
        &self,
        user: &User,
        expected: &str,
    ) -> Result<Option<User>, StoreError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.update_if_token(user, expected).await
    }
}

/// One-shot pause point. The first caller to [`Gate::pass`] after
/// [`Gate::arm`] stops there until [`Gate::release`].
#[derive(Default)]
pub struct Gate {
    armed: AtomicBool,
    reached: Notify,
    released: Notify,
}

impl Gate {
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    /// Wait until a caller is parked at the gate.
    pub async fn reached(&self) {
        self.reached.notified().await;
    }

    pub fn release(&self) {
        self.released.notify_one();
    }

    async fn pass(&self) {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.reached.notify_one();
            self.released.notified().await;
        }
    }
}

/// Memory store whose writes can be held just before they apply, so a
/// second request can run in between.
#[derive(Default)]
pub struct GatedStore {
    pub inner: MemoryUserStore,
    /// Held inside `set_reset_token`.
    pub issue: Gate,
    /// Held inside `update_if_token`, after the caller's lookup.
    pub swap: Gate,
}

#[async_trait]
impl UserStore for GatedStore {
    async fn find(&self, field: UserField, value: &str) -> Result<Option<User>, StoreError> {
        self.inner.find(field, value).await
    }

    async fn update(&self, user: &User) -> Result<User, StoreError> {
        self.inner.update(user).await
    }

    async fn set_reset_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        self.issue.pass().await;
        self.inner.set_reset_token(user_id, token, expires_at).await
    }

    async fn update_if_token(
        &self,
        user: &User,
        expected: &str,
    ) -> Result<Option<User>, StoreError> {
        self.swap.pass().await;
        self.inner.update_if_token(user, expected).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentReset {
    pub name: String,
    pub email: String,
    pub token: String,
}

/// Notifier that keeps every reset it was asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<SentReset>>,
}

impl RecordingNotifier {
    pub fn last_token(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|s| s.token.clone())
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_reset(
        &self,
        recipient_name: &str,
        recipient_email: &str,
        token: &str,
    ) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(SentReset {
            name: recipient_name.to_string(),
            email: recipient_email.to_string(),
            token: token.to_string(),
        });
        Ok(())
    }
}

pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send_reset(&self, _: &str, _: &str, _: &str) -> Result<(), NotifyError> {
        Err(NotifyError::from("smtp relay refused connection"))
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    pub issued: Mutex<Vec<String>>,
    pub completed: Mutex<Vec<String>>,
}

impl ResetObserver for RecordingObserver {
    fn on_issued(&self, user: &User) {
        self.issued.lock().unwrap().push(user.email.clone());
    }

    fn on_completed(&self, user: &User) {
        self.completed.lock().unwrap().push(user.email.clone());
    }
}

/// Coordinator wired to spies, with handles to each of them.
pub struct Harness {
    pub store: Arc<SpyStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub observer: Arc<RecordingObserver>,
    pub coordinator: PasswordResetCoordinator,
}

impl Harness {
    pub fn new(ttl: Duration) -> Self {
        let store = Arc::new(SpyStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let observer = Arc::new(RecordingObserver::default());
        let coordinator = PasswordResetCoordinator::new(
            store.clone(),
            notifier.clone(),
            ResetPolicy {
                token_ttl: ttl,
                honor_user_cost: true,
            },
        )
        .with_observer(observer.clone());

        Self {
            store,
            notifier,
            observer,
            coordinator,
        }
    }

    pub fn seed(&self, name: &str, email: &str) -> User {
        seed_user(&self.store.inner, name, email, OLD_PASSWORD)
    }

    pub fn user(&self, id: Uuid) -> User {
        self.store.inner.get(id).expect("seeded user missing")
    }
}

/// Shareable coordinator over a [`GatedStore`], for racing calls from
/// spawned tasks.
pub struct GatedHarness {
    pub store: Arc<GatedStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub observer: Arc<RecordingObserver>,
    pub coordinator: Arc<PasswordResetCoordinator>,
}

impl GatedHarness {
    pub fn new(ttl: Duration) -> Self {
        let store = Arc::new(GatedStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let observer = Arc::new(RecordingObserver::default());
        let coordinator = PasswordResetCoordinator::new(
            store.clone(),
            notifier.clone(),
            ResetPolicy {
                token_ttl: ttl,
                honor_user_cost: true,
            },
        )
        .with_observer(observer.clone());

        Self {
            store,
            notifier,
            observer,
            coordinator: Arc::new(coordinator),
        }
    }

    pub fn seed(&self, name: &str, email: &str) -> User {
        seed_user(&self.store.inner, name, email, OLD_PASSWORD)
    }

    pub fn user(&self, id: Uuid) -> User {
        self.store.inner.get(id).expect("seeded user missing")
    }
}

pub fn seed_user(store: &MemoryUserStore, name: &str, email: &str, plain: &str) -> User {
    let hash = password::hash(plain).expect("hashing seed password");
    store.insert(User::new(name, email, hash))
}

pub fn test_config(rest: bool, ttl: Duration) -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: "http://localhost:0".to_string(),
        app_name: "Test App".to_string(),
        log_level: "warn".to_string(),
        forgot_password: ForgotPasswordConfig {
            route: "/forgot-password".to_string(),
            rest,
            policy: ResetPolicy {
                token_ttl: ttl,
                honor_user_cost: true,
            },
        },
        smtp: None,
    }
}

/// A running test server backed by an in-memory store.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: Arc<SpyStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn seed(&self, name: &str, email: &str) -> User {
        seed_user(&self.store.inner, name, email, OLD_PASSWORD)
    }

    pub fn user(&self, id: Uuid) -> User {
        self.store.inner.get(id).expect("seeded user missing")
    }
}

pub async fn spawn_app(rest: bool, ttl: Duration) -> TestApp {
    let config = test_config(rest, ttl);
    let store = Arc::new(SpyStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let coordinator = PasswordResetCoordinator::new(
        store.clone(),
        notifier.clone(),
        config.forgot_password.policy.clone(),
    );

    let app = forgot_password::build_app(coordinator, config);

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        store,
        notifier,
    }
}
