pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod models;
pub mod notify;
pub mod reset;
pub mod routes;
pub mod state;
pub mod store;
pub mod views;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::email::SystemMailer;
use crate::notify::{LogNotifier, Notifier};
use crate::reset::PasswordResetCoordinator;
use crate::state::{AppState, SharedState};

/// Pick the notifier for `config`: SMTP when configured, the log otherwise.
pub fn build_notifier(config: &Config) -> Arc<dyn Notifier> {
    let link_base = format!("{}{}", config.base_url, config.forgot_password.route);

    match config.smtp.as_ref() {
        Some(smtp) => match SystemMailer::new(
            smtp,
            &config.app_name,
            link_base.clone(),
            config.forgot_password.policy.token_ttl,
        ) {
            Ok(mailer) => {
                tracing::info!("System SMTP configured");
                Arc::new(mailer)
            }
            Err(e) => {
                tracing::warn!("System SMTP not available: {e}");
                Arc::new(LogNotifier::new(link_base))
            }
        },
        None => Arc::new(LogNotifier::new(link_base)),
    }
}

/// Mount the presentation adapter selected by `config.forgot_password.rest`
/// around `coordinator`.
pub fn build_app(coordinator: PasswordResetCoordinator, config: Config) -> Router {
    let route = config.forgot_password.route.clone();
    let pages = if config.forgot_password.rest {
        routes::rest_routes(&route)
    } else {
        views::view_routes(&route)
    };

    let state: SharedState = Arc::new(AppState {
        coordinator,
        config,
    });

    Router::new()
        .merge(pages)
        .route("/health", axum::routing::get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("no-referrer"),
                )),
        )
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
