use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use forgot_password::config::Config;
use forgot_password::reset::observer::{AuditObserver, TracingObserver};
use forgot_password::reset::PasswordResetCoordinator;
use forgot_password::store::PgUserStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(&config.log_level)
        }))
        .init();

    tracing::info!("Starting forgot-password service");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!("Migrations applied");

    let notifier = forgot_password::build_notifier(&config);
    let coordinator = PasswordResetCoordinator::new(
        Arc::new(PgUserStore::new(pool.clone())),
        notifier,
        config.forgot_password.policy.clone(),
    )
    .with_observer(Arc::new(TracingObserver))
    .with_observer(Arc::new(AuditObserver::new(pool)));

    let addr = SocketAddr::new(config.host, config.port);
    tracing::info!(
        "Password reset mounted at {} (token TTL {}s)",
        config.forgot_password.mount_route(),
        config.forgot_password.policy.token_ttl.num_seconds()
    );
    let app = forgot_password::build_app(coordinator, config);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
