//! Resman Server - restaurant-management API.
//!
//! # Architecture
//!
//! - Axum web framework, JSON in and out
//! - Session tokens signed with `jsonwebtoken`, revocations kept in the store
//! - `PostgreSQL` via `sqlx`, or an in-memory store when no database URL is set
//!
//! Migrations are NOT run on startup. Run them explicitly via:
//! `cargo run -p resman-cli -- migrate`

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::time::Duration;

use chrono::Utc;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use resman_server::config::{LogFormat, ServerConfig};
use resman_server::db::{self, SharedStore};
use resman_server::state::AppState;

/// How often expired revocations are dropped from the store.
const REVOCATION_PURGE_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ServerConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "resman_server=info,tower_http=info".into());

    // The Sentry layer is generic over the subscriber stack, so each arm builds its own.
    match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .with(sentry_tracing::layer().event_filter(sentry_event_filter))
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .with(sentry_tracing::layer().event_filter(sentry_event_filter))
            .init(),
    }
}

/// Periodically drop revocations of tokens that have expired anyway.
fn spawn_revocation_purge(store: SharedStore) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(REVOCATION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            match store.purge_revoked_tokens(Utc::now()).await {
                Ok(0) => {}
                Ok(purged) => tracing::debug!(purged, "Purged expired token revocations"),
                Err(e) => tracing::warn!(error = %e, "Failed to purge token revocations"),
            }
        }
    });
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = ServerConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing(config.log_format);

    let store = db::connect(config.database_url.as_ref())
        .await
        .expect("Failed to connect to the store");
    tracing::info!(backend = store.backend_name(), "Store ready");

    spawn_revocation_purge(store.clone());

    let addr = config.socket_addr();
    let app = resman_server::app(AppState::new(config, store));

    tracing::info!("resman-server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
