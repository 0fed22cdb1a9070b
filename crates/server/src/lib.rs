//! Resman Server - restaurant-management HTTP API.
//!
//! Super admins, admins, and owners manage restaurants and their menus.
//! Every mutating request is checked against the role hierarchy and the
//! ownership graph (who created which owner or restaurant, which owner holds
//! which restaurant, which restaurant serves which dish) before the store is
//! touched.
//!
//! # Modules
//!
//! - [`authz`] - authorization decisions and the facts they are made on
//! - [`graph`] - ownership and creator relationships over the store
//! - [`services`] - validate, authorize, persist
//! - [`routes`] - HTTP handlers
//! - [`db`] - storage trait with in-memory and `PostgreSQL` backends
//! - [`telemetry`] - per-instance Prometheus metrics

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod authz;
pub mod config;
pub mod db;
pub mod error;
pub mod graph;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;

use axum::{
    Router,
    http::{HeaderValue, Method},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Build the application with its full middleware stack.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config().cors_origins);

    let router = routes::routes()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            telemetry::track_metrics,
        ))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        account_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state);

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };

    // Sentry layers (outermost for full request coverage)
    router
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// CORS for the configured origins; `*` allows any origin.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        return Some(layer.allow_origin(Any));
    }
    let allowed = origins.iter().filter_map(|origin| {
        HeaderValue::from_str(origin)
            .inspect_err(|_| tracing::warn!(%origin, "Ignoring invalid CORS origin"))
            .ok()
    });
    Some(layer.allow_origin(AllowOrigin::list(allowed)))
}
