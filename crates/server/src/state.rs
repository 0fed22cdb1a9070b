//! Application state shared across handlers.

use std::sync::Arc;

use chrono::Duration;

use crate::config::ServerConfig;
use crate::db::SharedStore;
use crate::graph::OwnershipGraph;
use crate::services::TokenIssuer;
use crate::telemetry::Metrics;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// store, the ownership graph over it, the token issuer, and the metrics
/// registry.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    store: SharedStore,
    graph: OwnershipGraph,
    tokens: TokenIssuer,
    metrics: Metrics,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `store` - Storage backend selected by configuration
    #[must_use]
    pub fn new(config: ServerConfig, store: SharedStore) -> Self {
        let tokens = TokenIssuer::new(
            &config.jwt_secret,
            Duration::minutes(config.session_minutes),
        );
        let graph = OwnershipGraph::new(Arc::clone(&store));
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                graph,
                tokens,
                metrics: Metrics::new(),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &SharedStore {
        &self.inner.store
    }

    #[must_use]
    pub fn graph(&self) -> &OwnershipGraph {
        &self.inner.graph
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.inner.metrics
    }
}
