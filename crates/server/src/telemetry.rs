//! Prometheus metrics.
//!
//! Each [`AppState`] owns its own recorder rather than installing a
//! process-wide one, so several servers (and tests) can run side by side
//! without sharing counters. Metrics are recorded through
//! [`metrics::with_local_recorder`] and rendered by `GET /metrics`.
//!
//! | Metric | Kind | Labels |
//! |---|---|---|
//! | `resman_requests_total` | counter | `method`, `path`, `status` |
//! | `resman_request_duration_ms` | histogram | `method`, `path`, `status` |
//! | `resman_logins_total` | counter | `role` |

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};

use resman_core::Role;

use crate::state::AppState;

/// Path of the scrape endpoint; not instrumented itself.
pub const METRICS_PATH: &str = "/metrics";

const REQUESTS_TOTAL: &str = "resman_requests_total";
const REQUEST_DURATION_MS: &str = "resman_request_duration_ms";
const LOGINS_TOTAL: &str = "resman_logins_total";

/// Latency buckets in milliseconds.
const DURATION_BUCKETS_MS: &[f64] = &[
    2.0, 4.0, 6.0, 8.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0,
];

/// Label for requests that matched no route, keeping cardinality bounded.
const UNMATCHED_PATH: &str = "unmatched";

/// Metrics registry for one server instance.
#[derive(Clone)]
pub struct Metrics {
    recorder: Arc<PrometheusRecorder>,
    handle: PrometheusHandle,
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(REQUEST_DURATION_MS.to_string()),
                DURATION_BUCKETS_MS,
            )
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default latency buckets");
                PrometheusBuilder::new()
            });
        let recorder = builder.build_recorder();
        let handle = recorder.handle();
        Self {
            recorder: Arc::new(recorder),
            handle,
        }
    }

    /// Count one finished request and observe its latency.
    pub fn record_request(&self, method: &str, path: &str, status: u16, elapsed: Duration) {
        let labels = [
            ("method", method.to_string()),
            ("path", path.to_string()),
            ("status", status.to_string()),
        ];
        metrics::with_local_recorder(&*self.recorder, || {
            metrics::counter!(REQUESTS_TOTAL, &labels).increment(1);
            metrics::histogram!(REQUEST_DURATION_MS, &labels)
                .record(elapsed.as_secs_f64() * 1000.0);
        });
    }

    /// Count one successful login.
    pub fn record_login(&self, role: Role) {
        metrics::with_local_recorder(&*self.recorder, || {
            metrics::counter!(LOGINS_TOTAL, "role" => role.as_str()).increment(1);
        });
    }

    /// Prometheus text exposition of everything recorded so far.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Middleware recording count and latency per matched route.
pub async fn track_metrics(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if request.uri().path() == METRICS_PATH {
        return next.run(request).await;
    }

    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or(UNMATCHED_PATH, MatchedPath::as_str)
        .to_string();

    let response = next.run(request).await;

    state
        .metrics()
        .record_request(&method, &path, response.status().as_u16(), start.elapsed());
    response
}

/// `GET /metrics`
pub async fn render(State(state): State<AppState>) -> String {
    state.metrics().render()
}
