//! Request correlation ids.
//!
//! An upstream `x-request-id` is reused when it is short printable ASCII;
//! anything else is replaced by a fresh UUID v4. The id is recorded on the
//! request span, tagged on the Sentry scope, and echoed back to the client.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_INBOUND_LEN: usize = 128;

fn inbound_id(request: &Request) -> Option<String> {
    let raw = request.headers().get(REQUEST_ID_HEADER)?.to_str().ok()?;
    let usable = !raw.is_empty()
        && raw.len() <= MAX_INBOUND_LEN
        && raw.bytes().all(|b| b.is_ascii_graphic());
    usable.then(|| raw.to_string())
}

/// Attach a request id to the span, the Sentry scope, and the response.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = inbound_id(&request).unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| scope.set_tag("request_id", &request_id));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, middleware, routing::get};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn(request_id_middleware))
    }

    async fn echoed(header: Option<&str>) -> String {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(REQUEST_ID_HEADER, value);
        }
        let response = app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        response.headers()[REQUEST_ID_HEADER]
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_reuses_upstream_id() {
        assert_eq!(echoed(Some("edge-42")).await, "edge-42");
    }

    #[tokio::test]
    async fn test_generates_when_missing_or_unusable() {
        let generated = echoed(None).await;
        assert!(Uuid::parse_str(&generated).is_ok());

        let long = "x".repeat(MAX_INBOUND_LEN + 1);
        assert!(Uuid::parse_str(&echoed(Some(&long)).await).is_ok());
        assert!(Uuid::parse_str(&echoed(Some("has space")).await).is_ok());
    }
}
