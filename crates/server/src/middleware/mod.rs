//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, transactions)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (correlation id on span, Sentry scope, and response)
//! 4. CORS
//!
//! Authentication is not a layer: handlers that need an actor take the
//! [`RequireActor`] extractor, so public routes stay public.

pub mod auth;
pub mod request_id;

pub use auth::{RequireActor, SessionRejection, TOKEN_HEADER};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
