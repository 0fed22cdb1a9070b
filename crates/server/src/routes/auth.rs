//! Registration, login, and logout.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppError;
use crate::middleware::auth::token_from_headers;
use crate::services::auth::{AuthError, AuthService, Credentials, Registration, Session};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Body returned after a successful register or login.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub role: &'static str,
    pub token: String,
    pub msg: &'static str,
    pub status: &'static str,
}

impl SessionResponse {
    fn new(session: Session, msg: &'static str) -> Json<Self> {
        Json(Self {
            role: session.actor.role.as_str(),
            token: session.token.token,
            msg,
            status: "Success",
        })
    }
}

/// Create an admin or super admin and return a session for it.
///
/// # Errors
///
/// 400 for bad input or a taken email.
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, AppError> {
    let Json(body) = body?;
    let session = AuthService::new(state.store(), state.tokens())
        .register(Registration {
            role: &body.role,
            name: &body.name,
            email: &body.email,
            password: &body.password,
        })
        .await?;
    Ok(SessionResponse::new(session, "Registration Successful"))
}

/// Exchange credentials for a session token.
///
/// Wrong credentials answer 401 with `status: "Fail"`.
///
/// # Errors
///
/// 400 for malformed input.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = body?;
    let result = AuthService::new(state.store(), state.tokens())
        .login(Credentials {
            role: &body.role,
            email: &body.email,
            password: &body.password,
        })
        .await;
    match result {
        Ok(session) => {
            state.metrics().record_login(session.actor.role);
            Ok(SessionResponse::new(session, "Login Successful").into_response())
        }
        Err(e @ AuthError::InvalidCredentials) => Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": e.to_string(), "status": "Fail" })),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// Revoke the presented token. Logging out an already revoked token is fine.
///
/// # Errors
///
/// 400 without a token, 500 if the revocation cannot be stored.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let token = token_from_headers(&headers)
        .ok_or_else(|| AppError::BadRequest("empty token".to_string()))?;
    AuthService::new(state.store(), state.tokens())
        .logout(token)
        .await?;
    Ok(Json(json!({
        "msg": "Logged Out Successfully",
        "status": "Success",
    })))
}
