//! Registration, login, logout, and token revocation.

#![allow(clippy::unwrap_used)]

use reqwest::Method;
use serde_json::json;

use resman_integration_tests::{TestServer, token_of};

#[tokio::test]
async fn test_register_returns_session() {
    let server = TestServer::spawn().await;
    let reply = server.register("admin", "Asha", "a@x.com").await;
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["role"], "admin");
    assert_eq!(reply.body["msg"], "Registration Successful");
    assert_eq!(reply.body["status"], "Success");
    assert!(!token_of(&reply).is_empty());
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let server = TestServer::spawn().await;
    assert_eq!(server.register("admin", "Asha", "a@x.com").await.status, 200);

    let again = server.register("admin", "Other", "a@x.com").await;
    assert_eq!(again.status, 400);
    assert_eq!(again.error(), "email already used try a different one");

    // Email uniqueness is per role table.
    assert_eq!(server.register("superAdmin", "Root", "a@x.com").await.status, 200);
}

#[tokio::test]
async fn test_unknown_or_owner_role_cannot_register() {
    let server = TestServer::spawn().await;
    let reply = server.register("otherRole", "X", "x@x.com").await;
    assert_eq!(reply.status, 400);
    assert_eq!(reply.error(), "invalid role");

    let reply = server.register("owner", "X", "x@x.com").await;
    assert_eq!(reply.status, 400);
}

#[tokio::test]
async fn test_blank_fields_fail_validation() {
    let server = TestServer::spawn().await;
    let reply = server
        .send(
            Method::POST,
            "/register",
            None,
            Some(json!({ "name": "", "email": "x@x.com", "password": "p", "role": "admin" })),
        )
        .await;
    assert_eq!(reply.status, 400);
    assert_eq!(reply.error(), "name is required");
}

#[tokio::test]
async fn test_login_checks_role_and_password() {
    let server = TestServer::spawn().await;
    server.token_for("admin", "a@x.com").await;

    let ok = server.login("admin", "a@x.com").await;
    assert_eq!(ok.status, 200);
    assert_eq!(ok.body["msg"], "Login Successful");

    let wrong_role = server.login("superAdmin", "a@x.com").await;
    assert_eq!(wrong_role.status, 401);
    assert_eq!(wrong_role.body["status"], "Fail");

    let wrong_password = server
        .send(
            Method::POST,
            "/login",
            None,
            Some(json!({ "email": "a@x.com", "password": "nope", "role": "admin" })),
        )
        .await;
    assert_eq!(wrong_password.status, 401);
    assert_eq!(wrong_password.error(), "incorrect login details");
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let server = TestServer::spawn().await;
    let token = server.token_for("admin", "a@x.com").await;
    assert_eq!(server.get("/manage/restaurants", &token).await.status, 200);

    let reply = server.get("/logout", &token).await;
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["msg"], "Logged Out Successfully");

    let after = server.get("/manage/restaurants", &token).await;
    assert_eq!(after.status, 498);
    assert_eq!(after.error(), "invalid token");
    assert_eq!(server.get("/manage/owners", &token).await.status, 498);

    // Logging out twice is harmless.
    assert_eq!(server.get("/logout", &token).await.status, 200);

    // A fresh login gets a working token again.
    let fresh = token_of(&server.login("admin", "a@x.com").await);
    assert_eq!(server.get("/manage/restaurants", &fresh).await.status, 200);
}

#[tokio::test]
async fn test_missing_or_forged_token() {
    let server = TestServer::spawn().await;
    let reply = server
        .send(Method::GET, "/manage/restaurants", None, None)
        .await;
    assert_eq!(reply.status, 498);

    assert_eq!(server.get("/manage/restaurants", "not-a-token").await.status, 498);

    let reply = server.send(Method::GET, "/logout", None, None).await;
    assert_eq!(reply.status, 400);
    assert_eq!(reply.error(), "empty token");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = TestServer::spawn().await;
    let response = reqwest::Client::new()
        .get(format!("{}/health", server.base_url()))
        .header("x-request-id", "trace-7")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["x-request-id"], "trace-7");
}

#[tokio::test]
async fn test_logins_show_up_in_metrics() {
    let server = TestServer::spawn().await;
    server.token_for("admin", "a@x.com").await;
    assert_eq!(server.login("admin", "a@x.com").await.status, 200);
    assert_eq!(server.login("admin", "a@x.com").await.status, 200);

    let text = reqwest::get(format!("{}/metrics", server.base_url()))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(
        text.contains(r#"resman_logins_total{role="admin"} 2"#),
        "{text}"
    );
    assert!(text.contains(r#"path="/login""#), "{text}");
}
