//! End-to-end tests for the Resman server.
//!
//! Each test spawns the full router (middleware included) on an ephemeral
//! local port backed by a fresh in-memory store, and talks to it over HTTP
//! with `reqwest`. No database is needed.
//!
//! ```bash
//! cargo test -p resman-integration-tests
//! ```

use std::sync::Arc;

use reqwest::{Client, Method};
use secrecy::SecretString;
use serde_json::{Value, json};

use resman_server::config::ServerConfig;
use resman_server::db::InMemoryStore;
use resman_server::state::AppState;

/// Password used for every account created by the helpers.
pub const PASSWORD: &str = "s3cret-pass";

const JWT_SECRET: &str = "k9#Lq2!vR7@xT4$mW8^zB1&nC5*pD3(f";

/// Status and decoded JSON body of one response.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    /// The `error` message, or an empty string.
    #[must_use]
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

/// A running server and a client pointed at it.
pub struct TestServer {
    base_url: String,
    client: Client,
}

impl TestServer {
    /// Start a server on `127.0.0.1:0`.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn() -> Self {
        let config = ServerConfig::in_memory(SecretString::from(JWT_SECRET));
        let listener = tokio::net::TcpListener::bind(config.socket_addr())
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");
        let app = resman_server::app(AppState::new(config, Arc::new(InMemoryStore::new())));
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server error");
        });

        Self {
            base_url: format!("http://{addr}"),
            client: Client::new(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request, optionally with a session token and a JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be reached.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Reply {
        let mut request = self
            .client
            .request(method, format!("{}{path}", self.base_url));
        if let Some(token) = token {
            request = request.header("token", token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.expect("Request failed");
        let status = response.status().as_u16();
        let body = response.json().await.unwrap_or(Value::Null);
        Reply { status, body }
    }

    pub async fn get(&self, path: &str, token: &str) -> Reply {
        self.send(Method::GET, path, Some(token), None).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> Reply {
        self.send(Method::POST, path, Some(token), Some(body)).await
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> Reply {
        self.send(Method::PUT, path, Some(token), Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> Reply {
        self.send(Method::DELETE, path, Some(token), None).await
    }

    /// `POST /register` with the shared password.
    pub async fn register(&self, role: &str, name: &str, email: &str) -> Reply {
        let body = json!({ "name": name, "email": email, "password": PASSWORD, "role": role });
        self.send(Method::POST, "/register", None, Some(body)).await
    }

    /// `POST /login` with the shared password.
    pub async fn login(&self, role: &str, email: &str) -> Reply {
        let body = json!({ "email": email, "password": PASSWORD, "role": role });
        self.send(Method::POST, "/login", None, Some(body)).await
    }

    /// Register an account and return its token.
    ///
    /// # Panics
    ///
    /// Panics if registration fails.
    pub async fn token_for(&self, role: &str, email: &str) -> String {
        let reply = self.register(role, email, email).await;
        assert_eq!(reply.status, 200, "register {email}: {:?}", reply.body);
        token_of(&reply)
    }

    /// Create an owner as `creator` and sign it in. Returns `(id, token)`.
    ///
    /// # Panics
    ///
    /// Panics if creation or login fails.
    pub async fn owner(&self, creator: &str, email: &str) -> (String, String) {
        let reply = self
            .post(
                "/manage/owners",
                creator,
                json!({ "name": email, "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(reply.status, 200, "create owner {email}: {:?}", reply.body);
        let id = reply.body["id"]
            .as_str()
            .expect("owner id missing")
            .to_string();
        let login = self.login("owner", email).await;
        assert_eq!(login.status, 200, "login owner {email}: {:?}", login.body);
        (id, token_of(&login))
    }

    /// Add a restaurant as `creator` and return its id.
    ///
    /// # Panics
    ///
    /// Panics if creation fails.
    pub async fn restaurant(&self, creator: &str, name: &str, lat: f64, lng: f64) -> i64 {
        let reply = self
            .post(
                "/manage/restaurants",
                creator,
                json!({ "name": name, "lat": lat, "lng": lng }),
            )
            .await;
        assert_eq!(reply.status, 200, "create restaurant {name}: {:?}", reply.body);
        reply.body["id"].as_i64().expect("restaurant id missing")
    }
}

/// The `token` field of a register or login reply.
///
/// # Panics
///
/// Panics if the reply carries no token.
#[must_use]
pub fn token_of(reply: &Reply) -> String {
    reply.body["token"]
        .as_str()
        .expect("token missing")
        .to_string()
}

/// Ids of every element of a JSON array reply.
#[must_use]
pub fn ids_of(reply: &Reply) -> Vec<Value> {
    reply
        .body
        .as_array()
        .map(|items| items.iter().map(|item| item["id"].clone()).collect())
        .unwrap_or_default()
}
