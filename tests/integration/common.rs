//! Shared fixtures: a throwaway database, fast hashing, and request helpers

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use bibliotheca_server::{
    api,
    config::{AppConfig, AuthConfig},
    repository, AppState,
};

pub const OWNER_EMAIL: &str = "default_owner@example.com";
pub const OWNER_PASSWORD: &str = "password";
pub const ADMIN_EMAIL: &str = "john@example.com";
pub const ADMIN_PASSWORD: &str = "adminpass";
pub const READER_EMAIL: &str = "mary@example.com";
pub const READER_PASSWORD: &str = "readerpass";

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    // Keeps the database file alive for the duration of the test
    _dir: TempDir,
}

pub fn test_config(dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = format!("sqlite://{}", dir.path().join("library.db").display());
    config.auth = AuthConfig {
        argon2_memory_kib: 64,
        argon2_iterations: 1,
        argon2_parallelism: 1,
    };
    config
}

/// Fresh migrated database with the default owner in place
pub async fn spawn_app() -> TestApp {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let config = test_config(&dir);

    let pool = repository::connect(&config.database)
        .await
        .expect("failed to open test database");
    repository::MIGRATOR.run(&pool).await.expect("failed to migrate");

    let bootstrap = config.bootstrap.clone();
    let state = AppState::new(config, pool).expect("failed to build state");
    state
        .services
        .auth
        .ensure_default_owner(&bootstrap)
        .await
        .expect("failed to create default owner");

    let router = api::create_router(state.clone());
    TestApp {
        state,
        router,
        _dir: dir,
    }
}

pub fn basic_auth(email: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", email, password)))
}

impl TestApp {
    /// Send one request through the router and decode the JSON body
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        credentials: Option<(&str, &str)>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some((email, password)) = credentials {
            builder = builder.header(header::AUTHORIZATION, basic_auth(email, password));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to read body")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body is not JSON")
        };
        (status, json)
    }

    pub async fn as_owner(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.call(method, uri, Some((OWNER_EMAIL, OWNER_PASSWORD)), body).await
    }

    pub async fn as_admin(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.call(method, uri, Some((ADMIN_EMAIL, ADMIN_PASSWORD)), body).await
    }

    pub async fn as_reader(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.call(method, uri, Some((READER_EMAIL, READER_PASSWORD)), body).await
    }

    /// Library 1 plus one admin (id 2) and one reader (id 3)
    pub async fn seed_staff(&self) {
        let (status, _) = self
            .as_owner(Method::POST, "/owner/library", Some(serde_json::json!({ "name": "Central" })))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        for (name, email, password, role) in [
            ("John", ADMIN_EMAIL, ADMIN_PASSWORD, "admin"),
            ("Mary", READER_EMAIL, READER_PASSWORD, "reader"),
        ] {
            let (status, body) = self
                .as_owner(
                    Method::POST,
                    "/owner/users",
                    Some(serde_json::json!({
                        "name": name,
                        "email": email,
                        "contact": "555-0100",
                        "role": role,
                        "lib_id": 1,
                        "password": password,
                    })),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{body}");
        }
    }

    /// Add a title to library 1 as the admin
    pub async fn seed_book(&self, isbn: &str, copies: i64) {
        let (status, body) = self
            .as_admin(
                Method::POST,
                "/admin/books",
                Some(serde_json::json!({
                    "isbn": isbn,
                    "lib_id": 1,
                    "title": format!("Title {isbn}"),
                    "authors": "A. Author",
                    "total_copies": copies,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }
}
