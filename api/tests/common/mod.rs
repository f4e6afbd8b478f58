//! Shared setup for HTTP tests: the full router over in-memory storage.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use axum::http::{HeaderName, HeaderValue, header};
use axum_test::{TestResponse, TestServer};
use base64::Engine;
use natural_api::{AppState, Config, Repositories, build_router, build_state};
use natural_core::Role;
use natural_testing::{FixedClock, fixtures, test_clock};
use serde_json::{Value, json};
use std::sync::Arc;

pub const BASE_URL: &str = "http://localhost:8080";

/// A running router plus handles on its state and clock.
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub clock: FixedClock,
    pub config: Config,
}

impl TestApp {
    /// Router with default configuration and the default accounts seeded.
    pub async fn new() -> Self {
        let config = Config::default();
        let clock = test_clock();
        let state = build_state(&config, Repositories::in_memory(), Arc::new(clock.clone()))
            .await
            .expect("state should build");
        let server = TestServer::new(build_router(state.clone())).expect("server should start");
        Self {
            server,
            state,
            clock,
            config,
        }
    }

    /// Register an extra `USER` account.
    pub async fn register(&self, email: &str, password: &str) {
        self.state
            .auth
            .register(email, password, [Role::User])
            .await
            .expect("registration should succeed");
    }

    /// `Authorization: Basic` header for the configured OAuth client.
    pub fn client_auth(&self) -> (HeaderName, HeaderValue) {
        basic(&self.config.security.client_id, &self.config.security.client_secret)
    }

    /// Password grant, returning the raw response.
    pub async fn password_grant(&self, username: &str, password: &str) -> TestResponse {
        let (name, value) = self.client_auth();
        self.server
            .post("/oauth/token")
            .add_header(name, value)
            .form(&[
                ("grant_type", "password"),
                ("username", username),
                ("password", password),
            ])
            .await
    }

    /// Access token for `username`.
    pub async fn token(&self, username: &str, password: &str) -> String {
        let body: Value = self.password_grant(username, password).await.json();
        body["access_token"].as_str().expect("access_token").to_string()
    }

    /// Access token of the default regular user.
    pub async fn user_token(&self) -> String {
        let account = &self.config.security.user;
        self.token(&account.username, &account.password).await
    }

    /// Access token of the default admin.
    pub async fn admin_token(&self) -> String {
        let account = &self.config.security.admin;
        self.token(&account.username, &account.password).await
    }

    /// Create the fixture event as the owner of `token`, returning its id.
    pub async fn create_event(&self, token: &str, body: &Value) -> i64 {
        let response = self
            .server
            .post("/api/events")
            .add_header(header::AUTHORIZATION, bearer(token))
            .json(body)
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()["id"].as_i64().expect("id")
    }
}

pub fn basic(id: &str, secret: &str) -> (HeaderName, HeaderValue) {
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{id}:{secret}"));
    (
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Basic {encoded}")).unwrap(),
    )
}

pub fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

/// JSON body of the fixture event.
pub fn spring_event() -> Value {
    named_event("Spring")
}

/// JSON body of the fixture event under another name.
pub fn named_event(name: &str) -> Value {
    let fields = fixtures::named_event_fields(name);
    json!({
        "name": fields.name,
        "description": fields.description,
        "beginEnrollmentDateTime": fields.begin_enrollment_date_time,
        "closeEnrollmentDateTime": fields.close_enrollment_date_time,
        "beginEventDateTime": fields.begin_event_date_time,
        "endEventDateTime": fields.end_event_date_time,
        "location": fields.location,
        "basePrice": fields.base_price,
        "maxPrice": fields.max_price,
        "limitOfEnrollment": fields.limit_of_enrollment,
    })
}

pub fn href<'a>(body: &'a Value, rel: &str) -> &'a str {
    body["_links"][rel]["href"].as_str().unwrap_or_default()
}
