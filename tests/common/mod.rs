#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use stockledger_api::{
    auth::{hash_password, user, AuthConfig, AuthService},
    build_router,
    config::AppConfig,
    db,
    handlers::AppServices,
    AppState,
};
use tower::ServiceExt;
use uuid::Uuid;

/// Helper harness spinning up the application over an in-memory SQLite
/// database. Each instance owns an isolated database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            3600,
            86_400,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // A single connection keeps the in-memory database alive and shared
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let auth = Arc::new(AuthService::new(
            AuthConfig::from_app_config(&cfg),
            db_arc.clone(),
        ));
        let services = AppServices::new(db_arc.clone());

        let state = AppState {
            db: db_arc,
            config: cfg,
            auth,
            services,
        };

        let router = build_router(state.clone());

        Self { router, state }
    }

    /// Issue a request without cookies.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request_with_cookies(method, uri, body, None).await
    }

    /// Issue a request carrying a `Cookie` header.
    pub async fn request_with_cookies(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        cookies: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookies) = cookies {
            builder = builder.header(header::COOKIE, cookies);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router response")
    }

    /// Insert a user with an argon2-hashed password.
    pub async fn seed_user(&self, email: &str, password: &str) -> Uuid {
        let id = Uuid::new_v4();
        user::ActiveModel {
            id: Set(id),
            name: Set("Test User".to_string()),
            email: Set(email.to_string()),
            password_hash: Set(hash_password(password).expect("hash password")),
            active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed user");
        id
    }

    /// Log in and return a `Cookie` header value carrying both cookies.
    pub async fn login_cookies(&self, email: &str, password: &str) -> String {
        let response = self
            .request(
                Method::POST,
                "/auth/login",
                Some(serde_json::json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(response.status(), 200, "login should succeed");
        cookie_header_from(&response)
    }

    /// Seed a default user and return its session cookies.
    pub async fn authenticated_cookies(&self) -> String {
        self.seed_user("clerk@example.com", "correct horse battery").await;
        self.login_cookies("clerk@example.com", "correct horse battery")
            .await
    }
}

/// Collapse a response's `Set-Cookie` headers into a `Cookie` header value.
pub fn cookie_header_from(response: &Response) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter(|pair| !pair.ends_with('=')) // skip cleared cookies
        .collect::<Vec<_>>()
        .join("; ")
}

/// Pull a named cookie's raw `Set-Cookie` line, if present.
pub fn set_cookie_line<'r>(response: &'r Response, name: &str) -> Option<&'r str> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{name}=")))
}

/// Decode a JSON response body.
pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}
