mod common;

use axum::http::Method;
use serde_json::json;

use common::{cookie_header_from, response_json, set_cookie_line, TestApp};

#[tokio::test]
async fn login_sets_both_cookies() {
    let app = TestApp::new().await;
    app.seed_user("clerk@example.com", "correct horse battery")
        .await;

    let response = app
        .request(
            Method::POST,
            "/auth/login",
            Some(json!({ "email": "clerk@example.com", "password": "correct horse battery" })),
        )
        .await;
    assert_eq!(response.status(), 200);

    let access = set_cookie_line(&response, "access").expect("access cookie");
    assert!(access.contains("HttpOnly"), "access must be HTTP-only");
    assert!(access.contains("Max-Age"), "access must be time-limited");

    let refresh = set_cookie_line(&response, "refresh").expect("refresh cookie");
    assert!(refresh.contains("HttpOnly"), "refresh must be HTTP-only");
    assert!(
        !refresh.contains("Max-Age"),
        "refresh must be session-scoped"
    );
}

#[tokio::test]
async fn login_with_bad_credentials_fails_without_cookies() {
    let app = TestApp::new().await;
    app.seed_user("clerk@example.com", "correct horse battery")
        .await;

    let response = app
        .request(
            Method::POST,
            "/auth/login",
            Some(json!({ "email": "clerk@example.com", "password": "wrong" })),
        )
        .await;
    assert_eq!(response.status(), 401);
    assert!(set_cookie_line(&response, "access").is_none());
    assert!(set_cookie_line(&response, "refresh").is_none());

    let body = response_json(response).await;
    assert_eq!(body, json!({ "errMsg": "authentication failed" }));
}

#[tokio::test]
async fn login_with_unknown_user_fails_the_same_way() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/auth/login",
            Some(json!({ "email": "nobody@example.com", "password": "whatever" })),
        )
        .await;
    assert_eq!(response.status(), 401);
    let body = response_json(response).await;
    assert_eq!(body, json!({ "errMsg": "authentication failed" }));
}

#[tokio::test]
async fn session_cookie_grants_access_to_protected_routes() {
    let app = TestApp::new().await;
    let cookies = app.authenticated_cookies().await;

    let response = app
        .request_with_cookies(Method::GET, "/api/v1/products", None, Some(&cookies))
        .await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn retry_rotates_the_token_pair() {
    let app = TestApp::new().await;
    let cookies = app.authenticated_cookies().await;

    let response = app
        .request_with_cookies(Method::POST, "/auth/retry", None, Some(&cookies))
        .await;
    assert_eq!(response.status(), 200);

    assert!(set_cookie_line(&response, "access").is_some());
    assert!(set_cookie_line(&response, "refresh").is_some());

    // The rotated cookies still authenticate
    let rotated = cookie_header_from(&response);
    let response = app
        .request_with_cookies(Method::GET, "/api/v1/products", None, Some(&rotated))
        .await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn refresh_token_is_single_use() {
    let app = TestApp::new().await;
    let cookies = app.authenticated_cookies().await;

    let response = app
        .request_with_cookies(Method::POST, "/auth/retry", None, Some(&cookies))
        .await;
    assert_eq!(response.status(), 200);

    // Replaying the already-exchanged refresh token must fail
    let response = app
        .request_with_cookies(Method::POST, "/auth/retry", None, Some(&cookies))
        .await;
    assert_eq!(response.status(), 401);
    let body = response_json(response).await;
    assert_eq!(body, json!({ "errMsg": "authentication failed" }));
}

#[tokio::test]
async fn retry_without_refresh_cookie_fails() {
    let app = TestApp::new().await;

    let response = app.request(Method::POST, "/auth/retry", None).await;
    assert_eq!(response.status(), 401);
    let body = response_json(response).await;
    assert_eq!(body, json!({ "errMsg": "authentication failed" }));
}

#[tokio::test]
async fn logout_clears_cookies_and_always_succeeds() {
    let app = TestApp::new().await;
    let cookies = app.authenticated_cookies().await;

    let response = app
        .request_with_cookies(Method::POST, "/auth/logout", None, Some(&cookies))
        .await;
    assert_eq!(response.status(), 200);

    for name in ["access", "refresh"] {
        let line = set_cookie_line(&response, name).expect("removal cookie");
        assert!(
            line.contains("Max-Age=0") || line.contains("Expires"),
            "{name} cookie should be cleared: {line}"
        );
    }

    // Logout without a session is still a 200
    let response = app.request(Method::POST, "/auth/logout", None).await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn garbage_access_token_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request_with_cookies(
            Method::GET,
            "/api/v1/products",
            None,
            Some("access=not-a-jwt; refresh=not-a-jwt"),
        )
        .await;
    assert_eq!(response.status(), 401);
}
