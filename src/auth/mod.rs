/*!
 * # Authentication Module
 *
 * JWT authentication transported via HTTP-only cookies. The pieces:
 *
 * - `AuthService`: issues, validates, and rotates access/refresh token
 *   pairs (HS256 via `jsonwebtoken`); refresh tokens are persisted for
 *   rotation and revocation.
 * - Cookie bridge middleware: lifts the `access` cookie into the
 *   `Authorization` header and stashes the `refresh` cookie in a request
 *   extension for the retry flow.
 * - Auth middleware: validates the bearer token and exposes the caller as
 *   an `AuthUser` extension on protected routes.
 */

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::DbPool;

// Entity modules
pub mod refresh_token;
pub mod user;

/// Cookie carrying the access token
pub const ACCESS_COOKIE: &str = "access";
/// Cookie carrying the refresh token
pub const REFRESH_COOKIE: &str = "refresh";

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,          // Subject (user ID)
    pub name: Option<String>, // User's name
    pub email: Option<String>, // User's email
    pub jti: String,          // JWT ID (unique identifier for this token)
    pub iat: i64,             // Issued at time
    pub exp: i64,             // Expiration time
    pub nbf: i64,             // Not valid before time
    pub iss: String,          // Issuer
    pub aud: String,          // Audience
}

/// Authenticated user data extracted from the JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub token_id: String,
}

/// Refresh token captured from the `refresh` cookie by the cookie bridge;
/// the side channel the retry flow reads.
#[derive(Debug, Clone)]
pub struct RefreshTokenCookie(pub Option<String>);

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub access_token_expiration: Duration,
    pub refresh_token_expiration: Duration,
    pub access_cookie_max_age: Duration,
}

impl AuthConfig {
    pub fn from_app_config(cfg: &crate::config::AppConfig) -> Self {
        Self {
            jwt_secret: cfg.jwt_secret.clone(),
            jwt_issuer: cfg.auth_issuer.clone(),
            jwt_audience: cfg.auth_audience.clone(),
            access_token_expiration: Duration::from_secs(cfg.jwt_expiration),
            refresh_token_expiration: Duration::from_secs(cfg.refresh_token_expiration),
            access_cookie_max_age: Duration::from_secs(cfg.access_cookie_max_age_secs),
        }
    }
}

/// Authentication service that handles token issuance and validation
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    pub db: Arc<DbPool>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DbPool>) -> Self {
        Self { config, db }
    }

    /// Verify credentials against the users table and issue a token pair
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let user = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.active || !verify_password(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = %user.id, "user logged in");
        self.generate_token(&user).await
    }

    /// Generate a JWT access/refresh pair for a user
    pub async fn generate_token(&self, user: &user::Model) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        let access_exp = now
            + ChronoDuration::from_std(self.config.access_token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;
        let refresh_exp = now
            + ChronoDuration::from_std(self.config.refresh_token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;

        let access_jti = Uuid::new_v4().to_string();
        let refresh_jti = Uuid::new_v4().to_string();

        let access_claims = Claims {
            sub: user.id.to_string(),
            name: Some(user.name.clone()),
            email: Some(user.email.clone()),
            jti: access_jti,
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        // Refresh token claims carry no profile data
        let refresh_claims = Claims {
            sub: user.id.to_string(),
            name: None,
            email: None,
            jti: refresh_jti.clone(),
            iat: now.timestamp(),
            exp: refresh_exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &access_claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        let refresh_token = encode(
            &Header::new(Algorithm::HS256),
            &refresh_claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        // Persist the refresh token so it can be verified and rotated
        refresh_token::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.id),
            token_id: Set(refresh_jti),
            created_at: Set(now),
            expires_at: Set(refresh_exp),
            revoked: Set(false),
        }
        .insert(&*self.db)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_expiration.as_secs() as i64,
            refresh_expires_in: self.config.refresh_token_expiration.as_secs() as i64,
        })
    }

    /// Validate a JWT token and extract the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.jwt_issuer.clone()]);
        validation.set_audience(&[self.config.jwt_audience.clone()]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

        Ok(claims)
    }

    /// Exchange a refresh token for a new pair, rotating the old one out
    pub async fn refresh_token(&self, refresh_token_value: &str) -> Result<TokenPair, AuthError> {
        let claims = self.validate_token(refresh_token_value)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        if !self.verify_refresh_token(user_id, &claims.jti).await? {
            return Err(AuthError::InvalidToken);
        }

        let user = user::Entity::find_by_id(user_id)
            .one(&*self.db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::UserNotFound)?;

        if !user.active {
            return Err(AuthError::InvalidCredentials);
        }

        // Single-use: the presented token is dead as soon as it is exchanged
        self.revoke_refresh_token(user_id, &claims.jti).await?;

        self.generate_token(&user).await
    }

    /// Check a refresh token record exists, is unrevoked, and is unexpired
    async fn verify_refresh_token(&self, user_id: Uuid, token_id: &str) -> Result<bool, AuthError> {
        let record = refresh_token::Entity::find()
            .filter(refresh_token::Column::UserId.eq(user_id))
            .filter(refresh_token::Column::TokenId.eq(token_id))
            .filter(refresh_token::Column::Revoked.eq(false))
            .one(&*self.db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(record.map_or(false, |r| r.expires_at > Utc::now()))
    }

    /// Mark a refresh token revoked
    async fn revoke_refresh_token(&self, user_id: Uuid, token_id: &str) -> Result<(), AuthError> {
        let record = refresh_token::Entity::find()
            .filter(refresh_token::Column::UserId.eq(user_id))
            .filter(refresh_token::Column::TokenId.eq(token_id))
            .one(&*self.db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        if let Some(record) = record {
            let mut active: refresh_token::ActiveModel = record.into();
            active.revoked = Set(true);
            active
                .update(&*self.db)
                .await
                .map_err(|e| AuthError::DatabaseError(e.to_string()))?;
            debug!(%user_id, token_id, "refresh token revoked");
        }

        Ok(())
    }
}

/// Hash a password with argon2
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::InternalError(format!("Password hashing failed: {e}")))
}

/// Verify a password against an argon2 hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Token pair response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_expires_in: i64,
}

/// Login credentials
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, error_message): (StatusCode, &str, String) = match &self {
            Self::MissingAuth => (
                StatusCode::UNAUTHORIZED,
                "AUTH_MISSING",
                "Authentication required".to_string(),
            ),
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_CREDENTIALS",
                "Invalid credentials".to_string(),
            ),
            Self::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_TOKEN",
                "Invalid authentication token".to_string(),
            ),
            Self::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "AUTH_TOKEN_EXPIRED",
                "Token has expired".to_string(),
            ),
            Self::TokenCreation(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_TOKEN_CREATION_FAILED",
                msg.clone(),
            ),
            Self::UserNotFound => (
                StatusCode::UNAUTHORIZED,
                "AUTH_USER_NOT_FOUND",
                "User not found".to_string(),
            ),
            Self::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_DATABASE_ERROR",
                "Internal server error".to_string(),
            ),
            Self::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),
        };

        let body = Json(serde_json::json!({
            "error": {
                "code": error_code,
                "message": error_message,
            }
        }));

        (status, body).into_response()
    }
}

/// Cookie bridge middleware: lifts the `access` cookie into the
/// `Authorization` header (unless one is already present) and stashes the
/// `refresh` cookie in a request extension for the retry flow. Verification
/// itself stays with `AuthService`.
pub async fn cookie_auth_bridge(jar: CookieJar, mut request: Request, next: Next) -> Response {
    if let Some(access) = jar.get(ACCESS_COOKIE) {
        if !request.headers().contains_key(header::AUTHORIZATION) {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", access.value())) {
                request.headers_mut().insert(header::AUTHORIZATION, value);
            }
        }
    }

    let refresh = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string());
    request.extensions_mut().insert(RefreshTokenCookie(refresh));

    next.run(request).await
}

/// Authentication middleware that validates the bearer token
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let headers = request.headers().clone();

    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication service not available",
            )
                .into_response();
        }
    };

    match extract_auth_from_headers(&headers, &auth_service) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Extract authentication info from request headers
fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthUser, AuthError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_value) = auth_header.to_str() {
            if auth_value.starts_with("Bearer ") {
                let token = auth_value.trim_start_matches("Bearer ").trim();
                let claims = auth_service.validate_token(token)?;

                return Ok(AuthUser {
                    user_id: claims.sub,
                    name: claims.name,
                    email: claims.email,
                    token_id: claims.jti,
                });
            }
        }
    }

    Err(AuthError::MissingAuth)
}

fn access_cookie(config: &AuthConfig, token: &str) -> Cookie<'static> {
    Cookie::build((ACCESS_COOKIE, token.to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(
            config.access_cookie_max_age.as_secs() as i64,
        ))
        .build()
}

// Session-scoped: no Max-Age, the browser drops it when the session ends
fn refresh_cookie(token: &str) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token.to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").http_only(true).build()
}

fn authentication_failed_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({ "errMsg": "authentication failed" })),
    )
        .into_response()
}

/// Authentication routes: login, retry (refresh), logout
pub fn auth_routes() -> axum::Router<crate::AppState> {
    axum::Router::new()
        .route("/login", axum::routing::post(login_handler))
        .route("/retry", axum::routing::post(retry_handler))
        .route("/logout", axum::routing::post(logout_handler))
}

/// Login: verify credentials, set `access` and `refresh` cookies
async fn login_handler(
    State(state): State<crate::AppState>,
    jar: CookieJar,
    Json(credentials): Json<LoginCredentials>,
) -> Response {
    match state
        .auth
        .login(&credentials.email, &credentials.password)
        .await
    {
        Ok(pair) => {
            let jar = jar
                .add(access_cookie(&state.auth.config, &pair.access_token))
                .add(refresh_cookie(&pair.refresh_token));
            (StatusCode::OK, jar).into_response()
        }
        Err(err) => {
            debug!("login rejected: {err}");
            authentication_failed_response()
        }
    }
}

/// Retry: exchange the refresh token from the cookie bridge side channel
/// for a fresh pair and re-set both cookies
async fn retry_handler(
    State(state): State<crate::AppState>,
    Extension(refresh): Extension<RefreshTokenCookie>,
    jar: CookieJar,
) -> Response {
    let Some(token) = refresh.0 else {
        return authentication_failed_response();
    };

    match state.auth.refresh_token(&token).await {
        Ok(pair) => {
            let jar = jar
                .add(access_cookie(&state.auth.config, &pair.access_token))
                .add(refresh_cookie(&pair.refresh_token));
            (StatusCode::OK, jar).into_response()
        }
        Err(err) => {
            debug!("token refresh rejected: {err}");
            authentication_failed_response()
        }
    }
}

/// Logout: clear both cookies unconditionally; always succeeds
async fn logout_handler(jar: CookieJar) -> Response {
    let jar = jar
        .remove(removal_cookie(ACCESS_COOKIE))
        .remove(removal_cookie(REFRESH_COOKIE));
    (StatusCode::OK, jar).into_response()
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("hunter2-but-longer").unwrap();
        assert!(verify_password("hunter2-but-longer", &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn verify_rejects_malformed_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn access_cookie_is_http_only_with_max_age() {
        let config = AuthConfig {
            jwt_secret: "secret".into(),
            jwt_issuer: "iss".into(),
            jwt_audience: "aud".into(),
            access_token_expiration: Duration::from_secs(60),
            refresh_token_expiration: Duration::from_secs(120),
            access_cookie_max_age: Duration::from_secs(1800),
        };
        let cookie = access_cookie(&config, "tok");
        assert_eq!(cookie.name(), ACCESS_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(1800)));
    }

    #[test]
    fn refresh_cookie_is_session_scoped() {
        let cookie = refresh_cookie("tok");
        assert_eq!(cookie.name(), REFRESH_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), None);
    }
}
