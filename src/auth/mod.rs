/*!
 * # Authentication
 *
 * Back-office accounts sign in with username and password and receive an
 * HS256 bearer token. Tokens carry the account's roles; route groups are
 * guarded with [`AuthRouterExt::with_role`]. Logging out revokes the token
 * id until it would have expired anyway.
 */

use crate::entities::user;
use crate::services::Actor;
use axum::{
    extract::{DefaultBodyLimit, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

pub mod password;
pub mod roles;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub name: Option<String>,
    pub roles: Vec<String>,
    /// Token id, used for revocation
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub iss: String,
    pub aud: String,
}

/// Authenticated back-office user, taken from a validated token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub name: Option<String>,
    pub roles: Vec<String>,
    pub token_id: String,
    pub expires_at: i64,
}

impl AuthUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_superadmin(&self) -> bool {
        self.has_role(roles::SUPERADMIN)
    }

    /// Identity recorded in history entries.
    pub fn actor(&self) -> Actor {
        Actor::user(
            self.user_id,
            self.name.clone().unwrap_or_else(|| format!("user-{}", self.user_id)),
        )
    }
}

impl TryFrom<Claims> for AuthUser {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;
        Ok(AuthUser {
            user_id,
            name: claims.name,
            roles: claims.roles,
            token_id: claims.jti,
            expires_at: claims.exp,
        })
    }
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub jwt_issuer: String,
    pub access_token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_audience: String,
        jwt_issuer: String,
        access_token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_audience,
            jwt_issuer,
            access_token_expiration,
        }
    }

    pub fn from_app_config(cfg: &crate::config::AppConfig) -> Self {
        Self::new(
            cfg.jwt_secret.clone(),
            cfg.auth_audience.clone(),
            cfg.auth_issuer.clone(),
            Duration::from_secs(cfg.jwt_expiration as u64),
        )
    }
}

/// Issues, validates and revokes access tokens.
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    db: Arc<DatabaseConnection>,
    /// Revoked token ids mapped to their natural expiry
    revoked: Arc<DashMap<String, DateTime<Utc>>>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self {
            config,
            db,
            revoked: Arc::new(DashMap::new()),
        }
    }

    /// Checks credentials and records the login time.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<user::Model, AuthError> {
        let account = user::Entity::find()
            .filter(user::Column::Username.eq(username.trim()))
            .one(&*self.db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        let matches = password::verify_password(&account.password_hash, password)
            .map_err(|e| AuthError::InternalError(e.to_string()))?;
        if !matches {
            warn!(username = %username, "failed login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        let mut active: user::ActiveModel = account.into();
        active.last_login = Set(Some(Utc::now()));
        let account = active
            .update(&*self.db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        info!(user_id = account.id, "user logged in");
        Ok(account)
    }

    pub fn generate_token(&self, account: &user::Model) -> Result<TokenResponse, AuthError> {
        let now = Utc::now();
        let exp = now
            + ChronoDuration::from_std(self.config.access_token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;

        let claims = Claims {
            sub: account.id.to_string(),
            name: Some(account.display_name().to_string()),
            roles: roles::for_account(account.is_superadmin),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_expiration.as_secs() as i64,
        })
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.config.jwt_audience.as_str()]);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);

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

        if self.revoked.contains_key(&claims.jti) {
            return Err(AuthError::RevokedToken);
        }

        Ok(claims)
    }

    pub fn revoke(&self, user: &AuthUser) {
        let expiry = DateTime::<Utc>::from_timestamp(user.expires_at, 0).unwrap_or_else(Utc::now);
        self.revoked.insert(user.token_id.clone(), expiry);

        let now = Utc::now();
        self.revoked.retain(|_, until| *until > now);
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

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

    #[error("Token has been revoked")]
    RevokedToken,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::MissingAuth => (
                StatusCode::UNAUTHORIZED,
                "AUTH_MISSING",
                "Authentication required",
            ),
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_CREDENTIALS",
                "Invalid credentials",
            ),
            Self::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_TOKEN",
                "Invalid authentication token",
            ),
            Self::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "AUTH_TOKEN_EXPIRED",
                "Token has expired",
            ),
            Self::RevokedToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REVOKED_TOKEN",
                "Authentication token has been revoked",
            ),
            Self::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                "AUTH_INSUFFICIENT_PERMISSIONS",
                "Insufficient permissions",
            ),
            Self::TokenCreation(_) | Self::DatabaseError(_) | Self::InternalError(_) => {
                tracing::error!(error = %self, "authentication failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AUTH_INTERNAL_ERROR",
                    "Internal server error",
                )
            }
        };

        let body = Json(serde_json::json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Rejects requests whose user lacks `required_role`.
pub async fn role_middleware(
    State(required_role): State<String>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or(AuthError::MissingAuth)?;

    if !user.has_role(&required_role) {
        warn!(user_id = user.user_id, role = %required_role, "role check failed");
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Validates the bearer token and stores the [`AuthUser`] in extensions.
/// Expects an `Arc<AuthService>` extension installed by an outer layer.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return AuthError::InternalError("Authentication service not available".to_string())
                .into_response();
        }
    };

    match extract_auth_from_headers(request.headers(), &auth_service) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthUser, AuthError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingAuth)?;

    AuthUser::try_from(auth_service.validate_token(token)?)
}

/// `/auth` routes
pub fn auth_routes() -> axum::Router<Arc<AuthService>> {
    axum::Router::new()
        .route(
            "/logout",
            axum::routing::post(logout_handler),
        )
        .with_auth()
        .route("/login", axum::routing::post(login_handler))
        .layer(DefaultBodyLimit::max(1024 * 64))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginCredentials,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(credentials): Json<LoginCredentials>,
) -> Result<Json<TokenResponse>, AuthError> {
    let account = auth_service
        .authenticate(&credentials.username, &credentials.password)
        .await?;
    Ok(Json(auth_service.generate_token(&account)?))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 200, description = "Token revoked")),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn logout_handler(
    State(auth_service): State<Arc<AuthService>>,
    auth_user: AuthUser,
) -> Json<serde_json::Value> {
    auth_service.revoke(&auth_user);
    info!(user_id = auth_user.user_id, "user logged out");
    Json(serde_json::json!({ "message": "Successfully logged out" }))
}

/// Router extensions for guarding route groups.
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_role(self, role: &str) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_role(self, role: &str) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            role.to_string(),
            role_middleware,
        ))
        .with_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(
            AuthConfig::new(
                "unit_test_secret_value_with_some_entropy_9f2".into(),
                "aud".into(),
                "iss".into(),
                Duration::from_secs(600),
            ),
            Arc::new(DatabaseConnection::Disconnected),
        )
    }

    fn account(is_superadmin: bool) -> user::Model {
        user::Model {
            id: 5,
            username: "pathy".into(),
            name: Some("Pathy".into()),
            password_hash: String::new(),
            is_superadmin,
            profile_image: None,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn issued_token_validates_and_carries_roles() {
        let svc = service();
        let token = svc.generate_token(&account(true)).unwrap();
        let user = AuthUser::try_from(svc.validate_token(&token.access_token).unwrap()).unwrap();
        assert_eq!(user.user_id, 5);
        assert!(user.is_superadmin());
        assert!(user.has_role(roles::ADMIN));
        assert_eq!(user.actor().name, "Pathy");
    }

    #[test]
    fn revoked_token_is_rejected() {
        let svc = service();
        let token = svc.generate_token(&account(false)).unwrap();
        let user = AuthUser::try_from(svc.validate_token(&token.access_token).unwrap()).unwrap();
        svc.revoke(&user);
        assert!(matches!(
            svc.validate_token(&token.access_token),
            Err(AuthError::RevokedToken)
        ));
    }

    #[test]
    fn token_from_another_secret_is_invalid() {
        let other = AuthService::new(
            AuthConfig::new(
                "a_completely_different_secret_value_123".into(),
                "aud".into(),
                "iss".into(),
                Duration::from_secs(600),
            ),
            Arc::new(DatabaseConnection::Disconnected),
        );
        let token = other.generate_token(&account(false)).unwrap();
        assert!(matches!(
            service().validate_token(&token.access_token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn missing_bearer_header_is_missing_auth() {
        let headers = HeaderMap::new();
        assert!(matches!(
            extract_auth_from_headers(&headers, &service()),
            Err(AuthError::MissingAuth)
        ));
    }
}
