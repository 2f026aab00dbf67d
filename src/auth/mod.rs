//! Authentication and authorization.
//!
//! Bearer-token (JWT) identity on every protected call. Tokens carry the
//! acting user's id, username, and role; the `require_auth` middleware
//! validates the token and makes an [`AuthUser`] available to handlers via
//! request extensions.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::user::{self, Entity as User, UserRole};
use crate::errors::ServiceError;

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    pub username: String,
    pub role: String,
    /// JWT ID (unique identifier for this token)
    pub jti: String,
    /// Issued at time
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

/// Authenticated identity extracted from a validated token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i32,
    pub username: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin.as_str()
    }
}

/// Authentication errors, rendered as JSON like every other API error
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication token")]
    MissingToken,

    #[error("Invalid authentication token")]
    InvalidToken,

    #[error("Authentication token expired")]
    ExpiredToken,

    #[error("Internal authentication error: {0}")]
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "AUTH_MISSING_TOKEN"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "AUTH_INVALID_TOKEN"),
            AuthError::ExpiredToken => (StatusCode::UNAUTHORIZED, "AUTH_EXPIRED_TOKEN"),
            AuthError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "AUTH_INTERNAL_ERROR"),
        };

        let body = Json(serde_json::json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_expiry: Duration,
}

impl AuthConfig {
    pub fn new(jwt_secret: String, token_expiry: Duration) -> Self {
        Self {
            jwt_secret,
            token_expiry,
        }
    }
}

/// Issues and validates tokens, and owns the user credential lifecycle.
#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    db: Arc<DbPool>,
}

/// Result of a successful login or signup
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub user: user::Model,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DbPool>) -> Self {
        Self { config, db }
    }

    /// Issue a signed token for the given user
    pub fn generate_token(&self, user: &user::Model) -> Result<String, ServiceError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + chrono::Duration::seconds(self.config.token_expiry.as_secs() as i64))
                .timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::InternalError(format!("token encoding failed: {}", e)))
    }

    /// Validate a bearer token and return its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })
    }

    /// Authenticate a username/password pair and issue a token
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ServiceError> {
        let user = User::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await?;

        let user = match user {
            Some(u) if verify_password(password, &u.password_hash) => u,
            _ => {
                debug!(username, "login rejected");
                return Err(ServiceError::Unauthorized(
                    "Invalid username or password".to_string(),
                ));
            }
        };

        let access_token = self.generate_token(&user)?;
        Ok(TokenPair { access_token, user })
    }

    /// Public self-registration; the new account always gets the
    /// `technician` role and is logged in immediately.
    pub async fn signup(&self, username: &str, password: &str) -> Result<TokenPair, ServiceError> {
        let user = self
            .create_user(username, password, UserRole::Technician)
            .await?;
        let access_token = self.generate_token(&user)?;
        Ok(TokenPair { access_token, user })
    }

    /// Admin-driven registration with an explicit role.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        role: UserRole,
    ) -> Result<user::Model, ServiceError> {
        self.create_user(username, password, role).await
    }

    async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: UserRole,
    ) -> Result<user::Model, ServiceError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ServiceError::ValidationError(
                "Username and password are required".to_string(),
            ));
        }

        let existing = User::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict("Username already exists".to_string()));
        }

        let model = user::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(hash_password(password)?),
            role: Set(role.as_str().to_string()),
            ..Default::default()
        };

        let user = model.insert(self.db.as_ref()).await?;
        Ok(user)
    }

    /// Look up the current user by id (e.g. for `/auth/me`)
    pub async fn current_user(&self, user_id: i32) -> Result<user::Model, ServiceError> {
        User::find_by_id(user_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User with id {} not found", user_id)))
    }
}

/// Hash a password into an Argon2 PHC string
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::InternalError(format!("password hashing failed: {}", e)))
}

/// Verify a password against a stored hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
        .is_ok()
}

/// Middleware guarding every protected route. Validates the bearer token
/// and inserts the resulting [`AuthUser`] into request extensions.
pub async fn require_auth(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(AuthError::MissingToken)?;

    let claims = auth_service.validate_token(token)?;
    let user_id: i32 = claims
        .sub
        .parse()
        .map_err(|_| AuthError::InvalidToken)?;

    request.extensions_mut().insert(AuthUser {
        id: user_id,
        username: claims.username,
        role: claims.role,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("s3cret!").unwrap();
        assert_ne!(hash, "s3cret!");
        assert!(verify_password("s3cret!", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn token_round_trip_preserves_identity() {
        let svc = AuthService::new(
            AuthConfig::new(
                "test_secret_key_for_testing_purposes_only_32chars".to_string(),
                Duration::from_secs(3600),
            ),
            Arc::new(sea_orm::DatabaseConnection::Disconnected),
        );

        let user = user::Model {
            id: 7,
            username: "admin".to_string(),
            password_hash: String::new(),
            role: "admin".to_string(),
            created_at: Utc::now(),
        };

        let token = svc.generate_token(&user).unwrap();
        let claims = svc.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.role, "admin");
    }

    #[test]
    fn tampered_token_is_rejected() {
        let svc = AuthService::new(
            AuthConfig::new(
                "test_secret_key_for_testing_purposes_only_32chars".to_string(),
                Duration::from_secs(3600),
            ),
            Arc::new(sea_orm::DatabaseConnection::Disconnected),
        );
        assert!(matches!(
            svc.validate_token("not-a-token"),
            Err(AuthError::InvalidToken)
        ));
    }
}
