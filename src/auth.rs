//! Bearer authentication and authorization.
//!
//! Token issuance lives in an external identity service; this module only
//! verifies JWTs at the boundary and exposes Axum extractors:
//! - [`BearerToken`]: raw `Authorization: Bearer <token>` extraction
//! - [`AuthUser`]: verified user id + role, required on all API routes
//! - [`RequireAdmin`]: admin-only routes (airdrop)
//!
//! Resource-level authorization is the single capability check
//! [`ensure_owner_or_admin`], applied uniformly wherever the contract says
//! "creator or admin".

use crate::error::AppError;
use crate::state::AppState;
use crate::types::UserId;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{DecodingKey, EncodingKey, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role carried in the token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular user
    User,
    /// Administrator
    Admin,
}

/// JWT claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id
    pub sub: Uuid,
    /// Role granted to the subject
    pub role: Role,
    /// Expiry, seconds since the epoch
    pub exp: i64,
}

/// JWT key pair derived from the configured secret.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    /// Derives HS256 keys from a shared secret.
    #[must_use]
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Issue a token for `user_id` with the given role and lifetime.
///
/// The service itself never calls this; it exists for tests and local
/// development, where this process doubles as the identity issuer.
///
/// # Errors
///
/// Returns an error if signing fails.
pub fn issue_token(
    keys: &JwtKeys,
    user_id: UserId,
    role: Role,
    ttl_seconds: i64,
) -> Result<String, AppError> {
    let claims = Claims {
        sub: *user_id.as_uuid(),
        role,
        exp: chrono::Utc::now().timestamp() + ttl_seconds,
    };
    encode(&jsonwebtoken::Header::default(), &claims, &keys.encoding)
        .map_err(|e| AppError::internal("Failed to sign token").with_detail(e.to_string()))
}

/// Bearer token extracted from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Access token required"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| {
                AppError::unauthorized("Invalid authorization format. Expected 'Bearer <token>'")
            })?
            .to_string();

        if token.is_empty() {
            return Err(AppError::unauthorized("Access token required"));
        }

        Ok(Self(token))
    }
}

/// Authenticated caller.
///
/// Use this as a handler parameter to require authentication.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// The verified user id
    pub user_id: UserId,
    /// The verified role
    pub role: Role,
}

impl AuthUser {
    /// Whether the caller holds the administrator role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = BearerToken::from_request_parts(parts, state).await?;

        let data = decode::<Claims>(&bearer.0, &state.jwt_keys.decoding, &Validation::default())
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::unauthorized("Token expired")
                }
                _ => AppError::forbidden("Invalid token"),
            })?;

        Ok(Self {
            user_id: UserId::from_uuid(data.claims.sub),
            role: data.claims.role,
        })
    }
}

/// Authenticated administrator.
///
/// Rejects non-admin callers with 403.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin {
    /// The verified admin user id
    pub user_id: UserId,
}

#[async_trait]
impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::forbidden("Admin access required"));
        }
        Ok(Self {
            user_id: user.user_id,
        })
    }
}

/// Creator-or-admin capability check.
///
/// # Errors
///
/// Returns 403 unless `actor` owns the resource or is an admin.
pub fn ensure_owner_or_admin(actor: &AuthUser, owner: UserId) -> Result<(), AppError> {
    if actor.user_id == owner || actor.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden("Access denied"))
    }
}
