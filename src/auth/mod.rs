/*!
 * # Authentication and Authorization Module
 *
 * The service never authenticates users itself: an external identity
 * provider issues bearer tokens whose claims carry the actor's id, display
 * name and directory group memberships. This module validates those tokens,
 * resolves the actor's effective permissions from the role table and makes
 * the result available to handlers as an [`AuthUser`] extractor.
 *
 * Authorization is permission-string based (`resource:action`), gated per
 * route group via [`AuthRouterExt::with_permission`].
 */

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::db::DbPool;

pub mod permissions;
mod rbac;

pub use permissions::{consts, is_permission_implied, Actions, Permission, Resources, PERMISSIONS};
pub use rbac::{effective_permissions, load_effective_permissions};

/// Claim structure for bearer tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,            // Subject (user ID)
    pub name: Option<String>,   // User's display name
    pub email: Option<String>,  // User's email
    pub groups: Vec<String>,    // Directory group ids asserted by the IdP
    pub jti: String,            // Unique token identifier
    pub iat: i64,               // Issued at time
    pub exp: i64,               // Expiration time
    pub iss: String,            // Issuer
    pub aud: String,            // Audience
}

/// Authenticated actor resolved from a validated token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub groups: Vec<String>,
    pub permissions: HashSet<String>,
    pub token_id: String,
}

impl AuthUser {
    /// Check if the user holds a permission (wildcard-aware).
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .iter()
            .any(|p| is_permission_implied(p, permission))
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: String,
    pub audience: String,
    pub token_expiration_secs: i64,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        issuer: String,
        audience: String,
        token_expiration_secs: i64,
    ) -> Self {
        Self {
            jwt_secret,
            issuer,
            audience,
            token_expiration_secs,
        }
    }
}

/// Validates tokens and resolves actors against the role table.
#[derive(Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    pub db: Arc<DbPool>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DbPool>) -> Self {
        Self { config, db }
    }

    /// Issues a token for a known user. Intended for service-to-service use
    /// and tests; interactive sign-in happens at the identity provider.
    pub fn issue_token(
        &self,
        user_id: Uuid,
        name: Option<String>,
        email: Option<String>,
        groups: Vec<String>,
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            name,
            email,
            groups,
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + self.config.token_expiration_secs,
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::InternalError(format!("failed to sign token: {e}")))
    }

    /// Validates a token's signature, expiry, issuer and audience.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.config.audience.clone()]);
        validation.set_issuer(&[self.config.issuer.clone()]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken(e.to_string()),
        })
    }

    /// Resolves the full actor: validated claims plus the effective
    /// permission set for the asserted groups.
    pub async fn resolve_user(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = self.validate_token(token)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::InvalidToken("subject is not a valid user id".into()))?;

        let permissions = load_effective_permissions(self.db.as_ref(), &claims.groups)
            .await
            .map_err(|e| AuthError::InternalError(format!("permission lookup failed: {e}")))?;

        debug!(
            user_id = %user_id,
            groups = claims.groups.len(),
            permissions = permissions.len(),
            "resolved authenticated user"
        );

        Ok(AuthUser {
            user_id,
            name: claims.name,
            email: claims.email,
            groups: claims.groups,
            permissions,
            token_id: claims.jti,
        })
    }
}

/// Authentication/authorization failures surfaced to clients.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Token has expired")]
    ExpiredToken,
    #[error("Insufficient permissions")]
    InsufficientPermissions,
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, error_message) = match &self {
            Self::MissingAuth => (
                StatusCode::UNAUTHORIZED,
                "AUTH_MISSING",
                self.to_string(),
            ),
            Self::InvalidToken(_) => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_TOKEN",
                self.to_string(),
            ),
            Self::ExpiredToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_EXPIRED_TOKEN",
                self.to_string(),
            ),
            Self::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                "AUTH_INSUFFICIENT_PERMISSIONS",
                self.to_string(),
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

#[async_trait]
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

/// Authentication middleware: validates the bearer token and stores the
/// resolved [`AuthUser`] in request extensions.
///
/// Expects an `Arc<AuthService>` in the request extensions, injected by an
/// outer layer at router construction time.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
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

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .map(str::to_owned);

    let token = match token {
        Some(token) if !token.is_empty() => token,
        _ => return AuthError::MissingAuth.into_response(),
    };

    match auth_service.resolve_user(&token).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Permission middleware: checks the authenticated user against the required
/// permission for the route group.
pub async fn permission_middleware(
    State(required_permission): State<String>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = match request.extensions().get::<AuthUser>() {
        Some(user) => user.clone(),
        None => return Err(AuthError::MissingAuth),
    };

    if !user.has_permission(&required_permission) {
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_permission(self, permission: &str) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_permission(self, permission: &str) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            permission.to_string(),
            permission_middleware,
        ))
        .with_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(perms: &[&str]) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            name: Some("Test".into()),
            email: None,
            groups: vec![],
            permissions: perms.iter().map(|p| p.to_string()).collect(),
            token_id: "t-1".into(),
        }
    }

    #[test]
    fn has_permission_exact_and_wildcard() {
        let user = user_with(&["moves:approve"]);
        assert!(user.has_permission("moves:approve"));
        assert!(!user.has_permission("moves:create"));

        let admin = user_with(&["admin:*"]);
        assert!(admin.has_permission("moves:approve"));
        assert!(admin.has_permission("items:read"));
    }

    #[test]
    fn auth_error_status_codes() {
        assert_eq!(
            AuthError::MissingAuth.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::ExpiredToken.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::InsufficientPermissions.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
