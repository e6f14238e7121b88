//! Authentication middleware for Axum
//!
//! Verifies the bearer session token and attaches the caller's identity to
//! the request. Handlers read it with `Extension<AuthenticatedUser>`.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::domain::Actor;
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig, TokenClaims};

use super::common::error_response;

/// Authentication error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization: Bearer` header
    MissingToken,
    /// Bad signature, wrong issuer, malformed or expired
    InvalidSession,
    InsufficientPermissions,
}

/// Authentication state containing JWT config
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// Verified caller
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub actor: Actor,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: TokenClaims, config: &JwtConfig) -> Self {
        Self {
            actor: claims.to_actor(config),
            email: claims.email,
            name: claims.name,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.actor.is_admin()
    }
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the `Authorization` header value to a caller.
pub fn authenticate(
    auth_header: Option<&str>,
    config: &JwtConfig,
) -> Result<AuthenticatedUser, AuthError> {
    let token = auth_header
        .and_then(extract_token)
        .ok_or(AuthError::MissingToken)?;

    let claims = verify_token(token, config).map_err(|_| AuthError::InvalidSession)?;
    if claims.is_expired() {
        return Err(AuthError::InvalidSession);
    }
    Ok(AuthenticatedUser::from_claims(claims, config))
}

/// JWT authentication middleware
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match authenticate(auth_header, &auth_state.jwt_config) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => auth_error_response(e),
    }
}

/// Admin gate; must run inside `auth_middleware`.
pub async fn require_admin(request: Request<Body>, next: Next) -> Response {
    let is_admin = request
        .extensions()
        .get::<AuthenticatedUser>()
        .is_some_and(AuthenticatedUser::is_admin);

    if is_admin {
        next.run(request).await
    } else {
        auth_error_response(AuthError::InsufficientPermissions)
    }
}

fn auth_error_response(error: AuthError) -> Response {
    let (status, message) = match error {
        AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Not authenticated"),
        AuthError::InvalidSession => (StatusCode::UNAUTHORIZED, "Invalid session"),
        AuthError::InsufficientPermissions => (StatusCode::FORBIDDEN, "Admin access required"),
    };
    error_response(status, message)
}
