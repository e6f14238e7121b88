//! JWT session tokens
//!
//! Tokens are issued by the identity collaborator; this service verifies
//! them and turns the claims into an explicit [`Actor`]. `create_token`
//! exists for local tooling and tests.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::{Actor, Role};

/// Placeholder secret used when neither the config file nor `JWT_SECRET`
/// provides one. The server refuses to start with it.
pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Shared HS256 secret
    pub secret: String,
    /// Token expiration time in hours (locally issued tokens only)
    pub expiration_hours: i64,
    /// Expected `iss` claim
    pub issuer: String,
    /// Role claim value that grants administrator rights
    pub admin_role: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string()),
            expiration_hours: std::env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(24),
            issuer: "tour-booking".to_string(),
            admin_role: "admin".to_string(),
        }
    }
}

impl JwtConfig {
    /// True when the secret is blank or still the built-in placeholder,
    /// which anyone could use to sign admin tokens.
    pub fn has_insecure_secret(&self) -> bool {
        let secret = self.secret.trim();
        secret.is_empty() || secret == DEFAULT_JWT_SECRET
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration_hours", &self.expiration_hours)
            .field("issuer", &self.issuer)
            .field("admin_role", &self.admin_role)
            .finish()
    }
}

/// JWT TokenClaims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// User role
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl TokenClaims {
    pub fn new(user_id: &str, email: Option<&str>, role: &str, config: &JwtConfig) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(config.expiration_hours);

        Self {
            sub: user_id.to_string(),
            email: email.map(str::to_string),
            name: None,
            role: role.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
        }
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    pub fn is_admin(&self, config: &JwtConfig) -> bool {
        self.role == config.admin_role
    }

    /// Identity passed into every application call
    pub fn to_actor(&self, config: &JwtConfig) -> Actor {
        Actor {
            user_id: self.sub.clone(),
            role: if self.is_admin(config) {
                Role::Admin
            } else {
                Role::Traveler
            },
        }
    }
}

/// Create a JWT token for a user
pub fn create_token(
    user_id: &str,
    email: Option<&str>,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let token_claims = TokenClaims::new(user_id, email, role, config);

    encode(
        &Header::default(),
        &token_claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify and decode a JWT token
pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".into(),
            expiration_hours: 1,
            issuer: "tour-booking".into(),
            admin_role: "admin".into(),
        }
    }

    #[test]
    fn token_round_trip_yields_actor() {
        let cfg = config();
        let token = create_token("user-1", Some("a@example.com"), "user", &cfg).unwrap();
        let claims = verify_token(&token, &cfg).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email.as_deref(), Some("a@example.com"));
        assert!(!claims.is_expired());
        assert_eq!(claims.to_actor(&cfg), Actor::traveler("user-1"));
    }

    #[test]
    fn admin_role_maps_to_admin_actor() {
        let cfg = config();
        let token = create_token("staff", None, "admin", &cfg).unwrap();
        let claims = verify_token(&token, &cfg).unwrap();
        assert!(claims.to_actor(&cfg).is_admin());
    }

    #[test]
    fn wrong_secret_or_issuer_is_rejected() {
        let cfg = config();
        let token = create_token("user-1", None, "user", &cfg).unwrap();

        let other_secret = JwtConfig {
            secret: "other".into(),
            ..config()
        };
        assert!(verify_token(&token, &other_secret).is_err());

        let other_issuer = JwtConfig {
            issuer: "someone-else".into(),
            ..config()
        };
        assert!(verify_token(&token, &other_issuer).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let cfg = JwtConfig {
            expiration_hours: -2,
            ..config()
        };
        let token = create_token("user-1", None, "user", &cfg).unwrap();
        assert!(verify_token(&token, &config()).is_err());
    }

    #[test]
    fn placeholder_or_blank_secret_is_insecure() {
        assert!(!config().has_insecure_secret());

        let placeholder = JwtConfig {
            secret: DEFAULT_JWT_SECRET.into(),
            ..config()
        };
        assert!(placeholder.has_insecure_secret());

        let blank = JwtConfig {
            secret: "   ".into(),
            ..config()
        };
        assert!(blank.has_insecure_secret());
    }
}
