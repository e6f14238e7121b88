//! Session token verification (identity collaborator boundary)

pub mod jwt;

pub use jwt::{create_token, verify_token, JwtConfig, TokenClaims};
