/// Access token claims
///
/// Registered JWT claims (RFC 7519) carried by access tokens. No other
/// user data rides in the token.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;

/// Issuer stamped on every access token.
pub const ACCESS_TOKEN_ISSUER: &str = "chirpy-access";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Issuer
    pub iss: String,
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
}

impl Claims {
    /// Create claims for `user_id` valid for `ttl_seconds` from now.
    pub fn new(user_id: Uuid, ttl_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            iss: ACCESS_TOKEN_ISSUER.to_string(),
            sub: user_id.to_string(),
            iat: now,
            exp: now + ttl_seconds,
        }
    }

    /// Extract user ID from claims
    ///
    /// # Errors
    /// Returns `AuthError::TokenMalformed` if the subject is not a UUID
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::TokenMalformed)
    }
}
