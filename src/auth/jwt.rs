/// Access Token Generation and Validation
///
/// Access tokens are HS256-signed JWTs bound to the fixed
/// `chirpy-access` issuer. They are stateless and cannot be revoked; the
/// short TTL bounds their lifetime.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, ACCESS_TOKEN_ISSUER};
use crate::error::{AppError, AuthError};

/// Default access token lifetime.
pub const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 3600;

/// Issue a signed access token for a user
///
/// # Arguments
/// * `user_id` - Subject of the token
/// * `secret` - Shared HMAC signing key
/// * `ttl` - Lifetime from now
///
/// # Errors
/// Returns error if token encoding fails
pub fn issue_access_token(user_id: Uuid, secret: &str, ttl: Duration) -> Result<String, AppError> {
    let claims = Claims::new(user_id, ttl.num_seconds());

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Validate an access token and return its claims
///
/// Checks the signature, the expiry (no leeway) and the issuer.
///
/// # Errors
/// - `AuthError::TokenExpired` once `exp` has passed
/// - `AuthError::SignatureInvalid` if the token was signed with another key
/// - `AuthError::IssuerMismatch` if `iss` is not `chirpy-access`
/// - `AuthError::TokenMalformed` for anything that does not parse
pub fn decode_access_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_issuer(&[ACCESS_TOKEN_ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    let claims = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            let kind = match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature => AuthError::SignatureInvalid,
                ErrorKind::InvalidIssuer => AuthError::IssuerMismatch,
                _ => AuthError::TokenMalformed,
            };
            tracing::debug!("JWT validation error: {}", e);
            kind
        })?;

    // jsonwebtoken only rejects `exp < now`; the expiry second itself is already invalid.
    if claims.exp <= Utc::now().timestamp() {
        return Err(AuthError::TokenExpired);
    }

    Ok(claims)
}

/// Validate an access token and return the user it was issued to
pub fn validate_access_token(token: &str, secret: &str) -> Result<Uuid, AuthError> {
    decode_access_token(token, secret)?.user_id()
}
