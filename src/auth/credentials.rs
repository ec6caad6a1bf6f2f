/// Authorization header parsing
///
/// Accepted forms (case-sensitive scheme, exactly one space):
/// - `Authorization: Bearer <token>` for user sessions
/// - `Authorization: ApiKey <key>` for the payment webhook

use actix_web::http::header::{HeaderMap, AUTHORIZATION};

use crate::error::AuthError;

const BEARER_PREFIX: &str = "Bearer ";
const API_KEY_PREFIX: &str = "ApiKey ";

/// Credential carried by the `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationCredential {
    Bearer(String),
    ApiKey(String),
}

/// Parse the `Authorization` header into a tagged credential
///
/// # Errors
/// - `AuthError::HeaderMissing` if there is no `Authorization` header
/// - `AuthError::HeaderMalformed` for an unknown scheme, a missing value,
///   or a value containing whitespace
pub fn parse_authorization(headers: &HeaderMap) -> Result<AuthorizationCredential, AuthError> {
    let raw = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::HeaderMissing)?
        .to_str()
        .map_err(|_| AuthError::HeaderMalformed)?;

    if let Some(token) = raw.strip_prefix(BEARER_PREFIX) {
        return credential_value(token).map(AuthorizationCredential::Bearer);
    }
    if let Some(key) = raw.strip_prefix(API_KEY_PREFIX) {
        return credential_value(key).map(AuthorizationCredential::ApiKey);
    }

    Err(AuthError::HeaderMalformed)
}

fn credential_value(value: &str) -> Result<String, AuthError> {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(AuthError::HeaderMalformed);
    }
    Ok(value.to_string())
}

/// Extract a bearer token; any other scheme is malformed.
pub fn extract_bearer(headers: &HeaderMap) -> Result<String, AuthError> {
    match parse_authorization(headers)? {
        AuthorizationCredential::Bearer(token) => Ok(token),
        AuthorizationCredential::ApiKey(_) => Err(AuthError::HeaderMalformed),
    }
}

/// Extract an API key; any other scheme is malformed.
pub fn extract_api_key(headers: &HeaderMap) -> Result<String, AuthError> {
    match parse_authorization(headers)? {
        AuthorizationCredential::ApiKey(key) => Ok(key),
        AuthorizationCredential::Bearer(_) => Err(AuthError::HeaderMalformed),
    }
}
