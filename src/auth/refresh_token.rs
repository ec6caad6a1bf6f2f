/// Refresh Token Management
///
/// Handles refresh token generation, storage, validation, and revocation.
/// Refresh tokens are:
/// - Cryptographically secure random 64-character strings
/// - Hashed with SHA-256 before storage (never store plaintext)
/// - Valid for a fixed 60 days from issuance; use does not extend them
/// - Revoked permanently; a revoked token never becomes valid again

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{AppError, AuthError, DatabaseError};
use crate::store::{RefreshTokenRecord, RefreshTokenRepository};

pub const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 60;
const REFRESH_TOKEN_LENGTH: usize = 64;
const MAX_ISSUE_ATTEMPTS: usize = 3;

/// Generate a new cryptographically secure refresh token
///
/// 64 base62 characters from the thread-local CSPRNG (~381 bits).
/// The plaintext goes to the client; the server keeps only its hash.
pub fn generate_refresh_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Hash a refresh token using SHA-256
pub(crate) fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Issues, validates and revokes refresh tokens.
///
/// Owns every write to the refresh token rows.
#[derive(Clone)]
pub struct RefreshTokenStore {
    repository: Arc<dyn RefreshTokenRepository>,
}

impl RefreshTokenStore {
    pub fn new(repository: Arc<dyn RefreshTokenRepository>) -> Self {
        Self { repository }
    }

    /// Issue a new refresh token for `user_id`
    ///
    /// # Errors
    /// Returns error if the token cannot be persisted
    pub async fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        for attempt in 1..=MAX_ISSUE_ATTEMPTS {
            let token = generate_refresh_token();
            let now = Utc::now();
            let record = RefreshTokenRecord {
                token_hash: hash_token(&token),
                user_id,
                created_at: now,
                expires_at: now + Duration::days(REFRESH_TOKEN_LIFETIME_DAYS),
                revoked_at: None,
            };

            match self.repository.insert_refresh_token(&record).await {
                Ok(()) => return Ok(token),
                Err(DatabaseError::UniqueConstraintViolation(_)) => {
                    tracing::warn!(attempt, "Refresh token collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::Internal(
            "Could not issue a unique refresh token".to_string(),
        ))
    }

    /// Validate a refresh token
    ///
    /// # Returns
    /// User ID associated with the token if valid
    ///
    /// # Errors
    /// - `AuthError::TokenNotFound` if no row matches
    /// - `AuthError::TokenRevoked` if the token was revoked
    /// - `AuthError::TokenExpired` once `expires_at <= now`
    pub async fn validate(&self, token: &str) -> Result<Uuid, AppError> {
        let record = self
            .repository
            .find_refresh_token(&hash_token(token))
            .await?
            .ok_or_else(|| {
                tracing::warn!("Refresh token not found");
                AuthError::TokenNotFound
            })?;

        if record.is_revoked() {
            tracing::warn!(user_id = %record.user_id, "Attempt to use revoked refresh token");
            return Err(AuthError::TokenRevoked.into());
        }

        if record.is_expired_at(Utc::now()) {
            tracing::info!(user_id = %record.user_id, "Refresh token expired");
            return Err(AuthError::TokenExpired.into());
        }

        Ok(record.user_id)
    }

    /// Revoke a refresh token
    ///
    /// Revoking an already revoked token succeeds and keeps the original
    /// `revoked_at`.
    ///
    /// # Errors
    /// Returns `AuthError::TokenNotFound` if the token does not exist
    pub async fn revoke(&self, token: &str) -> Result<(), AppError> {
        let found = self
            .repository
            .mark_revoked(&hash_token(token), Utc::now())
            .await?;

        if !found {
            tracing::warn!("Attempt to revoke unknown refresh token");
            return Err(AuthError::TokenNotFound.into());
        }

        Ok(())
    }
}
