/// Session lifecycle
///
/// Login, access-token refresh and refresh-token revocation. Nothing is held
/// in memory between calls: the refresh token rows are the only session state.

use std::sync::Arc;

use chrono::Duration;

use crate::auth::{issue_access_token, PasswordHasher, RefreshTokenStore};
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError};
use crate::store::{Storage, UserRecord, UserStore};

/// Result of a successful login.
#[derive(Debug)]
pub struct LoginSession {
    pub user: UserRecord,
    pub access_token: String,
    pub refresh_token: String,
}

pub struct SessionService {
    users: Arc<dyn UserStore>,
    refresh_tokens: RefreshTokenStore,
    hasher: PasswordHasher,
    token_secret: String,
    access_token_ttl: Duration,
    /// Verified against when the email is unknown, so both login failures
    /// pay for one bcrypt comparison.
    dummy_hash: Option<String>,
}

const DUMMY_PASSWORD: &str = "chirpy-login-timing-placeholder";

impl SessionService {
    pub fn new(storage: &Storage, auth: &AuthSettings) -> Self {
        let hasher = PasswordHasher::with_cost(auth.password_cost);
        let dummy_hash = hasher
            .hash(DUMMY_PASSWORD)
            .map_err(|e| tracing::error!("Failed to prepare dummy password hash: {}", e))
            .ok();

        Self {
            users: storage.users.clone(),
            refresh_tokens: RefreshTokenStore::new(storage.refresh_tokens.clone()),
            hasher,
            token_secret: auth.token_secret.clone(),
            access_token_ttl: auth.access_token_ttl(),
            dummy_hash,
        }
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    /// Verify email + password and open a session
    ///
    /// # Errors
    /// - `AuthError::UnknownEmail` / `AuthError::CredentialMismatch`, which
    ///   the HTTP layer reports identically
    /// - `AuthError::HashingFault` if the stored hash is unusable
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginSession, AppError> {
        let user = match self.users.get_user_by_email(email).await? {
            Some(user) => user,
            None => {
                if let Some(dummy) = &self.dummy_hash {
                    let _ = self.hasher.verify(dummy, password);
                }
                return Err(AuthError::UnknownEmail.into());
            }
        };

        self.hasher.verify(&user.hashed_password, password)?;

        let access_token = issue_access_token(user.id, &self.token_secret, self.access_token_ttl)?;
        let refresh_token = self.refresh_tokens.issue(user.id).await?;

        tracing::info!(user_id = %user.id, "Session opened");

        Ok(LoginSession {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Exchange a valid refresh token for a new access token
    ///
    /// The refresh token itself is not rotated and stays valid.
    pub async fn refresh_access(&self, refresh_token: &str) -> Result<String, AppError> {
        let user_id = self.refresh_tokens.validate(refresh_token).await?;
        let access_token = issue_access_token(user_id, &self.token_secret, self.access_token_ttl)?;

        tracing::info!(user_id = %user_id, "Access token refreshed");
        Ok(access_token)
    }

    /// Permanently revoke a refresh token
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AppError> {
        self.refresh_tokens.revoke(refresh_token).await?;
        tracing::info!("Refresh token revoked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{decode_access_token, validate_access_token};

    const SECRET: &str = "session-test-secret";

    fn settings() -> AuthSettings {
        AuthSettings {
            token_secret: SECRET.to_string(),
            polka_key: "polka".to_string(),
            access_token_expiry: 3600,
            password_cost: 4,
        }
    }

    async fn service_with_user(email: &str, password: &str) -> (SessionService, UserRecord) {
        let storage = Storage::in_memory();
        let service = SessionService::new(&storage, &settings());
        let hashed = service.hasher().hash(password).unwrap();
        let user = storage.users.create_user(email, &hashed).await.unwrap();
        (service, user)
    }

    fn kind(err: AppError) -> AuthError {
        err.auth_kind().cloned().expect("expected an auth error")
    }

    #[tokio::test]
    async fn test_login_issues_both_tokens() {
        let (service, user) = service_with_user("saul@bettercall.com", "123456").await;

        let session = service.login("saul@bettercall.com", "123456").await.unwrap();

        assert_eq!(session.user.id, user.id);
        let claims = decode_access_token(&session.access_token, SECRET).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(!session.refresh_token.is_empty());
        assert_ne!(session.refresh_token, session.access_token);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (service, _) = service_with_user("saul@bettercall.com", "123456").await;

        let err = service.login("saul@bettercall.com", "654321").await.unwrap_err();
        assert_eq!(kind(err), AuthError::CredentialMismatch);
    }

    #[tokio::test]
    async fn test_unknown_email_still_runs_a_bcrypt_comparison() {
        let (service, _) = service_with_user("saul@bettercall.com", "123456").await;

        let dummy = service.dummy_hash.as_deref().expect("dummy hash prepared");
        assert!(dummy.starts_with("$2b$04$"));
        assert_eq!(
            service.hasher().verify(dummy, "123456").unwrap_err().auth_kind(),
            Some(&AuthError::CredentialMismatch)
        );

        let err = service.login("nobody@bettercall.com", DUMMY_PASSWORD).await.unwrap_err();
        assert_eq!(kind(err), AuthError::UnknownEmail);
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let (service, _) = service_with_user("saul@bettercall.com", "123456").await;

        let err = service.login("walt@heisenberg.com", "123456").await.unwrap_err();
        assert_eq!(kind(err), AuthError::UnknownEmail);
    }

    #[tokio::test]
    async fn test_refresh_resolves_to_login_identity() {
        let (service, user) = service_with_user("saul@bettercall.com", "123456").await;
        let session = service.login("saul@bettercall.com", "123456").await.unwrap();

        let access = service.refresh_access(&session.refresh_token).await.unwrap();

        assert_eq!(validate_access_token(&access, SECRET), Ok(user.id));
        // Not rotated: the same refresh token keeps working.
        assert!(service.refresh_access(&session.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_after_revoke_fails() {
        let (service, _) = service_with_user("saul@bettercall.com", "123456").await;
        let session = service.login("saul@bettercall.com", "123456").await.unwrap();

        service.revoke(&session.refresh_token).await.unwrap();
        service.revoke(&session.refresh_token).await.unwrap();

        let err = service.refresh_access(&session.refresh_token).await.unwrap_err();
        assert_eq!(kind(err), AuthError::TokenRevoked);
    }

    #[tokio::test]
    async fn test_access_token_is_not_a_refresh_token() {
        let (service, _) = service_with_user("saul@bettercall.com", "123456").await;
        let session = service.login("saul@bettercall.com", "123456").await.unwrap();

        let err = service.refresh_access(&session.access_token).await.unwrap_err();
        assert_eq!(kind(err), AuthError::TokenNotFound);
    }

    #[tokio::test]
    async fn test_each_login_gets_its_own_refresh_token() {
        let (service, _) = service_with_user("saul@bettercall.com", "123456").await;

        let first = service.login("saul@bettercall.com", "123456").await.unwrap();
        let second = service.login("saul@bettercall.com", "123456").await.unwrap();
        assert_ne!(first.refresh_token, second.refresh_token);

        service.revoke(&first.refresh_token).await.unwrap();
        assert!(service.refresh_access(&second.refresh_token).await.is_ok());
    }
}
