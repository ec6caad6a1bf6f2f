/// Persistence contracts
///
/// The service only talks to storage through these traits. `postgres`
/// backs them with sqlx; `memory` keeps everything in process for tests
/// and local runs.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::DatabaseError;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// A user row. The password is only ever held as a bcrypt hash.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub hashed_password: String,
    pub is_chirpy_red: bool,
}

/// A persisted refresh token, keyed by the SHA-256 digest of the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub token_hash: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Expired once `expires_at <= now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChirpRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `UniqueConstraintViolation` if the email is taken.
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<UserRecord, DatabaseError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DatabaseError>;
    async fn get_user(&self, id: Uuid) -> Result<Option<UserRecord>, DatabaseError>;
    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<UserRecord>, DatabaseError>;
    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<Option<UserRecord>, DatabaseError>;
    /// Removes every user together with their tokens and chirps.
    async fn delete_all_users(&self) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Fails with `UniqueConstraintViolation` if the hash already exists.
    async fn insert_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), DatabaseError>;
    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, DatabaseError>;
    /// Sets `revoked_at` if it is still unset. Returns whether the row exists.
    async fn mark_revoked(&self, token_hash: &str, revoked_at: DateTime<Utc>) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait ChirpStore: Send + Sync {
    async fn create_chirp(&self, body: &str, user_id: Uuid) -> Result<ChirpRecord, DatabaseError>;
    /// All chirps, or only those of `author`, in insertion order.
    async fn list_chirps(&self, author: Option<Uuid>) -> Result<Vec<ChirpRecord>, DatabaseError>;
    async fn get_chirp(&self, id: Uuid) -> Result<Option<ChirpRecord>, DatabaseError>;
    /// Returns whether a chirp was deleted.
    async fn delete_chirp(&self, id: Uuid) -> Result<bool, DatabaseError>;
}

/// The storage backends handed to the application.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserStore>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
    pub chirps: Arc<dyn ChirpStore>,
}

impl Storage {
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self::from_backend(Arc::new(PgStore::new(pool)))
    }

    pub fn in_memory() -> Self {
        Self::from_backend(Arc::new(InMemoryStore::default()))
    }

    fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: UserStore + RefreshTokenRepository + ChirpStore + 'static,
    {
        Self {
            users: backend.clone(),
            refresh_tokens: backend.clone(),
            chirps: backend,
        }
    }
}
