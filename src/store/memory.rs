use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ChirpRecord, ChirpStore, RefreshTokenRecord, RefreshTokenRepository, UserRecord, UserStore};
use crate::error::DatabaseError;

/// In-process storage backend.
///
/// One lock guards all tables so that deleting users can cascade to their
/// tokens and chirps atomically, the way the foreign keys do in Postgres.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, UserRecord>,
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
    // Vec keeps insertion order for listing.
    chirps: Vec<ChirpRecord>,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<UserRecord, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(email, None) {
            return Err(DatabaseError::UniqueConstraintViolation(
                "users_email_key".to_string(),
            ));
        }

        let now = Utc::now();
        let user = UserRecord {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            is_chirpy_red: false,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<UserRecord>, DatabaseError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<UserRecord>, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(email, Some(id)) {
            return Err(DatabaseError::UniqueConstraintViolation(
                "users_email_key".to_string(),
            ));
        }

        Ok(tables.users.get_mut(&id).map(|user| {
            user.email = email.to_string();
            user.hashed_password = hashed_password.to_string();
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<Option<UserRecord>, DatabaseError> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.get_mut(&id).map(|user| {
            user.is_chirpy_red = true;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn delete_all_users(&self) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.users.clear();
        tables.refresh_tokens.clear();
        tables.chirps.clear();
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryStore {
    async fn insert_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&record.user_id) {
            return Err(DatabaseError::QueryExecution(
                "refresh_tokens_user_id_fkey".to_string(),
            ));
        }
        if tables.refresh_tokens.contains_key(&record.token_hash) {
            return Err(DatabaseError::UniqueConstraintViolation(
                "refresh_tokens_pkey".to_string(),
            ));
        }

        tables
            .refresh_tokens
            .insert(record.token_hash.clone(), record.clone());
        Ok(())
    }

    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, DatabaseError> {
        Ok(self.tables.read().await.refresh_tokens.get(token_hash).cloned())
    }

    async fn mark_revoked(&self, token_hash: &str, revoked_at: DateTime<Utc>) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        match tables.refresh_tokens.get_mut(token_hash) {
            Some(record) => {
                record.revoked_at.get_or_insert(revoked_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ChirpStore for InMemoryStore {
    async fn create_chirp(&self, body: &str, user_id: Uuid) -> Result<ChirpRecord, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(DatabaseError::QueryExecution("chirps_user_id_fkey".to_string()));
        }

        let now = Utc::now();
        let chirp = ChirpRecord {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: body.to_string(),
            user_id,
        };
        tables.chirps.push(chirp.clone());
        Ok(chirp)
    }

    async fn list_chirps(&self, author: Option<Uuid>) -> Result<Vec<ChirpRecord>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .chirps
            .iter()
            .filter(|c| author.map_or(true, |id| c.user_id == id))
            .cloned()
            .collect())
    }

    async fn get_chirp(&self, id: Uuid) -> Result<Option<ChirpRecord>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.chirps.iter().find(|c| c.id == id).cloned())
    }

    async fn delete_chirp(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.chirps.len();
        tables.chirps.retain(|c| c.id != id);
        Ok(tables.chirps.len() != before)
    }
}
