use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{ChirpRecord, ChirpStore, RefreshTokenRecord, RefreshTokenRepository, UserRecord, UserStore};
use crate::error::DatabaseError;

const USER_COLUMNS: &str = "id, created_at, updated_at, email, hashed_password, is_chirpy_red";
const CHIRP_COLUMNS: &str = "id, created_at, updated_at, body, user_id";

/// Postgres storage backend. Schema lives in `migrations/`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: PgRow) -> Result<UserRecord, sqlx::Error> {
    Ok(UserRecord {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        email: row.try_get("email")?,
        hashed_password: row.try_get("hashed_password")?,
        is_chirpy_red: row.try_get("is_chirpy_red")?,
    })
}

fn chirp_from_row(row: PgRow) -> Result<ChirpRecord, sqlx::Error> {
    Ok(ChirpRecord {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        body: row.try_get("body")?,
        user_id: row.try_get("user_id")?,
    })
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<UserRecord, DatabaseError> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (id, created_at, updated_at, email, hashed_password)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(now)
        .bind(now)
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await?;

        Ok(user_from_row(row)?)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(user_from_row).transpose()?)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<UserRecord>, DatabaseError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(user_from_row).transpose()?)
    }

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<UserRecord>, DatabaseError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET email = $1, hashed_password = $2, updated_at = $3
            WHERE id = $4
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(email)
        .bind(hashed_password)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(user_from_row).transpose()?)
    }

    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<Option<UserRecord>, DatabaseError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET is_chirpy_red = true, updated_at = $1
            WHERE id = $2
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(user_from_row).transpose()?)
    }

    async fn delete_all_users(&self) -> Result<(), DatabaseError> {
        // refresh_tokens and chirps cascade.
        sqlx::query("DELETE FROM users").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenRepository for PgStore {
    async fn insert_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token_hash, user_id, created_at, updated_at, expires_at, revoked_at)
            VALUES ($1, $2, $3, $3, $4, $5)
            "#,
        )
        .bind(&record.token_hash)
        .bind(record.user_id)
        .bind(record.created_at)
        .bind(record.expires_at)
        .bind(record.revoked_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, DatabaseError> {
        let row = sqlx::query_as::<_, (String, Uuid, DateTime<Utc>, DateTime<Utc>, Option<DateTime<Utc>>)>(
            r#"
            SELECT token_hash, user_id, created_at, expires_at, revoked_at
            FROM refresh_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(
            |(token_hash, user_id, created_at, expires_at, revoked_at)| RefreshTokenRecord {
                token_hash,
                user_id,
                created_at,
                expires_at,
                revoked_at,
            },
        ))
    }

    async fn mark_revoked(&self, token_hash: &str, revoked_at: DateTime<Utc>) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = COALESCE(revoked_at, $1),
                updated_at = CASE WHEN revoked_at IS NULL THEN $1 ELSE updated_at END
            WHERE token_hash = $2
            "#,
        )
        .bind(revoked_at)
        .bind(token_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ChirpStore for PgStore {
    async fn create_chirp(&self, body: &str, user_id: Uuid) -> Result<ChirpRecord, DatabaseError> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO chirps (id, created_at, updated_at, body, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            CHIRP_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(now)
        .bind(now)
        .bind(body)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(chirp_from_row(row)?)
    }

    async fn list_chirps(&self, author: Option<Uuid>) -> Result<Vec<ChirpRecord>, DatabaseError> {
        let rows = match author {
            Some(user_id) => {
                sqlx::query(&format!(
                    "SELECT {} FROM chirps WHERE user_id = $1 ORDER BY created_at ASC",
                    CHIRP_COLUMNS
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!("SELECT {} FROM chirps ORDER BY created_at ASC", CHIRP_COLUMNS))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows
            .into_iter()
            .map(chirp_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn get_chirp(&self, id: Uuid) -> Result<Option<ChirpRecord>, DatabaseError> {
        let row = sqlx::query(&format!("SELECT {} FROM chirps WHERE id = $1", CHIRP_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(chirp_from_row).transpose()?)
    }

    async fn delete_chirp(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
