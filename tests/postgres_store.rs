//! Store tests against a live Postgres.
//!
//! Set `CHIRPY_TEST_DATABASE_URL` to run them; otherwise they return early.

use chirpy::store::{PgStore, RefreshTokenRecord, RefreshTokenRepository, UserStore};
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

async fn connect() -> Option<PgPool> {
    let url = std::env::var("CHIRPY_TEST_DATABASE_URL").ok()?;
    let pool = PgPool::connect(&url)
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate the database.");
    Some(pool)
}

async fn token_row(pool: &PgPool, token_hash: &str) -> (Option<DateTime<Utc>>, DateTime<Utc>) {
    sqlx::query_as("SELECT revoked_at, updated_at FROM refresh_tokens WHERE token_hash = $1")
        .bind(token_hash)
        .fetch_one(pool)
        .await
        .expect("Failed to fetch refresh token row")
}

#[tokio::test]
async fn second_revoke_leaves_token_row_unchanged() {
    let Some(pool) = connect().await else {
        eprintln!("CHIRPY_TEST_DATABASE_URL not set, skipping");
        return;
    };
    let store = PgStore::new(pool.clone());

    let user = store
        .create_user(&format!("{}@example.com", Uuid::new_v4()), "not-a-real-hash")
        .await
        .expect("Failed to create user");

    let now = Utc::now();
    let record = RefreshTokenRecord {
        token_hash: Uuid::new_v4().simple().to_string(),
        user_id: user.id,
        created_at: now,
        expires_at: now + Duration::days(60),
        revoked_at: None,
    };
    store
        .insert_refresh_token(&record)
        .await
        .expect("Failed to insert refresh token");

    assert!(store.mark_revoked(&record.token_hash, now).await.unwrap());
    let after_first = token_row(&pool, &record.token_hash).await;
    assert!(after_first.0.is_some());

    assert!(store
        .mark_revoked(&record.token_hash, now + Duration::seconds(5))
        .await
        .unwrap());
    let after_second = token_row(&pool, &record.token_hash).await;

    assert_eq!(after_first, after_second);
    assert!(!store.mark_revoked("no-such-token", now).await.unwrap());
}
