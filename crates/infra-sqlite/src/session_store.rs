// SQLite SessionStore - opaque bearer tokens

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use qprint_core::domain::{Identity, Role};
use qprint_core::error::{AppError, Result};
use qprint_core::port::SessionStore;
use rand::RngCore;
use sqlx::SqlitePool;
use tracing::debug;

/// Random bytes per token
const TOKEN_BYTES: usize = 32;

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Remove every session that expired before `now_millis`
    pub async fn purge_expired(&self, now_millis: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now_millis)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn issue(&self, identity: Identity, expires_at: i64) -> Result<String> {
        let token = generate_token();

        sqlx::query("INSERT INTO sessions (token, user_id, role, expires_at) VALUES (?, ?, ?, ?)")
            .bind(&token)
            .bind(identity.user_id)
            .bind(identity.role.as_str())
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(token)
    }

    async fn resolve(&self, token: &str, now_millis: i64) -> Result<Option<Identity>> {
        let row: Option<(i64, String, i64)> =
            sqlx::query_as("SELECT user_id, role, expires_at FROM sessions WHERE token = ?")
                .bind(token)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        let Some((user_id, role, expires_at)) = row else {
            return Ok(None);
        };

        if expires_at <= now_millis {
            debug!(user_id, "Session expired");
            sqlx::query("DELETE FROM sessions WHERE token = ?")
                .bind(token)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
            return Ok(None);
        }

        let role = role
            .parse::<Role>()
            .map_err(|_| AppError::Database(format!("corrupt session role: {}", role)))?;
        Ok(Some(Identity::new(user_id, role)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{insert_user, setup_test_db};

    #[test]
    fn test_token_shape() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        // 32 bytes -> 43 base64 chars without padding
        assert_eq!(a.len(), 43);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[tokio::test]
    async fn test_issue_and_resolve() {
        let (_dir, pool) = setup_test_db().await;
        let user_id = insert_user(&pool, "shop", "shopkeeper").await;
        let store = SqliteSessionStore::new(pool);

        let identity = Identity::new(user_id, Role::Shopkeeper);
        let token = store.issue(identity, 10_000).await.unwrap();

        assert_eq!(store.resolve(&token, 5_000).await.unwrap(), Some(identity));
        assert_eq!(store.resolve("bogus", 5_000).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_session_is_removed() {
        let (_dir, pool) = setup_test_db().await;
        let user_id = insert_user(&pool, "cust", "customer").await;
        let store = SqliteSessionStore::new(pool.clone());

        let token = store
            .issue(Identity::new(user_id, Role::Customer), 10_000)
            .await
            .unwrap();

        assert_eq!(store.resolve(&token, 10_000).await.unwrap(), None);
        let left: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(left, 0);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let (_dir, pool) = setup_test_db().await;
        let user_id = insert_user(&pool, "cust", "customer").await;
        let store = SqliteSessionStore::new(pool);
        let identity = Identity::new(user_id, Role::Customer);

        store.issue(identity, 1_000).await.unwrap();
        let live = store.issue(identity, 50_000).await.unwrap();

        assert_eq!(store.purge_expired(2_000).await.unwrap(), 1);
        assert!(store.resolve(&live, 2_000).await.unwrap().is_some());
    }
}
