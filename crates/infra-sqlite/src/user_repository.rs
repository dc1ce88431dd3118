// SQLite UserRepository Implementation

use crate::error::map_sqlx_error;
use crate::rows::UserRow;
use async_trait::async_trait;
use qprint_core::domain::{Coordinate, NewUser, User, UserId};
use qprint_core::error::{AppError, Result};
use qprint_core::port::{Credentials, UserRepository};
use sqlx::SqlitePool;

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<UserId> {
        sqlx::query_scalar(
            r#"
            INSERT INTO users (username, password_hash, role, lat, long, address, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.location.map(|c| c.lat))
        .bind(user.location.map(|c| c.long))
        .bind(&user.address)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match map_sqlx_error(e) {
            AppError::Conflict(_) => {
                AppError::Conflict(format!("username '{}' is already taken", user.username))
            }
            other => other,
        })
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.as_ref().map(UserRow::to_user).transpose()
    }

    async fn find_credentials(&self, username: &str) -> Result<Option<Credentials>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        match row {
            Some(row) => Ok(Some(Credentials {
                user: row.to_user()?,
                password_hash: row.password_hash,
            })),
            None => Ok(None),
        }
    }

    async fn list_shops(&self) -> Result<Vec<User>> {
        let rows: Vec<UserRow> =
            sqlx::query_as("SELECT * FROM users WHERE role = 'shopkeeper' ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        rows.iter().map(UserRow::to_user).collect()
    }

    async fn update_location(
        &self,
        id: UserId,
        location: Coordinate,
        address: Option<&str>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET lat = ?, long = ?, address = COALESCE(?, address) WHERE id = ?",
        )
        .bind(location.lat)
        .bind(location.long)
        .bind(address)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }
}
