// User Repository Port

use crate::domain::{Coordinate, NewUser, User, UserId};
use crate::error::Result;
use async_trait::async_trait;

/// Stored user plus password hash, only returned for login
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: User,
    pub password_hash: String,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. Duplicate usernames fail with `AppError::Conflict`.
    async fn insert(&self, user: &NewUser) -> Result<UserId>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>>;

    async fn find_credentials(&self, username: &str) -> Result<Option<Credentials>>;

    /// All shopkeepers, located or not
    async fn list_shops(&self) -> Result<Vec<User>>;

    /// Returns false if the user does not exist
    async fn update_location(
        &self,
        id: UserId,
        location: Coordinate,
        address: Option<&str>,
    ) -> Result<bool>;
}
