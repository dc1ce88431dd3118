// Auth Ports - credential hashing and session tokens

use crate::domain::Identity;
use crate::error::Result;
use async_trait::async_trait;

/// One-way password hashing
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;

    /// `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable
    fn verify(&self, password: &str, password_hash: &str) -> Result<bool>;
}

/// Opaque bearer-token sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a session that expires at `expires_at` (epoch ms) and return its token
    async fn issue(&self, identity: Identity, expires_at: i64) -> Result<String>;

    /// Resolve a live token. Expired sessions resolve to `None` and are removed.
    async fn resolve(&self, token: &str, now_millis: i64) -> Result<Option<Identity>>;
}

/// Test doubles
pub mod mocks {
    use super::*;

    /// Reversible "hash" for fast tests
    pub struct PlainPasswordHasher;

    impl PasswordHasher for PlainPasswordHasher {
        fn hash(&self, password: &str) -> Result<String> {
            Ok(format!("plain${}", password))
        }

        fn verify(&self, password: &str, password_hash: &str) -> Result<bool> {
            Ok(password_hash.strip_prefix("plain$") == Some(password))
        }
    }
}
