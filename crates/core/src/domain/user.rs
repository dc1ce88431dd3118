// User Domain Model

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::error::{DomainError, Result};
use super::geo::Coordinate;

/// User ID (store-assigned)
pub type UserId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Shopkeeper,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Shopkeeper => "shopkeeper",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "customer" => Ok(Role::Customer),
            "shopkeeper" => Ok(Role::Shopkeeper),
            other => Err(DomainError::ValidationError(format!(
                "role must be 'customer' or 'shopkeeper', got '{}'",
                other
            ))),
        }
    }
}

/// Registered account. Shopkeepers double as shops.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    pub location: Option<Coordinate>,
    pub address: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub location: Option<Coordinate>,
    pub address: Option<String>,
    pub created_at: i64,
}

/// Authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}
