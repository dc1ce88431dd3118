// Account Service - registration, login and bearer-token verification

use crate::application::constants::{PASSWORD_MIN_LEN, USERNAME_MAX_LEN, USERNAME_MIN_LEN};
use crate::domain::{Coordinate, Identity, NewUser, Role, User, UserId};
use crate::error::{AppError, Result};
use crate::port::{PasswordHasher, SessionStore, TimeProvider, UserRepository};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub role: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub long: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub identity: Identity,
    pub username: String,
}

/// Both coordinates or neither
fn optional_location(lat: Option<f64>, long: Option<f64>) -> Result<Option<Coordinate>> {
    match (lat, long) {
        (Some(lat), Some(long)) => Ok(Some(Coordinate::new(lat, long)?)),
        (None, None) => Ok(None),
        _ => Err(AppError::Validation(
            "lat and long must be given together".to_string(),
        )),
    }
}

fn validate_registration(req: &RegisterRequest) -> Result<(Role, Option<Coordinate>)> {
    let len = req.username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(AppError::Validation(format!(
            "username must be {}-{} characters",
            USERNAME_MIN_LEN, USERNAME_MAX_LEN
        )));
    }
    if req.username.trim() != req.username {
        return Err(AppError::Validation(
            "username must not start or end with whitespace".to_string(),
        ));
    }
    if req.password.chars().count() < PASSWORD_MIN_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {} characters",
            PASSWORD_MIN_LEN
        )));
    }
    let role = req.role.parse::<Role>()?;
    let location = optional_location(req.lat, req.long)?;
    Ok((role, location))
}

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    sessions: Arc<dyn SessionStore>,
    time_provider: Arc<dyn TimeProvider>,
    session_ttl: Duration,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        sessions: Arc<dyn SessionStore>,
        time_provider: Arc<dyn TimeProvider>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            users,
            hasher,
            sessions,
            time_provider,
            session_ttl,
        }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<UserId> {
        let (role, location) = validate_registration(&req)?;
        let password_hash = self.hasher.hash(&req.password)?;

        let user_id = self
            .users
            .insert(&NewUser {
                username: req.username.clone(),
                password_hash,
                role,
                location,
                address: req.address.filter(|a| !a.trim().is_empty()),
                created_at: self.time_provider.now_millis(),
            })
            .await?;

        info!(user_id, username = %req.username, %role, "User registered");
        Ok(user_id)
    }

    /// Check credentials. Unknown user and wrong password look the same to the caller.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let invalid = || AppError::Unauthorized("invalid credentials".to_string());

        let creds = self
            .users
            .find_credentials(username)
            .await?
            .ok_or_else(invalid)?;

        if !self.hasher.verify(password, &creds.password_hash)? {
            warn!(username, "Login rejected");
            return Err(invalid());
        }
        Ok(creds.user)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        let user = self.authenticate(username, password).await?;
        let identity = Identity::new(user.id, user.role);

        let ttl_ms = i64::try_from(self.session_ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at = self.time_provider.now_millis().saturating_add(ttl_ms);
        let token = self.sessions.issue(identity, expires_at).await?;

        info!(user_id = user.id, role = %user.role, "User logged in");
        Ok(LoginOutcome {
            token,
            identity,
            username: user.username,
        })
    }

    pub async fn verify_token(&self, token: &str) -> Result<Identity> {
        self.sessions
            .resolve(token, self.time_provider.now_millis())
            .await?
            .ok_or_else(|| AppError::Unauthorized("invalid or expired token".to_string()))
    }

    pub async fn update_location(
        &self,
        identity: &Identity,
        lat: f64,
        long: f64,
        address: Option<&str>,
    ) -> Result<Coordinate> {
        let location = Coordinate::new(lat, long)?;
        let address = address.map(str::trim).filter(|a| !a.is_empty());

        if !self
            .users
            .update_location(identity.user_id, location, address)
            .await?
        {
            return Err(AppError::NotFound(format!("user {}", identity.user_id)));
        }

        info!(user_id = identity.user_id, lat, long, "Location updated");
        Ok(location)
    }
}
