//! User registration and credential checks.

use crate::auth::password::{DEFAULT_ITERATIONS, hash_with_iterations, verify_password};
use crate::error::{ServiceError, ServiceResult};
use crate::store::UserDirectory;
use crate::types::{NewUser, UserProfile};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Registration payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserDirectory>,
    hash_iterations: u32,
}

impl UserService {
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        Self {
            users,
            hash_iterations: DEFAULT_ITERATIONS,
        }
    }

    /// PBKDF2 iteration count for newly registered passwords.
    pub fn with_hash_iterations(mut self, iterations: u32) -> Self {
        self.hash_iterations = iterations.max(1);
        self
    }

    /// Register a new user. Usernames are unique.
    pub async fn register(&self, input: RegisterInput) -> ServiceResult<UserProfile> {
        let username = input.username.trim();
        if username.is_empty() {
            return Err(ServiceError::missing_field("username"));
        }
        if input.password.is_empty() {
            return Err(ServiceError::missing_field("password"));
        }
        if self.users.find_user_by_username(username).await?.is_some() {
            return Err(ServiceError::already_exists("Username", username));
        }

        // PBKDF2 is CPU-bound; keep it off the async workers.
        let password = input.password;
        let iterations = self.hash_iterations;
        let hashed_password =
            tokio::task::spawn_blocking(move || hash_with_iterations(&password, iterations))
                .await
                .map_err(ServiceError::internal)?;

        let user = self
            .users
            .create_user(NewUser {
                username: username.to_string(),
                name: input.name.filter(|n| !n.trim().is_empty()),
                hashed_password,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user.profile())
    }

    /// All registered users.
    pub async fn list(&self) -> ServiceResult<Vec<UserProfile>> {
        let users = self.users.list_users().await?;
        Ok(users.iter().map(|u| u.profile()).collect())
    }

    pub async fn find(&self, id: &str) -> ServiceResult<UserProfile> {
        self.users
            .find_user_by_id(id)
            .await?
            .map(|u| u.profile())
            .ok_or_else(|| ServiceError::user_not_found(id))
    }

    /// Check a username/password pair.
    ///
    /// Unknown users and wrong passwords are indistinguishable to the caller.
    pub async fn authenticate(&self, username: &str, password: &str) -> ServiceResult<UserProfile> {
        let invalid = || ServiceError::unauthorized("Invalid credentials");

        let Some(user) = self.users.find_user_by_username(username).await? else {
            warn!(username = %username, "Login for unknown user");
            return Err(invalid());
        };

        let password = password.to_string();
        let stored = user.hashed_password.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
            .await
            .map_err(ServiceError::internal)??;

        if !matches {
            warn!(username = %username, "Login with wrong password");
            return Err(invalid());
        }
        Ok(user.profile())
    }
}
