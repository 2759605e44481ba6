//! Configuration types and structures.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub tasks: TasksConfig,
}

impl Config {
    /// Load configuration from a single file, without tier merging.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Fail early on settings the server cannot start without.
    pub fn validate_for_serving(&self) -> Result<()> {
        match self.auth.jwt_secret.as_deref() {
            Some(secret) if !secret.trim().is_empty() => Ok(()),
            _ => Err(anyhow!(
                "auth.jwt_secret is not set (config file or TASK_FOREST_JWT_SECRET)"
            )),
        }
    }
}

/// Server-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Path to the SQLite database file, or `:memory:`.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Address to bind the HTTP listener to.
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            bind: default_bind(),
            port: default_port(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("task-forest.db")
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Token and credential settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret. Required to serve.
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// Access token lifetime in seconds (default: 3600).
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,

    /// Cookie carrying the access token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// PBKDF2 iterations for new password hashes.
    #[serde(default = "default_password_iterations")]
    pub password_iterations: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_secs: default_token_ttl_secs(),
            cookie_name: default_cookie_name(),
            password_iterations: default_password_iterations(),
        }
    }
}

fn default_token_ttl_secs() -> i64 {
    3_600 // 1 hour
}

fn default_cookie_name() -> String {
    "access_token".to_string()
}

fn default_password_iterations() -> u32 {
    crate::auth::password::DEFAULT_ITERATIONS
}

/// Whose tasks `GET /api/tasks` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListScope {
    /// Only the authenticated actor's tasks (default)
    #[default]
    Actor,
    /// The `userId` query parameter's tasks, or every live task when absent
    Query,
}

/// Shape of listing responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListShape {
    /// Roots with nested `sub_tasks` (default)
    #[default]
    Tree,
    /// Plain list of tasks
    Flat,
}

/// Who may read a task by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadScope {
    /// Anyone, authenticated or not (default)
    #[default]
    Any,
    /// Only the owner; others get not-found
    Owner,
}

/// Task read-path policy.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TasksConfig {
    #[serde(default)]
    pub list_scope: ListScope,

    #[serde(default)]
    pub list_shape: ListShape,

    #[serde(default)]
    pub read_scope: ReadScope,
}
