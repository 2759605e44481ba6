//! Configuration loader with tier-based merging.
//!
//! Loads configuration from multiple tiers and merges them field-by-field.

use super::merge::deep_merge_all;
use super::types::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Built-in defaults (lowest priority)
    Defaults = 0,
    /// Project-level config ($CWD/task-forest/)
    Project = 1,
    /// User-level config (~/.task-forest/)
    User = 2,
    /// Environment variables (highest priority)
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Directories searched for `config.yaml`.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub project_dir: Option<PathBuf>,
    pub user_dir: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        // User dir: TASK_FOREST_USER_DIR or ~/.task-forest
        let user_dir = std::env::var("TASK_FOREST_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".task-forest")));

        // Project dir: TASK_FOREST_PROJECT_DIR or $CWD/task-forest
        let project_dir = std::env::var("TASK_FOREST_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("task-forest")));

        Self {
            project_dir,
            user_dir,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
    config: Config,
    /// Highest-priority config file that contributed, if any
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration from all tiers using the process environment.
    pub fn load() -> Result<Self> {
        Self::load_with(ConfigPaths::discover(), |key| std::env::var(key).ok())
    }

    /// Load configuration with explicit paths and an environment lookup.
    pub fn load_with<F>(paths: ConfigPaths, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // An explicit file replaces tier merging entirely.
        if let Some(explicit_path) = env("TASK_FOREST_CONFIG_PATH") {
            let path = PathBuf::from(&explicit_path);
            let mut config = Config::load(&path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            Self::apply_env_overrides(&mut config, &env)?;
            return Ok(Self {
                paths,
                config,
                config_path: Some(path),
            });
        }

        let mut configs: Vec<Value> = Vec::new();
        let mut config_path = None;

        // Tier 1: Defaults
        configs.push(serde_json::to_value(Config::default())?);

        // Tier 2: Project config, Tier 3: User config
        for (tier, dir) in [
            (ConfigTier::Project, paths.project_dir.as_deref()),
            (ConfigTier::User, paths.user_dir.as_deref()),
        ] {
            if let Some(value) = dir.and_then(|d| read_tier(tier, &d.join("config.yaml"))) {
                configs.push(value);
                config_path = dir.map(|d| d.join("config.yaml"));
            }
        }

        let merged = deep_merge_all(configs);
        let mut config: Config = serde_json::from_value(merged)?;

        // Tier 4: Environment variable overrides
        Self::apply_env_overrides(&mut config, &env)?;

        Ok(Self {
            paths,
            config,
            config_path,
        })
    }

    /// Apply environment variable overrides to config.
    fn apply_env_overrides<F>(config: &mut Config, env: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db_path) = env("TASK_FOREST_DB_PATH") {
            config.server.db_path = PathBuf::from(db_path);
        }

        if let Some(bind) = env("TASK_FOREST_BIND") {
            config.server.bind = bind;
        }

        if let Some(port) = env("TASK_FOREST_PORT") {
            config.server.port = port
                .parse()
                .with_context(|| format!("TASK_FOREST_PORT is not a port number: {}", port))?;
        }

        if let Some(secret) = env("TASK_FOREST_JWT_SECRET") {
            config.auth.jwt_secret = Some(secret);
        }

        Ok(())
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Path of the highest-priority config file that was read.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

/// Read one tier's YAML file. Unreadable or invalid files are skipped with a warning.
fn read_tier(tier: ConfigTier, path: &Path) -> Option<Value> {
    if !path.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(%tier, path = %path.display(), "Cannot read config file: {}", e);
            return None;
        }
    };
    match serde_yaml::from_str::<Value>(&content) {
        Ok(value) => {
            debug!(%tier, path = %path.display(), "Loaded config tier");
            Some(value)
        }
        Err(e) => {
            warn!(%tier, path = %path.display(), "Ignoring invalid config file: {}", e);
            None
        }
    }
}
