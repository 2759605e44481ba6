//! Layered configuration.
//!
//! Consolidates configuration from four tiers with field-by-field YAML merging:
//! 1. **Defaults** - built into [`Config::default`]
//! 2. **Project** - `$CWD/task-forest/config.yaml`
//! 3. **User** - `~/.task-forest/config.yaml`
//! 4. **Environment** - the variables below
//!
//! ## Environment Variables
//! - `TASK_FOREST_CONFIG_PATH` - Explicit config file (skips tiers 1-3 merging)
//! - `TASK_FOREST_DB_PATH` - Database path
//! - `TASK_FOREST_BIND` / `TASK_FOREST_PORT` - HTTP listener
//! - `TASK_FOREST_JWT_SECRET` - Token signing secret
//! - `TASK_FOREST_USER_DIR` - User config dir (default: `~/.task-forest`)
//! - `TASK_FOREST_PROJECT_DIR` - Project config dir (default: `./task-forest`)

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;
