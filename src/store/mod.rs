//! Persistence interfaces consumed by the services.
//!
//! The services only ever talk to a [`TaskStore`] and a [`UserDirectory`].
//! [`crate::db::Database`] implements both on SQLite; [`MemoryStore`]
//! implements both in process memory.

mod memory;

pub use memory::MemoryStore;

use crate::types::{NewTask, NewUser, Task, TaskFilter, TaskUpdate, User};
use anyhow::Result;
use async_trait::async_trait;

/// Task persistence primitives.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Tasks matching `filter`, oldest first.
    async fn find_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    /// A task by id, whether live or soft-deleted.
    async fn find_task_by_id(&self, id: &str) -> Result<Option<Task>>;

    /// Insert a task, assigning its id and creation time.
    async fn create_task(&self, task: NewTask) -> Result<Task>;

    /// Apply `update` to an existing task and return the stored result.
    /// Fails if the task does not exist.
    async fn update_task(&self, id: &str, update: TaskUpdate) -> Result<Task>;
}

/// User identity lookups and registration.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Insert a user. A taken username fails with an `AlreadyExists` service error.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    async fn list_users(&self) -> Result<Vec<User>>;
}

/// Generate a new record identifier.
pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}
