//! In-process store used by tests and `:memory:` style deployments.

use super::{TaskStore, UserDirectory, new_id};
use crate::error::ServiceError;
use crate::types::{NewTask, NewUser, Task, TaskFilter, TaskUpdate, User};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Tables {
    // Insertion order doubles as creation order.
    tasks: Vec<Task>,
    users: Vec<User>,
}

/// Task store and user directory backed by vectors behind a mutex.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn find_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let tables = self.tables()?;
        Ok(tables
            .tasks
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }

    async fn find_task_by_id(&self, id: &str) -> Result<Option<Task>> {
        let tables = self.tables()?;
        Ok(tables.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn create_task(&self, task: NewTask) -> Result<Task> {
        let created = Task {
            id: new_id(),
            title: task.title,
            description: task.description,
            is_done: task.is_done,
            deleted_at: None,
            user_id: task.user_id,
            parent_task_id: task.parent_task_id,
            created_at: Utc::now(),
        };
        self.tables()?.tasks.push(created.clone());
        Ok(created)
    }

    async fn update_task(&self, id: &str, update: TaskUpdate) -> Result<Task> {
        let mut tables = self.tables()?;
        let task = tables
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| anyhow!("Task not found: {}", id))?;

        if let Some(is_done) = update.is_done {
            task.is_done = is_done;
        }
        if let Some(deleted_at) = update.deleted_at {
            task.deleted_at = Some(deleted_at);
        }
        Ok(task.clone())
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let tables = self.tables()?;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables()?;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables()?;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(ServiceError::already_exists("Username", &user.username).into());
        }
        let created = User {
            id: new_id(),
            username: user.username,
            name: user.name,
            hashed_password: user.hashed_password,
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.tables()?.users.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_task(user_id: &str, parent: Option<&str>) -> NewTask {
        NewTask {
            title: "t".to_string(),
            description: None,
            is_done: false,
            user_id: user_id.to_string(),
            parent_task_id: parent.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn update_applies_only_given_fields() {
        let store = MemoryStore::new();
        let task = store.create_task(new_task("u1", None)).await.unwrap();

        let done = store.update_task(&task.id, TaskUpdate::done(true)).await.unwrap();
        assert!(done.is_done);
        assert!(done.deleted_at.is_none());

        let deleted = store
            .update_task(&task.id, TaskUpdate::soft_delete(Utc::now()))
            .await
            .unwrap();
        assert!(deleted.is_done);
        assert!(deleted.deleted_at.is_some());
    }

    #[tokio::test]
    async fn update_of_unknown_task_fails() {
        let store = MemoryStore::new();
        assert!(store.update_task("nope", TaskUpdate::done(true)).await.is_err());
    }

    #[tokio::test]
    async fn find_tasks_keeps_creation_order() {
        let store = MemoryStore::new();
        let a = store.create_task(new_task("u1", None)).await.unwrap();
        let b = store.create_task(new_task("u1", Some(&a.id))).await.unwrap();
        let c = store.create_task(new_task("u2", None)).await.unwrap();

        let all = store.find_tasks(&TaskFilter::live()).await.unwrap();
        let ids: Vec<_> = all.iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, vec![a.id.clone(), b.id.clone(), c.id]);

        let children = store
            .find_tasks(&TaskFilter::live().children_of(&a.id))
            .await
            .unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, b.id);
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let store = MemoryStore::new();
        let user = NewUser {
            username: "alice".to_string(),
            name: None,
            hashed_password: "x".to_string(),
        };
        store.create_user(user.clone()).await.unwrap();

        let err = ServiceError::from(store.create_user(user).await.unwrap_err());
        assert_eq!(err.code, crate::error::ErrorCode::AlreadyExists);
    }
}
