//! Core types for the task forest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A task owned by a single user, optionally nested under a parent task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub is_done: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub user_id: String,
    pub parent_task_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// A task is live until it has been soft-deleted.
    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// A task with its direct children, recursively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskNode {
    #[serde(flatten)]
    pub task: Task,
    pub sub_tasks: Vec<TaskNode>,
}

impl TaskNode {
    pub fn leaf(task: Task) -> Self {
        Self {
            task,
            sub_tasks: Vec::new(),
        }
    }

    /// Number of tasks in this subtree, including this one.
    pub fn subtree_size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.sub_tasks.iter());
        }
        count
    }
}

/// Payload for creating a task. The owner always comes from the actor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTaskInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_done: Option<bool>,
    #[serde(default)]
    pub parent_task_id: Option<String>,
}

impl CreateTaskInput {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn under(mut self, parent_task_id: impl Into<String>) -> Self {
        self.parent_task_id = Some(parent_task_id.into());
        self
    }
}

/// Fully resolved fields handed to a store for insertion.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub is_done: bool,
    pub user_id: String,
    pub parent_task_id: Option<String>,
}

/// Partial update applied by a store. `None` leaves a column untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub is_done: Option<bool>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TaskUpdate {
    pub fn done(is_done: bool) -> Self {
        Self {
            is_done: Some(is_done),
            ..Default::default()
        }
    }

    pub fn soft_delete(at: DateTime<Utc>) -> Self {
        Self {
            deleted_at: Some(at),
            ..Default::default()
        }
    }
}

/// Filter for `find_tasks`. Every field narrows the result set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub user_id: Option<String>,
    pub parent_task_id: Option<String>,
    pub live_only: bool,
}

impl TaskFilter {
    /// All live tasks.
    pub fn live() -> Self {
        Self {
            live_only: true,
            ..Default::default()
        }
    }

    pub fn owned_by(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn children_of(mut self, parent_task_id: impl Into<String>) -> Self {
        self.parent_task_id = Some(parent_task_id.into());
        self
    }

    /// True if the task passes every criterion of this filter.
    pub fn matches(&self, task: &Task) -> bool {
        if self.live_only && !task.is_live() {
            return false;
        }
        if let Some(ref user_id) = self.user_id {
            if &task.user_id != user_id {
                return false;
            }
        }
        if let Some(ref parent) = self.parent_task_id {
            if task.parent_task_id.as_ref() != Some(parent) {
                return false;
            }
        }
        true
    }
}

/// A registered user, including the credential hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub hashed_password: String,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            username: self.username.clone(),
            name: self.name.clone(),
        }
    }
}

/// The public projection of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
}

/// Fields handed to a user directory for insertion.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub name: Option<String>,
    pub hashed_password: String,
}
