//! Task authorization and mutation engine.

use crate::error::{ServiceError, ServiceResult};
use crate::store::{TaskStore, UserDirectory};
use crate::tree::build_forest;
use crate::types::{CreateTaskInput, NewTask, Task, TaskFilter, TaskNode, TaskUpdate};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

/// Enforces ownership and lifecycle rules on top of a [`TaskStore`].
///
/// Every check happens before the first write of an operation, except for the
/// soft-delete cascade, which writes one task at a time and stops at the first
/// store failure without undoing earlier writes.
#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
    users: Arc<dyn UserDirectory>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskStore>, users: Arc<dyn UserDirectory>) -> Self {
        Self { tasks, users }
    }

    /// Create a task owned by `actor`.
    pub async fn create_task(&self, input: CreateTaskInput, actor: &str) -> ServiceResult<Task> {
        if self.users.find_user_by_id(actor).await?.is_none() {
            return Err(ServiceError::user_not_found(actor));
        }

        let title = input.title.trim();
        if title.is_empty() {
            return Err(ServiceError::missing_field("title"));
        }

        if let Some(ref parent_id) = input.parent_task_id {
            let parent = self
                .tasks
                .find_task_by_id(parent_id)
                .await?
                .filter(Task::is_live)
                .ok_or_else(|| ServiceError::parent_not_found(parent_id))?;
            if !parent.is_owned_by(actor) {
                return Err(ServiceError::foreign_parent(parent_id));
            }
        }

        let created = self
            .tasks
            .create_task(NewTask {
                title: title.to_string(),
                description: input.description,
                is_done: input.is_done.unwrap_or(false),
                user_id: actor.to_string(),
                parent_task_id: input.parent_task_id,
            })
            .await?;

        debug!(task_id = %created.id, user_id = %actor, "Task created");
        Ok(created)
    }

    /// Live tasks, optionally restricted to one owner, as a flat list.
    pub async fn list_tasks(&self, owner: Option<&str>) -> ServiceResult<Vec<Task>> {
        let mut filter = TaskFilter::live();
        if let Some(owner) = owner {
            filter = filter.owned_by(owner);
        }
        Ok(self.tasks.find_tasks(&filter).await?)
    }

    /// Live tasks, optionally restricted to one owner, grouped into a forest.
    pub async fn list_task_tree(&self, owner: Option<&str>) -> ServiceResult<Vec<TaskNode>> {
        let tasks = self.list_tasks(owner).await?;
        Ok(build_forest(tasks))
    }

    /// A live task by id. Not owner-scoped.
    pub async fn get_task(&self, id: &str) -> ServiceResult<Task> {
        self.tasks
            .find_task_by_id(id)
            .await?
            .filter(Task::is_live)
            .ok_or_else(|| ServiceError::task_not_found(id))
    }

    /// A live task by id, visible only to its owner. Other owners see `TaskNotFound`.
    pub async fn get_owned_task(&self, id: &str, actor: &str) -> ServiceResult<Task> {
        let task = self.get_task(id).await?;
        if !task.is_owned_by(actor) {
            return Err(ServiceError::task_not_found(id));
        }
        Ok(task)
    }

    /// Set `is_done` on a live task owned by `actor`.
    pub async fn set_task_done(&self, id: &str, actor: &str, is_done: bool) -> ServiceResult<Task> {
        let task = self
            .tasks
            .find_task_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::task_not_found(id))?;

        if !task.is_owned_by(actor) {
            return Err(ServiceError::not_owner(id, actor));
        }
        if !task.is_live() {
            return Err(ServiceError::deleted_task(id));
        }

        Ok(self.tasks.update_task(id, TaskUpdate::done(is_done)).await?)
    }

    /// Soft-delete a task owned by `actor` together with all of its live descendants.
    ///
    /// Descendants are not re-checked for ownership. Returns the top-level task
    /// as stored after deletion.
    pub async fn soft_delete_task(&self, id: &str, actor: Option<&str>) -> ServiceResult<Task> {
        let actor = actor.ok_or_else(|| ServiceError::unauthorized("Unauthorized"))?;

        let task = self
            .tasks
            .find_task_by_id(id)
            .await?
            .filter(Task::is_live)
            .ok_or_else(|| ServiceError::task_not_found(id))?;

        if !task.is_owned_by(actor) {
            return Err(ServiceError::not_owner(id, actor));
        }

        let deleted_at = Utc::now();
        let deleted = self
            .tasks
            .update_task(id, TaskUpdate::soft_delete(deleted_at))
            .await?;

        // Pre-order walk, same visiting order as recursing child by child.
        let mut cascaded = 0usize;
        let mut stack = self.live_children(id).await?;
        while let Some(child) = stack.pop() {
            self.tasks
                .update_task(&child.id, TaskUpdate::soft_delete(deleted_at))
                .await?;
            cascaded += 1;
            stack.extend(self.live_children(&child.id).await?);
        }

        info!(task_id = %id, user_id = %actor, cascaded, "Task soft-deleted");
        Ok(deleted)
    }

    /// Live children of `parent_id`, reversed so that popping yields them oldest first.
    async fn live_children(&self, parent_id: &str) -> ServiceResult<Vec<Task>> {
        let mut children = self
            .tasks
            .find_tasks(&TaskFilter::live().children_of(parent_id))
            .await?;
        children.reverse();
        Ok(children)
    }
}
