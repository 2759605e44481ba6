//! Task persistence on SQLite.

use super::Database;
use crate::store::{TaskStore, new_id};
use crate::types::{NewTask, Task, TaskFilter, TaskUpdate};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, Row, params};

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        is_done: row.get("is_done")?,
        deleted_at: row.get("deleted_at")?,
        user_id: row.get("user_id")?,
        parent_task_id: row.get("parent_task_id")?,
        created_at: row.get("created_at")?,
    })
}

/// Internal helper to get a task using an existing connection (avoids deadlock).
fn get_task_internal(conn: &Connection, task_id: &str) -> Result<Option<Task>> {
    let mut stmt = conn.prepare("SELECT * FROM tasks WHERE id = ?1")?;

    let result = stmt.query_row(params![task_id], parse_task_row);

    match result {
        Ok(task) => Ok(Some(task)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl Database {
    /// Insert a new task and return it as stored.
    pub fn insert_task(&self, task: NewTask) -> Result<Task> {
        let task_id = new_id();
        let now = Utc::now();

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (
                    id, title, description, is_done, user_id, parent_task_id, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    &task_id,
                    &task.title,
                    &task.description,
                    task.is_done,
                    &task.user_id,
                    &task.parent_task_id,
                    now,
                ],
            )?;

            get_task_internal(conn, &task_id)?
                .ok_or_else(|| anyhow!("Task {} vanished after insert", task_id))
        })
    }

    /// Get a task by id, including soft-deleted ones.
    pub fn get_task(&self, task_id: &str) -> Result<Option<Task>> {
        self.with_conn(|conn| get_task_internal(conn, task_id))
    }

    /// List tasks matching a filter, oldest first.
    pub fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let mut sql = String::from("SELECT t.* FROM tasks t WHERE 1 = 1");
            let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            if filter.live_only {
                sql.push_str(" AND t.deleted_at IS NULL");
            }

            if let Some(ref user_id) = filter.user_id {
                sql.push_str(" AND t.user_id = ?");
                params_vec.push(Box::new(user_id.clone()));
            }

            if let Some(ref parent_id) = filter.parent_task_id {
                sql.push_str(" AND t.parent_task_id = ?");
                params_vec.push(Box::new(parent_id.clone()));
            }

            sql.push_str(" ORDER BY t.created_at, t.id");

            let params_refs: Vec<&dyn rusqlite::ToSql> =
                params_vec.iter().map(|b| b.as_ref()).collect();

            let mut stmt = conn.prepare(&sql)?;
            let tasks = stmt
                .query_map(params_refs.as_slice(), parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(tasks)
        })
    }

    /// Apply a partial update to a task.
    pub fn apply_task_update(&self, task_id: &str, update: &TaskUpdate) -> Result<Task> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if let Some(is_done) = update.is_done {
                tx.execute(
                    "UPDATE tasks SET is_done = ?1 WHERE id = ?2",
                    params![is_done, task_id],
                )?;
            }

            if let Some(deleted_at) = update.deleted_at {
                tx.execute(
                    "UPDATE tasks SET deleted_at = ?1 WHERE id = ?2",
                    params![deleted_at, task_id],
                )?;
            }

            let task = get_task_internal(&tx, task_id)?
                .ok_or_else(|| anyhow!("Task not found: {}", task_id))?;

            tx.commit()?;
            Ok(task)
        })
    }
}

#[async_trait]
impl TaskStore for Database {
    async fn find_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        self.list_tasks(filter)
    }

    async fn find_task_by_id(&self, id: &str) -> Result<Option<Task>> {
        self.get_task(id)
    }

    async fn create_task(&self, task: NewTask) -> Result<Task> {
        self.insert_task(task)
    }

    async fn update_task(&self, id: &str, update: TaskUpdate) -> Result<Task> {
        self.apply_task_update(id, &update)
    }
}
