//! Task endpoints.

use super::{Actor, AppState};
use crate::config::{ListScope, ListShape, ReadScope};
use crate::error::{ServiceError, ServiceResult};
use crate::types::{CreateTaskInput, Task, TaskNode};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Listing payload; the item shape depends on configuration.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TaskItems {
    Tree(Vec<TaskNode>),
    Flat(Vec<Task>),
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub items: TaskItems,
}

#[derive(Debug, Deserialize)]
pub struct SetDoneRequest {
    pub id: String,
    pub is_done: bool,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// `GET /api/tasks`
pub async fn list_tasks(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<ListQuery>,
) -> ServiceResult<Json<ListResponse>> {
    let owner = match state.policy.list_scope {
        ListScope::Actor => Some(actor.user_id),
        ListScope::Query => query.user_id.filter(|id| !id.is_empty()),
    };
    debug!(owner = ?owner, "Listing tasks");

    let items = match state.policy.list_shape {
        ListShape::Tree => TaskItems::Tree(state.tasks.list_task_tree(owner.as_deref()).await?),
        ListShape::Flat => TaskItems::Flat(state.tasks.list_tasks(owner.as_deref()).await?),
    };
    Ok(Json(ListResponse { items }))
}

/// `POST /api/tasks/create`
pub async fn create_task(
    State(state): State<AppState>,
    actor: Actor,
    Json(input): Json<CreateTaskInput>,
) -> ServiceResult<(StatusCode, Json<Task>)> {
    let task = state.tasks.create_task(input, &actor.user_id).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// `GET /api/tasks/{id}`
pub async fn get_task(
    State(state): State<AppState>,
    actor: Result<Actor, ServiceError>,
    Path(id): Path<String>,
) -> ServiceResult<Json<Task>> {
    let task = match state.policy.read_scope {
        ReadScope::Any => state.tasks.get_task(&id).await?,
        ReadScope::Owner => state.tasks.get_owned_task(&id, &actor?.user_id).await?,
    };
    Ok(Json(task))
}

/// `PATCH /api/tasks/set-done`
pub async fn set_task_done(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<SetDoneRequest>,
) -> ServiceResult<Json<Task>> {
    let task = state
        .tasks
        .set_task_done(&body.id, &actor.user_id, body.is_done)
        .await?;
    Ok(Json(task))
}

/// `DELETE /api/tasks/{id}`
pub async fn delete_task(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> ServiceResult<Json<DeleteResponse>> {
    state
        .tasks
        .soft_delete_task(&id, Some(&actor.user_id))
        .await?;
    Ok(Json(DeleteResponse { success: true }))
}
