//! HTTP surface.
//!
//! This module provides the axum router that exposes the task and user
//! services as a JSON API, plus the listener bootstrap used by `serve`.

mod extract;
mod response;
mod tasks;
mod users;

pub use extract::Actor;

use crate::auth::TokenIssuer;
use crate::config::{AuthConfig, Config, TasksConfig};
use crate::service::{TaskService, UserService};
use crate::store::{TaskStore, UserDirectory};
use anyhow::Result;
use axum::{
    Json, Router,
    routing::{get, patch, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub tasks: TaskService,
    pub users: UserService,
    pub tokens: TokenIssuer,
    pub cookie_name: Arc<str>,
    pub policy: TasksConfig,
}

impl AppState {
    /// Wire services onto one store that serves both tasks and users.
    pub fn new<S>(store: Arc<S>, auth: &AuthConfig, secret: &str, policy: TasksConfig) -> Self
    where
        S: TaskStore + UserDirectory + 'static,
    {
        let task_store: Arc<dyn TaskStore> = store.clone();
        let user_dir: Arc<dyn UserDirectory> = store;
        Self {
            tasks: TaskService::new(task_store, user_dir.clone()),
            users: UserService::new(user_dir).with_hash_iterations(auth.password_iterations),
            tokens: TokenIssuer::new(secret, auth.token_ttl_secs),
            cookie_name: Arc::from(auth.cookie_name.as_str()),
            policy,
        }
    }
}

/// Health check response.
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/users", get(users::list_users).post(users::register_user))
        .route("/auth/login", post(users::login))
        .route("/auth/logout", post(users::logout))
        .route("/tasks", get(tasks::list_tasks))
        .route("/tasks/create", post(tasks::create_task))
        .route("/tasks/set-done", patch(tasks::set_task_done))
        .route(
            "/tasks/{id}",
            get(tasks::get_task).delete(tasks::delete_task),
        );

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind the listener and serve in the background.
///
/// Returns a shutdown trigger and the bound address.
pub async fn start_server(
    state: AppState,
    addr: SocketAddr,
) -> Result<(oneshot::Sender<()>, SocketAddr, tokio::task::JoinHandle<()>)> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("HTTP server listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("HTTP server shutting down");
            })
            .await
        {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    Ok((shutdown_tx, bound_addr, handle))
}

/// Build state from configuration for the given store.
pub fn state_from_config<S>(store: Arc<S>, config: &Config) -> Result<AppState>
where
    S: TaskStore + UserDirectory + 'static,
{
    config.validate_for_serving()?;
    let secret = config.auth.jwt_secret.as_deref().unwrap_or_default();
    Ok(AppState::new(store, &config.auth, secret, config.tasks))
}
