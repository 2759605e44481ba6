//! User and session endpoints.

use super::AppState;
use crate::error::{ServiceError, ServiceResult};
use crate::service::RegisterInput;
use crate::types::UserProfile;
use axum::Json;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{AppendHeaders, IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub data: Vec<UserProfile>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: i64,
    pub user: UserProfile,
}

/// `GET /api/users`
pub async fn list_users(State(state): State<AppState>) -> ServiceResult<Json<UsersResponse>> {
    let data = state.users.list().await?;
    Ok(Json(UsersResponse { data }))
}

/// `POST /api/users`
pub async fn register_user(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> ServiceResult<(StatusCode, Json<UserProfile>)> {
    let user = state.users.register(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ServiceResult<impl IntoResponse> {
    if req.username.trim().is_empty() {
        return Err(ServiceError::missing_field("username"));
    }
    if req.password.is_empty() {
        return Err(ServiceError::missing_field("password"));
    }

    let user = state.users.authenticate(req.username.trim(), &req.password).await?;
    let issued = state.tokens.issue(&user.id, &user.username)?;

    let max_age = (issued.expires_at - chrono::Utc::now().timestamp()).max(0);
    let cookie = session_cookie(&state.cookie_name, &issued.token, max_age)?;

    info!(user_id = %user.id, "User logged in");
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(LoginResponse {
            token: issued.token,
            expires_at: issued.expires_at,
            user,
        }),
    ))
}

/// `POST /api/auth/logout`
pub async fn logout(State(state): State<AppState>) -> ServiceResult<impl IntoResponse> {
    let cookie = session_cookie(&state.cookie_name, "", 0)?;
    Ok((StatusCode::NO_CONTENT, AppendHeaders([(SET_COOKIE, cookie)])))
}

fn session_cookie(name: &str, value: &str, max_age: i64) -> ServiceResult<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        name, value, max_age
    ))
    .map_err(ServiceError::internal)
}
