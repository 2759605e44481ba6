//! End-to-end tests for the HTTP API, driven through the router without a socket.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use std::sync::Arc;
use task_forest::config::{AuthConfig, ListScope, ListShape, ReadScope, TasksConfig};
use task_forest::server::{AppState, build_router};
use task_forest::store::MemoryStore;
use tower::ServiceExt;

const SECRET: &str = "test-secret";

fn setup_with(policy: TasksConfig) -> Router {
    let auth = AuthConfig {
        password_iterations: 1_000,
        ..AuthConfig::default()
    };
    let state = AppState::new(Arc::new(MemoryStore::new()), &auth, SECRET, policy);
    build_router(state)
}

fn setup() -> Router {
    setup_with(TasksConfig::default())
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, _headers, body) = send_raw(app, method, uri, token, body).await;
    (status, body)
}

async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, axum::http::HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, value)
}

/// Register a user and log in; returns `(user_id, token)`.
async fn sign_up(app: &Router, username: &str) -> (String, String) {
    let (status, user) = send(
        app,
        Method::POST,
        "/api/users",
        None,
        Some(json!({ "username": username, "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, login) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": username, "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    (
        user["id"].as_str().unwrap().to_string(),
        login["token"].as_str().unwrap().to_string(),
    )
}

async fn create(app: &Router, token: &str, title: &str, parent: Option<&str>) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/tasks/create",
        Some(token),
        Some(json!({ "title": title, "parent_task_id": parent })),
    )
    .await
}

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn health_needs_no_token() {
        let app = setup();

        let (status, body) = send(&app, Method::GET, "/health", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn task_routes_require_a_token() {
        let app = setup();

        let (status, body) = send(&app, Method::GET, "/api/tasks", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");

        let (status, _) = send(&app, Method::GET, "/api/tasks", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, Method::DELETE, "/api/tasks/whatever", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_sets_cookie_that_authenticates() {
        let app = setup();
        send(
            &app,
            Method::POST,
            "/api/users",
            None,
            Some(json!({ "username": "alice", "password": "pw" })),
        )
        .await;

        let (status, headers, body) = send_raw(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "alice", "password": "pw" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["username"], "alice");
        assert!(body["expires_at"].as_i64().is_some());

        let cookie = headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("access_token="));
        assert!(cookie.contains("HttpOnly"));

        let pair = cookie.split(';').next().unwrap().to_string();
        let request = Request::builder()
            .uri("/api/tasks")
            .header(header::COOKIE, pair)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let app = setup();
        sign_up(&app, "alice").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "alice", "password": "nope" })),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let app = setup();
        sign_up(&app, "alice").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/users",
            None,
            Some(json!({ "username": "alice", "password": "again" })),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn logout_clears_cookie() {
        let app = setup();

        let (status, headers, _) =
            send_raw(&app, Method::POST, "/api/auth/logout", None, None).await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }
}

mod task_tests {
    use super::*;

    #[tokio::test]
    async fn create_and_list_as_tree() {
        let app = setup();
        let (alice_id, token) = sign_up(&app, "alice").await;

        let (status, root) = create(&app, &token, "A", None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(root["user_id"], alice_id.as_str());

        let root_id = root["id"].as_str().unwrap();
        let (status, _) = create(&app, &token, "B", Some(root_id)).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, Method::GET, "/api/tasks", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], "A");
        assert_eq!(items[0]["sub_tasks"][0]["title"], "B");
        assert_eq!(items[0]["sub_tasks"][0]["sub_tasks"], json!([]));
    }

    #[tokio::test]
    async fn listing_is_scoped_to_the_actor() {
        let app = setup();
        let (_, alice) = sign_up(&app, "alice").await;
        let (bob_id, bob) = sign_up(&app, "bob").await;

        create(&app, &alice, "Alice's", None).await;
        create(&app, &bob, "Bob's", None).await;

        let uri = format!("/api/tasks?userId={}", bob_id);
        let (_, body) = send(&app, Method::GET, &uri, Some(&alice), None).await;

        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], "Alice's");
    }

    #[tokio::test]
    async fn query_scope_and_flat_shape() {
        let app = setup_with(TasksConfig {
            list_scope: ListScope::Query,
            list_shape: ListShape::Flat,
            read_scope: ReadScope::Any,
        });
        let (_, alice) = sign_up(&app, "alice").await;
        let (bob_id, bob) = sign_up(&app, "bob").await;

        let (_, root) = create(&app, &alice, "A", None).await;
        create(&app, &alice, "B", root["id"].as_str()).await;
        create(&app, &bob, "C", None).await;

        let (_, body) = send(&app, Method::GET, "/api/tasks", Some(&alice), None).await;
        assert_eq!(body["items"].as_array().unwrap().len(), 3);
        assert!(body["items"][0].get("sub_tasks").is_none());

        let uri = format!("/api/tasks?userId={}", bob_id);
        let (_, body) = send(&app, Method::GET, &uri, Some(&alice), None).await;
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], "C");
    }

    #[tokio::test]
    async fn blank_title_is_a_bad_request() {
        let app = setup();
        let (_, token) = sign_up(&app, "alice").await;

        let (status, body) = create(&app, &token, "   ", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "title");
    }

    #[tokio::test]
    async fn foreign_parent_is_forbidden() {
        let app = setup();
        let (_, alice) = sign_up(&app, "alice").await;
        let (_, bob) = sign_up(&app, "bob").await;

        let (_, root) = create(&app, &alice, "A", None).await;
        let (status, _) = create(&app, &bob, "B", root["id"].as_str()).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn set_done_checks_ownership() {
        let app = setup();
        let (_, alice) = sign_up(&app, "alice").await;
        let (_, bob) = sign_up(&app, "bob").await;

        let (_, task) = create(&app, &alice, "A", None).await;
        let id = task["id"].as_str().unwrap();

        let (status, _) = send(
            &app,
            Method::PATCH,
            "/api/tasks/set-done",
            Some(&bob),
            Some(json!({ "id": id, "is_done": true })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            Method::PATCH,
            "/api/tasks/set-done",
            Some(&alice),
            Some(json!({ "id": id, "is_done": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_done"], true);
    }

    #[tokio::test]
    async fn delete_cascades_and_hides_tasks() {
        let app = setup();
        let (_, token) = sign_up(&app, "alice").await;

        let (_, root) = create(&app, &token, "A", None).await;
        let root_id = root["id"].as_str().unwrap().to_string();
        let (_, child) = create(&app, &token, "B", Some(&root_id)).await;
        let child_id = child["id"].as_str().unwrap().to_string();

        let uri = format!("/api/tasks/{}", root_id);
        let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, _) = send(&app, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let child_uri = format!("/api/tasks/{}", child_id);
        let (status, _) = send(&app, Method::GET, &child_uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            Method::PATCH,
            "/api/tasks/set-done",
            Some(&token),
            Some(json!({ "id": child_id, "is_done": true })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn read_by_id_is_open_by_default() {
        let app = setup();
        let (_, alice) = sign_up(&app, "alice").await;
        let (_, task) = create(&app, &alice, "A", None).await;

        let uri = format!("/api/tasks/{}", task["id"].as_str().unwrap());
        let (status, body) = send(&app, Method::GET, &uri, None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "A");
    }

    #[tokio::test]
    async fn owner_read_scope_hides_foreign_tasks() {
        let app = setup_with(TasksConfig {
            read_scope: ReadScope::Owner,
            ..TasksConfig::default()
        });
        let (_, alice) = sign_up(&app, "alice").await;
        let (_, bob) = sign_up(&app, "bob").await;
        let (_, task) = create(&app, &alice, "A", None).await;
        let uri = format!("/api/tasks/{}", task["id"].as_str().unwrap());

        let (status, _) = send(&app, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, Method::GET, &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::GET, &uri, Some(&alice), None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
