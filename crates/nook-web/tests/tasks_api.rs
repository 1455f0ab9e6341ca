use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use nook_store::TaskStore;
use nook_web::{TasksState, tasks_router};
use serde_json::{Value, json};
use tempfile::{TempDir, tempdir};
use tower::ServiceExt;

fn test_app() -> (TempDir, Router) {
    let tmp = tempdir().expect("tempdir");
    let db_path = tmp.path().join("tasks.db");
    TaskStore::initialize(&db_path).expect("init store");
    let app = tasks_router(TasksState {
        db_path,
        static_dir: tmp.path().join("static"),
    });
    (tmp, app)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        })
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn create_normalizes_priority_and_starts_pending() {
    let (_tmp, app) = test_app();
    let (status, task) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(json!({"description": "  Buy flowers ", "priority": "URGENT"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["description"], "Buy flowers");
    assert_eq!(task["completed"], false);
    assert_eq!(task["priority"], "medium");
    assert_eq!(task["due_date"], Value::Null);
}

#[tokio::test]
async fn empty_description_is_rejected() {
    let (_tmp, app) = test_app();
    let (status, body) = send(&app, "POST", "/api/tasks", Some(json!({"description": "   "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Description is required"}));

    let (_, tasks) = send(&app, "GET", "/api/tasks", None).await;
    assert_eq!(tasks, json!([]));
}

#[tokio::test]
async fn list_returns_tasks_by_id() {
    let (_tmp, app) = test_app();
    for (description, priority) in [("low one", "low"), ("high one", "HIGH")] {
        send(
            &app,
            "POST",
            "/api/tasks",
            Some(json!({"description": description, "priority": priority})),
        )
        .await;
    }
    let (status, tasks) = send(&app, "GET", "/api/tasks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tasks[0]["description"], "low one");
    assert_eq!(tasks[1]["priority"], "high");
}

#[tokio::test]
async fn toggle_twice_restores_original_state() {
    let (_tmp, app) = test_app();
    let (_, task) = send(&app, "POST", "/api/tasks", Some(json!({"description": "stretch"}))).await;
    let uri = format!("/api/tasks/{}/complete", task["id"]);

    let (status, once) = send(&app, "PUT", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(once["completed"], true);
    let (_, twice) = send(&app, "PUT", &uri, None).await;
    assert_eq!(twice["completed"], false);

    let (status, body) = send(&app, "PUT", "/api/tasks/4040/complete", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Task not found"}));
}

#[tokio::test]
async fn delete_twice_reports_not_found() {
    let (_tmp, app) = test_app();
    let (_, task) = send(&app, "POST", "/api/tasks", Some(json!({"description": "tmp"}))).await;
    let uri = format!("/api/tasks/{}", task["id"]);

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));
    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_replaces_record() {
    let (_tmp, app) = test_app();
    let (_, task) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(json!({"description": "plan trip", "priority": "low", "due_date": "2026-12-01"})),
    )
    .await;
    let uri = format!("/api/tasks/{}", task["id"]);

    let (status, updated) = send(
        &app,
        "PUT",
        &uri,
        Some(json!({"description": "plan big trip", "priority": "high"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["description"], "plan big trip");
    assert_eq!(updated["priority"], "high");
    assert_eq!(updated["due_date"], Value::Null);

    let (status, _) = send(&app, "PUT", &uri, Some(json!({"description": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, "PUT", "/api/tasks/999", Some(json!({"description": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn root_serves_html_shell() {
    let (_tmp, app) = test_app();
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let html = String::from_utf8(bytes.to_vec()).expect("utf8");
    assert!(html.contains("/api/tasks"));
}

#[tokio::test]
async fn due_date_markup_is_stored_but_rendered_as_text() {
    let (_tmp, app) = test_app();
    let markup = "<img src=x onerror=alert(1)>";
    let (status, task) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(json!({"description": "x", "due_date": markup})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["due_date"], markup);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let html = String::from_utf8(bytes.to_vec()).expect("utf8");
    assert!(html.contains(r#"<span class="due"></span>"#));
    assert!(html.contains("querySelector('.due').textContent"));
    assert!(!html.contains("${t.due_date"));
}
