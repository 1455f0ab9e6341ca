use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Path};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, put};
use axum::{Json, Router};
use nook_core::{Task, TaskInput};
use nook_store::TaskStore;
use serde_json::{Value, json};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::ApiError;
use crate::pages;

#[derive(Debug, Clone)]
pub struct TasksState {
    pub db_path: PathBuf,
    pub static_dir: PathBuf,
}

/// One task-store connection per request, closed when the handler returns.
pub struct TaskDb(pub TaskStore);

impl FromRequestParts<Arc<TasksState>> for TaskDb {
    type Rejection = ApiError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &Arc<TasksState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(TaskStore::open(&state.db_path)?))
    }
}

/// The database at `state.db_path` must already be initialized.
pub fn tasks_router(state: TasksState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);
    Router::new()
        .route("/", get(index))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/{id}", put(update_task).delete(delete_task))
        .route("/api/tasks/{id}/complete", put(toggle_complete))
        .nest_service("/static", static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

async fn index() -> impl IntoResponse {
    Html(pages::TASKS_INDEX)
}

async fn list_tasks(TaskDb(store): TaskDb) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(store.list()?))
}

async fn create_task(
    TaskDb(store): TaskDb,
    Json(input): Json<TaskInput>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = store.create(&input.normalize()?)?;
    info!(id = task.id, priority = task.priority.as_str(), "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    TaskDb(store): TaskDb,
    Path(id): Path<i64>,
    Json(input): Json<TaskInput>,
) -> Result<Json<Task>, ApiError> {
    Ok(Json(store.update(id, input)?))
}

async fn toggle_complete(
    TaskDb(store): TaskDb,
    Path(id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    Ok(Json(store.toggle_complete(id)?))
}

async fn delete_task(TaskDb(store): TaskDb, Path(id): Path<i64>) -> Result<Json<Value>, ApiError> {
    store.delete(id)?;
    info!(id, "task deleted");
    Ok(Json(json!({ "ok": true })))
}
