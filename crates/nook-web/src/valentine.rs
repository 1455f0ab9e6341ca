use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Path};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, put};
use axum::{Json, Router};
use nook_core::Collection;
use nook_store::{CollectionBackend, CollectionStore};
use serde_json::{Value, json};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::pages;

#[derive(Debug, Clone)]
pub struct ValentineState {
    pub backend: CollectionBackend,
    /// Holds the `photos/` and `music/` subdirectories.
    pub static_dir: PathBuf,
}

/// A collection store opened for the current request only.
pub struct CollectionDb(pub Box<dyn CollectionStore + Send>);

impl FromRequestParts<Arc<ValentineState>> for CollectionDb {
    type Rejection = ApiError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &Arc<ValentineState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(state.backend.open()?))
    }
}

/// The backend must already be initialized.
pub fn valentine_router(state: ValentineState) -> Router {
    let photos = ServeDir::new(state.static_dir.join("photos"));
    let music = ServeDir::new(state.static_dir.join("music"));
    Router::new()
        .route("/", get(index))
        .route("/api/{collection}", get(list_items).post(add_item))
        .route("/api/{collection}/{id}", put(update_item).delete(delete_item))
        .nest_service("/static/photos", photos)
        .nest_service("/static/music", music)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

fn collection_from_path(name: &str) -> Result<Collection, ApiError> {
    Collection::parse(name).ok_or_else(|| ApiError::NotFound(format!("unknown collection: {name}")))
}

async fn index() -> impl IntoResponse {
    Html(pages::VALENTINE_INDEX)
}

async fn list_items(
    CollectionDb(store): CollectionDb,
    Path(name): Path<String>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let collection = collection_from_path(&name)?;
    Ok(Json(store.get_all(collection)?))
}

async fn add_item(
    CollectionDb(store): CollectionDb,
    Path(name): Path<String>,
    Json(item): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let collection = collection_from_path(&name)?;
    let item = store.add_item(collection, item)?;
    info!(%collection, id = ?item.get("id"), "item added");
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_item(
    CollectionDb(store): CollectionDb,
    Path((name, id)): Path<(String, i64)>,
    Json(patch): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let collection = collection_from_path(&name)?;
    if store.update_item(collection, id, patch)?.is_none() {
        debug!(%collection, id, "update target missing, nothing written");
    }
    Ok(Json(json!({ "ok": true })))
}

async fn delete_item(
    CollectionDb(store): CollectionDb,
    Path((name, id)): Path<(String, i64)>,
) -> Result<Json<Value>, ApiError> {
    let collection = collection_from_path(&name)?;
    let removed = store.delete_item(collection, id)?;
    info!(%collection, id, removed, "item delete requested");
    Ok(Json(json!({ "ok": true })))
}
