//! HTTP routes.
//!
//! - `GET /shapes`: all records in creation order
//! - `POST /shapes`: store a record, respond with it including its new `id`
//! - `DELETE /shapes/{id}`: 204, or 404 for an unknown id
//! - `GET /health`

use crate::store::ShapeDb;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use planner_core::persistence::ShapeRecord;
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Shared application state
#[derive(Default)]
pub struct AppState {
    pub shapes: ShapeDb,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Errors returned to clients as `{ "error": ... }`.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Unprocessable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(id) => (StatusCode::NOT_FOUND, format!("No shape with id {}", id)),
            ApiError::Unprocessable(reason) => (StatusCode::UNPROCESSABLE_ENTITY, reason),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/shapes", get(list_shapes).post(create_shape))
        .route("/shapes/{id}", delete(delete_shape))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn list_shapes(State(state): State<Arc<AppState>>) -> Json<Vec<ShapeRecord>> {
    Json(state.shapes.list())
}

async fn create_shape(
    State(state): State<Arc<AppState>>,
    Json(record): Json<ShapeRecord>,
) -> Result<Json<ShapeRecord>, ApiError> {
    match state.shapes.insert(record) {
        Ok(stored) => {
            info!("Created {} {:?}", stored.kind, stored.id);
            Ok(Json(stored))
        }
        Err(e) => {
            warn!("Rejected shape: {}", e);
            Err(ApiError::Unprocessable(e.to_string()))
        }
    }
}

async fn delete_shape(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    match state.shapes.remove(&id) {
        Some(_) => {
            info!("Deleted shape {}", id);
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(ApiError::NotFound(id)),
    }
}

/// Health check
async fn health() -> &'static str {
    "ok"
}
