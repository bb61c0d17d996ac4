//! HTTP API: routes under `/api` mapped onto the task store.

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::app::storage::TaskStore;

pub use error::{ApiErrorResponse, ErrorBody};

/// Shared dependencies handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TaskStore>,
}

impl AppState {
    #[must_use]
    pub fn new(store: TaskStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// Builds the application router with tracing and permissive CORS.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route(
            "/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/tasks/{id}",
            get(handlers::get_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .route("/tasks/{id}/status", patch(handlers::update_task_status))
        .route("/items", get(handlers::legacy_items));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
