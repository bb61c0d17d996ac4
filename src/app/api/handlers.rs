//! HTTP handlers for `/api/tasks`.
//!
//! Handlers parse and validate their inputs first, then call the store.
//! `PUT` and `PATCH` check that the task exists before looking at the body,
//! so an unknown id is a 404 whatever the payload.

use axum::{
    body::Bytes,
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Redirect,
    Json,
};

use super::error::ApiErrorResponse;
use super::AppState;
use crate::app::models::{DeletedTask, Task};
use crate::app::validation::{
    parse_body, parse_list_query, parse_task_id, validate_status_body, validate_task_body,
    ListTasksParams, ValidationError,
};

type IdPath = Result<Path<String>, PathRejection>;

pub const TASK_DELETED: &str = "Task deleted successfully";

/// `GET /api/tasks?status=&sort=&direction=`
///
/// # Errors
///
/// 400 for an unknown `status` or `direction`, 500 if the store fails.
pub async fn list_tasks(
    State(state): State<AppState>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<Task>>, ApiErrorResponse> {
    let Query(pairs) = pairs.map_err(|rejection| {
        tracing::debug!(%rejection, "Rejected query string");
        ApiErrorResponse::bad_request(rejection.body_text())
    })?;
    let query = parse_list_query(&ListTasksParams::from_pairs(pairs))?;

    let tasks = state
        .store
        .list(&query)
        .map_err(|error| ApiErrorResponse::from_store(error, "Failed to fetch tasks"))?;

    tracing::debug!(count = tasks.len(), ?query, "Listed tasks");
    Ok(Json(tasks))
}

/// `GET /api/tasks/{id}`
pub async fn get_task(
    State(state): State<AppState>,
    path: IdPath,
) -> Result<Json<Task>, ApiErrorResponse> {
    let id = task_id(path)?;

    let task = state
        .store
        .get(id)
        .map_err(|error| ApiErrorResponse::from_store(error, "Failed to fetch task"))?;

    Ok(Json(task))
}

/// `POST /api/tasks`
///
/// # Errors
///
/// 400 when the body fails validation; nothing is stored in that case.
pub async fn create_task(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Task>), ApiErrorResponse> {
    let draft = validate_task_body(&parse_body(&body)?)?;

    let task = state
        .store
        .create(&draft)
        .map_err(|error| ApiErrorResponse::from_store(error, "Failed to create task"))?;

    tracing::info!(task_id = task.id, status = %task.status, "Created task");
    Ok((StatusCode::CREATED, Json(task)))
}

/// `PUT /api/tasks/{id}`, replacing every mutable field.
pub async fn update_task(
    State(state): State<AppState>,
    path: IdPath,
    body: Bytes,
) -> Result<Json<Task>, ApiErrorResponse> {
    const CONTEXT: &str = "Failed to update task";
    let id = task_id(path)?;

    ensure_exists(&state, id, CONTEXT)?;
    let draft = validate_task_body(&parse_body(&body)?)?;

    let task = state
        .store
        .update(id, &draft)
        .map_err(|error| ApiErrorResponse::from_store(error, CONTEXT))?;

    tracing::info!(task_id = task.id, "Updated task");
    Ok(Json(task))
}

/// `PATCH /api/tasks/{id}/status`
pub async fn update_task_status(
    State(state): State<AppState>,
    path: IdPath,
    body: Bytes,
) -> Result<Json<Task>, ApiErrorResponse> {
    const CONTEXT: &str = "Failed to update task status";
    let id = task_id(path)?;

    ensure_exists(&state, id, CONTEXT)?;
    let status = validate_status_body(&parse_body(&body)?)?;

    let task = state
        .store
        .update_status(id, status)
        .map_err(|error| ApiErrorResponse::from_store(error, CONTEXT))?;

    tracing::info!(task_id = task.id, %status, "Changed task status");
    Ok(Json(task))
}

/// `DELETE /api/tasks/{id}`
pub async fn delete_task(
    State(state): State<AppState>,
    path: IdPath,
) -> Result<Json<DeletedTask>, ApiErrorResponse> {
    let id = task_id(path)?;

    let id = state
        .store
        .delete(id)
        .map_err(|error| ApiErrorResponse::from_store(error, "Failed to delete task"))?;

    tracing::info!(task_id = id, "Deleted task");
    Ok(Json(DeletedTask {
        message: TASK_DELETED.to_string(),
        id,
    }))
}

/// `GET /api/items`, kept for clients that still use the old path.
pub async fn legacy_items() -> Redirect {
    Redirect::to("/api/tasks")
}

fn task_id(path: IdPath) -> Result<i64, ApiErrorResponse> {
    let Path(segment) = path.map_err(|_| ValidationError::InvalidTaskId)?;
    Ok(parse_task_id(&segment)?)
}

fn ensure_exists(state: &AppState, id: i64, context: &str) -> Result<(), ApiErrorResponse> {
    match state.store.exists(id) {
        Ok(true) => Ok(()),
        Ok(false) => Err(ApiErrorResponse::not_found()),
        Err(error) => Err(ApiErrorResponse::from_store(error, context)),
    }
}
