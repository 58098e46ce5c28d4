use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::dto::{CreateTaskRequest, TaskListQuery, UpdateTaskRequest};
use super::filters::normalize;
use crate::routes::response::{ApiError, Envelope};
use crate::state::AppState;

fn task_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|e| ApiError::bad_request("Invalid task ID", e.body_text()))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|e| ApiError::bad_request("Validation failed", e.body_text()))
}

/// List tasks, filtered and paginated
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<TaskListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) =
        query.map_err(|e| ApiError::bad_request("Invalid query parameters", e.body_text()))?;
    let filters = normalize(query);

    let (tasks, pagination) = state
        .store
        .query(&filters)
        .await
        .map_err(|e| ApiError::store("Failed to retrieve tasks", e, state.expose_error_detail))?;

    Ok(Json(
        Envelope::success("Retrieved all tasks", tasks).with_pagination(pagination),
    ))
}

/// Get a single task by ID
pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = task_id(path)?;

    let task = state
        .store
        .get_by_id(id)
        .await
        .map_err(|e| ApiError::store("Failed to retrieve task", e, state.expose_error_detail))?
        .ok_or_else(ApiError::task_not_found)?;

    Ok(Json(Envelope::success("Task retrieved successfully", task)))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(body)?;
    request.validate().map_err(ApiError::validation)?;

    let task = state
        .store
        .create(&request)
        .await
        .map_err(|e| ApiError::store("Failed to create task", e, state.expose_error_detail))?;

    tracing::info!(id = task.id, "task created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::success("Task created successfully", task)),
    ))
}

/// Apply a partial update; omitted fields stay as they are
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = task_id(path)?;
    let request = json_body(body)?;
    request.validate().map_err(ApiError::validation)?;

    let task = state
        .store
        .update(id, &request)
        .await
        .map_err(|e| ApiError::store("Failed to update task", e, state.expose_error_detail))?
        .ok_or_else(ApiError::task_not_found)?;

    Ok(Json(Envelope::success("Task updated successfully", task)))
}

pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = task_id(path)?;

    let deleted = state
        .store
        .delete(id)
        .await
        .map_err(|e| ApiError::store("Failed to delete task", e, state.expose_error_detail))?;

    if !deleted {
        return Err(ApiError::task_not_found());
    }

    tracing::info!(id, "task deleted");
    Ok(Json(Envelope::message("Task deleted successfully")))
}
