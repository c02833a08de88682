//! Task CRUD endpoints.
//!
//! Every handler follows the same sequence: parse the id (if any), decode and
//! validate the body (if any), check existence, call the gateway, respond with
//! an envelope. Nothing reaches storage before the id and payload are valid.

use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path, RawQuery, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use super::body::{BodyRejection, RequestBody};
use super::error::{ApiError, Operation, TASK_DELETED};
use super::routes::AppState;
use super::types::{ListTasksQuery, MessageEnvelope, TaskEnvelope, TaskListEnvelope};
use crate::task::{validate_create, validate_update, TaskId};

/// Create task routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_tasks))
        .route("/create", post(create_task))
        .route(
            "/:id",
            get(get_task)
                .put(update_task)
                .patch(update_task)
                .delete(delete_task),
        )
}

/// Ids are positive integers; anything else is rejected before storage is touched.
fn parse_id(raw: &str) -> Result<TaskId, ApiError> {
    raw.parse::<TaskId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(ApiError::InvalidId)
}

/// A path segment axum cannot decode (e.g. invalid UTF-8) is an invalid id too.
fn task_id(path: Result<Path<String>, PathRejection>) -> Result<TaskId, ApiError> {
    match path {
        Ok(Path(raw)) => parse_id(&raw),
        Err(rejection) => {
            tracing::debug!("rejected task id segment: {}", rejection.body_text());
            Err(ApiError::InvalidId)
        }
    }
}

/// Ensure the task exists, mapping absence to 404.
async fn require_task(state: &AppState, id: TaskId, op: Operation) -> Result<(), ApiError> {
    match state.tasks.find_by_id(id).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(ApiError::NotFound),
        Err(e) => Err(ApiError::storage(op, e)),
    }
}

/// GET /api/tasks - List tasks, newest first.
async fn list_tasks(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<Json<TaskListEnvelope>, ApiError> {
    let filter = ListTasksQuery::from_query_string(query.as_deref()).into_filter();
    let tasks = state
        .tasks
        .list(filter)
        .await
        .map_err(|e| ApiError::storage(Operation::List, e))?;
    Ok(Json(TaskListEnvelope::new(tasks)))
}

/// POST /api/tasks/create - Create a task from a form (or JSON) body.
async fn create_task(
    State(state): State<Arc<AppState>>,
    body: Result<RequestBody, BodyRejection>,
) -> Result<(StatusCode, Json<TaskEnvelope>), ApiError> {
    let fields = body
        .map_err(|e| ApiError::malformed(Operation::Create, e.0))?
        .into_fields();
    let new_task = validate_create(&fields)?.into_new_task()?;

    let task = state
        .tasks
        .create(new_task)
        .await
        .map_err(|e| ApiError::storage(Operation::Create, e))?;

    tracing::info!("Created task: {} ({})", task.title, task.id);

    Ok((StatusCode::CREATED, Json(TaskEnvelope::new(task))))
}

/// GET /api/tasks/:id - Get a single task.
async fn get_task(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<TaskEnvelope>, ApiError> {
    let id = task_id(path)?;
    state
        .tasks
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::storage(Operation::Get, e))?
        .map(|task| Json(TaskEnvelope::new(task)))
        .ok_or(ApiError::NotFound)
}

/// PUT|PATCH /api/tasks/:id - Partially update a task.
///
/// Both verbs have patch semantics: absent fields keep their stored values.
async fn update_task(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
    body: Result<RequestBody, BodyRejection>,
) -> Result<Json<TaskEnvelope>, ApiError> {
    let id = task_id(path)?;
    let fields = body
        .map_err(|e| ApiError::malformed(Operation::Update, e.0))?
        .into_fields();
    let patch = validate_update(&fields)?.into_patch()?;

    require_task(&state, id, Operation::Update).await?;

    let task = state
        .tasks
        .update(id, patch)
        .await
        .map_err(|e| ApiError::storage(Operation::Update, e))?;

    tracing::info!("Updated task: {} ({})", task.title, task.id);

    Ok(Json(TaskEnvelope::new(task)))
}

/// DELETE /api/tasks/:id - Permanently delete a task.
async fn delete_task(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<MessageEnvelope>, ApiError> {
    let id = task_id(path)?;

    require_task(&state, id, Operation::Delete).await?;

    state
        .tasks
        .delete(id)
        .await
        .map_err(|e| ApiError::storage(Operation::Delete, e))?;

    tracing::info!("Deleted task {}", id);

    Ok(Json(MessageEnvelope::new(TASK_DELETED)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_accepts_positive_integers() {
        assert_eq!(parse_id("1").unwrap(), 1);
        assert_eq!(parse_id("9007199254740991").unwrap(), 9_007_199_254_740_991);
    }

    #[test]
    fn test_parse_id_rejects_everything_else() {
        for raw in ["0", "-4", "abc", "12abc", "1.5", "", " 3"] {
            assert!(
                matches!(parse_id(raw), Err(ApiError::InvalidId)),
                "id {raw:?} should be rejected"
            );
        }
    }
}
