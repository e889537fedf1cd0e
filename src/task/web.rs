use std::cmp::Reverse;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::task::{Priority, Task, TaskPayload, TaskStore};

/// Shared handler state. The store is behind a single mutex because axum
/// runs handlers on a multi-threaded runtime; every handler locks it for the
/// duration of its store access and never holds it across other awaits.
#[derive(Clone)]
pub struct TaskState {
    store: Arc<Mutex<TaskStore>>,
}

impl TaskState {
    pub fn new(store: TaskStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }
}

/// Validation failures for create/update payloads. The messages are part of
/// the API contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Title is required and must be a non-empty string")]
    Title,
    #[error("Description is required and must be a non-empty string")]
    Description,
    #[error("Completed must be a boolean value")]
    Completed,
    #[error("Priority must be one of: low, medium, high")]
    Priority,
}

/// Request-level errors for the task routes.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("Invalid task ID")]
    InvalidId,
    #[error("Task not found")]
    NotFound,
    #[error("Invalid priority level. Must be one of: low, medium, high")]
    InvalidPriorityLevel,
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// JSON error body: `{ "error": <message> }`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: String,
}

impl ErrorResponse {
    pub fn new(error: String) -> Self {
        Self { error }
    }
}

impl axum::response::IntoResponse for TaskError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            TaskError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// Checks a candidate payload field by field, short-circuiting on the first
/// failure. Bodies are inspected as loose JSON so that a missing field, a
/// wrongly-typed field and an out-of-set enum value each get their own
/// message.
pub fn validate_payload(body: &Value) -> Result<TaskPayload, ValidationError> {
    let title = required_trimmed_string(body.get("title"), ValidationError::Title)?;
    let description =
        required_trimmed_string(body.get("description"), ValidationError::Description)?;

    let completed = match body.get("completed") {
        None => None,
        Some(Value::Bool(value)) => Some(*value),
        Some(_) => return Err(ValidationError::Completed),
    };

    let priority = match body.get("priority") {
        None => None,
        Some(Value::String(value)) => {
            Some(Priority::parse(value).ok_or(ValidationError::Priority)?)
        }
        Some(_) => return Err(ValidationError::Priority),
    };

    Ok(TaskPayload {
        title,
        description,
        completed,
        priority,
    })
}

fn required_trimmed_string(
    value: Option<&Value>,
    error: ValidationError,
) -> Result<String, ValidationError> {
    match value {
        Some(Value::String(value)) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(error),
    }
}

/// A request without a parseable JSON body validates as an empty payload, so
/// it fails the title check rather than surfacing a framework rejection.
fn json_body(body: Result<Json<Value>, JsonRejection>) -> Value {
    body.map(|Json(value)| value).unwrap_or(Value::Null)
}

fn parse_task_id(id: &str) -> Result<u32, TaskError> {
    id.parse().map_err(|_| TaskError::InvalidId)
}

/// Query parameters accepted by the list endpoint.
#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    completed: Option<String>,
    priority: Option<String>,
    sort: Option<String>,
}

/// Handler for GET /tasks.
#[tracing::instrument(skip(state))]
pub async fn list_tasks_handler(
    State(state): State<TaskState>,
    Query(query): Query<ListTasksQuery>,
) -> Json<Vec<Task>> {
    let mut tasks: Vec<Task> = state.store.lock().await.all().to_vec();

    if let Some(completed) = &query.completed {
        let wanted = completed == "true";
        tasks.retain(|task| task.completed == wanted);
    }

    // An unrecognized priority filter is silently ignored, unlike the
    // dedicated priority route which rejects it.
    if let Some(priority) = query.priority.as_deref().and_then(Priority::parse) {
        tasks.retain(|task| task.priority == priority);
    }

    // Id order stands in for creation order here.
    match query.sort.as_deref() {
        Some("createdAt") | Some("date") => tasks.sort_by_key(|task| task.id),
        Some("createdAt-desc") | Some("date-desc") => {
            tasks.sort_by_key(|task| Reverse(task.id));
        }
        _ => {}
    }

    Json(tasks)
}

/// Handler for GET /tasks/{id}.
#[tracing::instrument(skip(state))]
pub async fn get_task_handler(
    State(state): State<TaskState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, TaskError> {
    let id = parse_task_id(&id)?;
    let store = state.store.lock().await;
    store.find(id).cloned().map(Json).ok_or(TaskError::NotFound)
}

/// Handler for POST /tasks.
#[tracing::instrument(skip(state, body))]
pub async fn create_task_handler(
    State(state): State<TaskState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), TaskError> {
    let payload = validate_payload(&json_body(body))?;
    let task = state.store.lock().await.create(payload);
    Ok((StatusCode::CREATED, Json(task)))
}

/// Handler for PUT /tasks/{id}.
#[tracing::instrument(skip(state, body))]
pub async fn update_task_handler(
    State(state): State<TaskState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Task>, TaskError> {
    // The body is validated before the id is examined, matching the original
    // middleware ordering.
    let payload = validate_payload(&json_body(body))?;
    let id = parse_task_id(&id)?;
    state
        .store
        .lock()
        .await
        .update(id, payload)
        .map(Json)
        .ok_or(TaskError::NotFound)
}

/// Handler for GET /tasks/priority/{level}. The level is matched
/// case-insensitively and rejected outright when unrecognized.
#[tracing::instrument(skip(state))]
pub async fn tasks_by_priority_handler(
    State(state): State<TaskState>,
    Path(level): Path<String>,
) -> Result<Json<Vec<Task>>, TaskError> {
    let level =
        Priority::parse(&level.to_lowercase()).ok_or(TaskError::InvalidPriorityLevel)?;
    let store = state.store.lock().await;
    let tasks = store
        .all()
        .iter()
        .filter(|task| task.priority == level)
        .cloned()
        .collect();
    Ok(Json(tasks))
}

/// Response body for a successful delete.
#[derive(Debug, Serialize)]
pub struct DeletedTaskResponse {
    message: String,
    task: Task,
}

/// Handler for DELETE /tasks/{id}.
#[tracing::instrument(skip(state))]
pub async fn delete_task_handler(
    State(state): State<TaskState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedTaskResponse>, TaskError> {
    let id = parse_task_id(&id)?;
    let task = state
        .store
        .lock()
        .await
        .remove(id)
        .ok_or(TaskError::NotFound)?;
    Ok(Json(DeletedTaskResponse {
        message: "Task deleted successfully".to_string(),
        task,
    }))
}

/// Creates and returns the task routes.
pub fn create_task_router(state: TaskState) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks_handler).post(create_task_handler))
        .route(
            "/tasks/{id}",
            get(get_task_handler)
                .put(update_task_handler)
                .delete(delete_task_handler),
        )
        .route("/tasks/priority/{level}", get(tasks_by_priority_handler))
        .with_state(state)
}
