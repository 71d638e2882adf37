use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use crate::{
    error::{AppError, Result},
    middleware::{AppJson, AppQuery, AuthUser, MaybeAuthUser},
    state::AppState,
};
use super::{
    task_dto::{
        CreateTaskRequest, MessageResponse, StatsResponse, TaskListQuery, TaskListResponse,
        TaskResponse, UpdateTaskRequest,
    },
    task_export::{build_workbook, CONTENT_TYPE},
    task_filter::TaskFilterParams,
};

/// List tasks matching the filters, one page at a time
#[utoipa::path(
    get,
    path = "/api/tasks",
    params(TaskListQuery),
    responses(
        (status = 200, description = "Page of tasks", body = TaskListResponse),
        (status = 400, description = "Malformed date filter")
    ),
    tag = "tasks"
)]
pub async fn get_tasks(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<TaskListQuery>,
) -> Result<Json<TaskListResponse>> {
    let (filters, pagination) = query.into_parts();
    let page = state.task_service.list_tasks(&filters, pagination).await?;

    Ok(Json(TaskListResponse {
        success: true,
        count: page.tasks.len(),
        total: page.total,
        page: page.page,
        total_pages: page.total_pages,
        tasks: page.tasks,
    }))
}

/// Get a single task by ID
#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    params(
        ("id" = String, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task found", body = TaskResponse),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks"
)]
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskResponse>> {
    let task = state.task_service.get_task(&task_id).await?;

    Ok(Json(TaskResponse {
        success: true,
        message: None,
        task,
    }))
}

/// Create a new task. An authenticated caller is recorded as its creator.
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Validation error")
    ),
    tag = "tasks"
)]
pub async fn create_task(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    AppJson(payload): AppJson<CreateTaskRequest>,
) -> Result<impl IntoResponse> {
    let task = state
        .task_service
        .create_task(payload, user.map(|u| u.id))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            success: true,
            message: Some("Task created successfully".to_string()),
            task,
        }),
    ))
}

/// Update a task
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    params(
        ("id" = String, Path, description = "Task ID")
    ),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Task not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(task_id): Path<String>,
    AppJson(payload): AppJson<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>> {
    let task = state.task_service.update_task(&task_id, payload).await?;
    tracing::debug!("Task {} updated by user {}", task.id, user.id);

    Ok(Json(TaskResponse {
        success: true,
        message: Some("Task updated successfully".to_string()),
        task,
    }))
}

/// Delete a task
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(
        ("id" = String, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task deleted", body = MessageResponse),
        (status = 404, description = "Task not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(task_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    state.task_service.delete_task(&task_id).await?;
    tracing::debug!("Task {} deleted by user {}", task_id, user.id);

    Ok(Json(MessageResponse {
        success: true,
        message: "Task deleted successfully".to_string(),
    }))
}

/// Aggregate counts over all tasks
#[utoipa::path(
    get,
    path = "/api/tasks/stats",
    responses(
        (status = 200, description = "Task statistics", body = StatsResponse)
    ),
    tag = "tasks"
)]
pub async fn get_task_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = state.task_service.get_stats().await?;

    Ok(Json(StatsResponse {
        success: true,
        stats,
    }))
}

/// Download every task matching the filters as an Excel workbook
#[utoipa::path(
    get,
    path = "/api/tasks/download/excel",
    params(TaskFilterParams),
    responses(
        (status = 200, description = "XLSX workbook attachment"),
        (status = 400, description = "Malformed date filter")
    ),
    tag = "tasks"
)]
pub async fn download_tasks_excel(
    State(state): State<AppState>,
    AppQuery(filters): AppQuery<TaskFilterParams>,
) -> Result<impl IntoResponse> {
    let tasks = state.task_service.export_tasks(&filters).await?;
    let count = tasks.len();

    let workbook = tokio::task::spawn_blocking(move || build_workbook(&tasks, Utc::now()))
        .await
        .map_err(|e| {
            tracing::error!("Export task panicked: {:?}", e);
            AppError::InternalError
        })??;

    tracing::info!("Exported {} tasks to {}", count, workbook.filename);

    let disposition = format!("attachment; filename=\"{}\"", workbook.filename);
    Ok((
        [
            (header::CONTENT_TYPE, CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        workbook.bytes,
    ))
}
