use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::error::{AppError, FieldError, Result};
use super::{
    pagination::Pagination,
    task_filter::{parse_calendar_date, TaskFilterParams},
    task_models::{NewTask, Task, TaskChanges, TaskPriority, TaskStatus},
};

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(
        required(message = "Author is required"),
        length(min = 2, max = 100, message = "Author name must be between 2 and 100 characters")
    )]
    pub author: Option<String>,
    #[validate(
        required(message = "Division is required"),
        length(min = 2, max = 100, message = "Division must be between 2 and 100 characters")
    )]
    pub division: Option<String>,
    #[validate(
        required(message = "Task description is required"),
        length(min = 5, max = 1000, message = "Task description must be between 5 and 1000 characters")
    )]
    pub task: Option<String>,
    #[validate(
        required(message = "Date of task is required"),
        custom(function = "validate_task_date")
    )]
    pub date_of_task: Option<String>,
    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,
    #[validate(custom(function = "validate_priority"))]
    pub priority: Option<String>,
}

impl CreateTaskRequest {
    /// Trims the free-text fields, as length rules apply to trimmed values.
    pub fn normalized(mut self) -> Self {
        trim(&mut self.author);
        trim(&mut self.division);
        trim(&mut self.task);
        self
    }

    /// Converts a request that already passed validation.
    pub fn into_new_task(self, created_by: Option<uuid::Uuid>) -> Result<NewTask> {
        let date_of_task = self.date_of_task.as_deref().and_then(parse_calendar_date);
        match (self.author, self.division, self.task, date_of_task) {
            (Some(author), Some(division), Some(task), Some(date_of_task)) => Ok(NewTask {
                author,
                division,
                task,
                date_of_task,
                status: parse_or_default(self.status.as_deref())?,
                priority: parse_or_default(self.priority.as_deref())?,
                created_by,
            }),
            _ => Err(AppError::BadRequest("Incomplete task".to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[validate(length(min = 2, max = 100, message = "Author name must be between 2 and 100 characters"))]
    pub author: Option<String>,
    #[validate(length(min = 2, max = 100, message = "Division must be between 2 and 100 characters"))]
    pub division: Option<String>,
    #[validate(length(min = 5, max = 1000, message = "Task description must be between 5 and 1000 characters"))]
    pub task: Option<String>,
    #[validate(custom(function = "validate_task_date"))]
    pub date_of_task: Option<String>,
    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,
    #[validate(custom(function = "validate_priority"))]
    pub priority: Option<String>,
}

impl UpdateTaskRequest {
    pub fn normalized(mut self) -> Self {
        trim(&mut self.author);
        trim(&mut self.division);
        trim(&mut self.task);
        self
    }

    pub fn into_changes(self) -> Result<TaskChanges> {
        let date_of_task = match self.date_of_task.as_deref() {
            None => None,
            Some(raw) => Some(parse_calendar_date(raw).ok_or_else(|| invalid_date(raw))?),
        };

        Ok(TaskChanges {
            author: self.author,
            division: self.division,
            task: self.task,
            date_of_task,
            status: self.status.as_deref().map(parse_variant::<TaskStatus>).transpose()?,
            priority: self.priority.as_deref().map(parse_variant::<TaskPriority>).transpose()?,
        })
    }
}

/// Query string accepted by the listing endpoint.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TaskListQuery {
    pub author: Option<String>,
    pub division: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// 1-based page number, defaults to 1
    pub page: Option<String>,
    /// Page size, defaults to 10
    pub limit: Option<String>,
}

impl TaskListQuery {
    pub fn into_parts(self) -> (TaskFilterParams, Pagination) {
        let pagination = Pagination::from_raw(self.page.as_deref(), self.limit.as_deref());
        let filters = TaskFilterParams {
            author: self.author,
            division: self.division,
            status: self.status,
            priority: self.priority,
            start_date: self.start_date,
            end_date: self.end_date,
        };
        (filters, pagination)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskListResponse {
    pub success: bool,
    pub count: usize,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TaskResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub task: Task,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DivisionCount {
    pub division: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PriorityCount {
    pub priority: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub by_division: Vec<DivisionCount>,
    pub by_priority: Vec<PriorityCount>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: TaskStats,
}

fn trim(field: &mut Option<String>) {
    if let Some(value) = field {
        let trimmed = value.trim();
        if trimmed.len() != value.len() {
            *value = trimmed.to_string();
        }
    }
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn validate_task_date(value: &str) -> std::result::Result<(), ValidationError> {
    match parse_calendar_date(value) {
        Some(_) => Ok(()),
        None => Err(invalid("date", "Please provide a valid date")),
    }
}

fn validate_status(value: &str) -> std::result::Result<(), ValidationError> {
    match value.parse::<TaskStatus>() {
        Ok(_) => Ok(()),
        Err(_) => Err(invalid(
            "status",
            "Status must be one of: pending, in-progress, completed, cancelled",
        )),
    }
}

fn validate_priority(value: &str) -> std::result::Result<(), ValidationError> {
    match value.parse::<TaskPriority>() {
        Ok(_) => Ok(()),
        Err(_) => Err(invalid(
            "priority",
            "Priority must be one of: low, medium, high, urgent",
        )),
    }
}

fn parse_variant<T: std::str::FromStr>(raw: &str) -> Result<T> {
    raw.parse().map_err(|_| {
        AppError::Validation(vec![FieldError {
            field: "value".to_string(),
            message: format!("Unsupported value {:?}", raw),
            value: Some(raw.into()),
        }])
    })
}

fn parse_or_default<T: std::str::FromStr + Default>(raw: Option<&str>) -> Result<T> {
    raw.map(parse_variant::<T>).transpose().map(Option::unwrap_or_default)
}

fn invalid_date(raw: &str) -> AppError {
    AppError::Validation(vec![FieldError {
        field: "dateOfTask".to_string(),
        message: "Please provide a valid date".to_string(),
        value: Some(raw.into()),
    }])
}
