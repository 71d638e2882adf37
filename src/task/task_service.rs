use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use super::{
    pagination::Pagination,
    task_dto::{CreateTaskRequest, DivisionCount, PriorityCount, TaskStats, UpdateTaskRequest},
    task_filter::{TaskFilter, TaskFilterParams},
    task_models::{Task, TaskStatus},
    task_store::{GroupField, TaskStore},
};

/// One page of a task listing.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

/// Service layer for task queries, mutations and statistics.
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub async fn list_tasks(
        &self,
        params: &TaskFilterParams,
        pagination: Pagination,
    ) -> Result<TaskPage> {
        let filter = TaskFilter::from_params(params)?;

        let tasks = self.store.find(&filter, Some(pagination)).await?;
        let total = self.store.count(&filter).await?;

        tracing::debug!(
            "Listed {} of {} tasks (page {}, limit {})",
            tasks.len(),
            total,
            pagination.page,
            pagination.limit
        );

        Ok(TaskPage {
            tasks,
            total,
            page: pagination.page,
            total_pages: pagination.total_pages(total),
        })
    }

    /// Every task matching `params`, in listing order, without pagination.
    pub async fn export_tasks(&self, params: &TaskFilterParams) -> Result<Vec<Task>> {
        let filter = TaskFilter::from_params(params)?;
        self.store.find(&filter, None).await
    }

    pub async fn get_task(&self, raw_id: &str) -> Result<Task> {
        let id = parse_task_id(raw_id)?;
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(task_not_found)
    }

    pub async fn create_task(
        &self,
        payload: CreateTaskRequest,
        created_by: Option<Uuid>,
    ) -> Result<Task> {
        let payload = payload.normalized();
        payload.validate()?;

        let task = self.store.insert(payload.into_new_task(created_by)?).await?;
        tracing::info!("Created task {}", task.id);
        Ok(task)
    }

    pub async fn update_task(&self, raw_id: &str, payload: UpdateTaskRequest) -> Result<Task> {
        let id = parse_task_id(raw_id)?;
        let payload = payload.normalized();
        payload.validate()?;

        let task = self
            .store
            .update(id, payload.into_changes()?)
            .await?
            .ok_or_else(task_not_found)?;
        tracing::info!("Updated task {}", task.id);
        Ok(task)
    }

    pub async fn delete_task(&self, raw_id: &str) -> Result<()> {
        let id = parse_task_id(raw_id)?;
        if !self.store.delete(id).await? {
            return Err(task_not_found());
        }
        tracing::info!("Deleted task {}", id);
        Ok(())
    }

    /// Aggregates over every task, ignoring any filter.
    pub async fn get_stats(&self) -> Result<TaskStats> {
        let total = self.store.count(&TaskFilter::default()).await?;
        let by_status = self.store.group_count(GroupField::Status).await?;
        let by_division = self.store.group_count(GroupField::Division).await?;
        let by_priority = self.store.group_count(GroupField::Priority).await?;

        let status_count = |status: TaskStatus| {
            by_status
                .iter()
                .find(|group| group.key == status.as_str())
                .map_or(0, |group| group.count)
        };

        Ok(TaskStats {
            total,
            pending: status_count(TaskStatus::Pending),
            in_progress: status_count(TaskStatus::InProgress),
            completed: status_count(TaskStatus::Completed),
            cancelled: status_count(TaskStatus::Cancelled),
            by_division: by_division
                .into_iter()
                .map(|group| DivisionCount {
                    division: group.key,
                    count: group.count,
                })
                .collect(),
            by_priority: by_priority
                .into_iter()
                .map(|group| PriorityCount {
                    priority: group.key,
                    count: group.count,
                })
                .collect(),
        })
    }
}

fn parse_task_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::InvalidIdentifier(raw.to_string()))
}

fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".to_string())
}
