use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use super::{
    pagination::Pagination,
    task_filter::TaskFilter,
    task_models::{NewTask, Task, TaskChanges},
};

/// Fields tasks can be grouped and counted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    Division,
    Priority,
    Status,
}

impl GroupField {
    pub fn column(self) -> &'static str {
        match self {
            GroupField::Division => "division",
            GroupField::Priority => "priority",
            GroupField::Status => "status",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub key: String,
    pub count: i64,
}

/// Persistence contract for tasks.
///
/// Listing results are always ordered newest task date first, then most
/// recently created, then by identifier, so that page windows never overlap.
/// Group counts come back ordered by count descending, then key ascending.
/// Every mutation is a single atomic store operation.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, task: NewTask) -> Result<Task>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>>;

    /// `None` for the window returns every matching task.
    async fn find(&self, filter: &TaskFilter, window: Option<Pagination>) -> Result<Vec<Task>>;

    async fn count(&self, filter: &TaskFilter) -> Result<i64>;

    async fn update(&self, id: Uuid, changes: TaskChanges) -> Result<Option<Task>>;

    /// Returns whether a task was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    async fn group_count(&self, field: GroupField) -> Result<Vec<GroupCount>>;
}
