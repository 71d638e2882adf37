use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::user::UserRef;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "text", rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 4] = [
        TaskPriority::Low,
        TaskPriority::Medium,
        TaskPriority::High,
        TaskPriority::Urgent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskPriority::ALL
            .into_iter()
            .find(|priority| priority.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant {0:?}")]
pub struct UnknownVariant(pub String);

/// A tracked unit of work, with its creator already resolved.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub author: String,
    pub division: String,
    /// Free-text description of the work.
    pub task: String,
    pub date_of_task: NaiveDate,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub created_by: Option<UserRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flat row produced by joining `tasks` with the creating user.
#[derive(Debug, FromRow)]
pub struct TaskRow {
    pub id: Uuid,
    pub author: String,
    pub division: String,
    pub task: String,
    pub date_of_task: NaiveDate,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub created_by: Option<Uuid>,
    pub creator_name: Option<String>,
    pub creator_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        let created_by = match (row.created_by, row.creator_name, row.creator_email) {
            (Some(id), Some(name), Some(email)) => Some(UserRef { id, name, email }),
            _ => None,
        };

        Self {
            id: row.id,
            author: row.author,
            division: row.division,
            task: row.task,
            date_of_task: row.date_of_task,
            status: row.status,
            priority: row.priority,
            created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Validated input for inserting a task.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub author: String,
    pub division: String,
    pub task: String,
    pub date_of_task: NaiveDate,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub created_by: Option<Uuid>,
}

/// Validated partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub author: Option<String>,
    pub division: Option<String>,
    pub task: Option<String>,
    pub date_of_task: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl TaskChanges {
    pub fn apply(self, task: &mut Task) {
        if let Some(author) = self.author {
            task.author = author;
        }
        if let Some(division) = self.division {
            task.division = division;
        }
        if let Some(description) = self.task {
            task.task = description;
        }
        if let Some(date_of_task) = self.date_of_task {
            task.date_of_task = date_of_task;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_display() {
        assert_eq!(TaskStatus::Pending.to_string(), "pending");
        assert_eq!(TaskStatus::InProgress.to_string(), "in-progress");
        assert_eq!(TaskStatus::Completed.to_string(), "completed");
        assert_eq!(TaskStatus::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn test_task_priority_display() {
        assert_eq!(TaskPriority::Low.to_string(), "low");
        assert_eq!(TaskPriority::Medium.to_string(), "medium");
        assert_eq!(TaskPriority::High.to_string(), "high");
        assert_eq!(TaskPriority::Urgent.to_string(), "urgent");
    }

    #[test]
    fn test_parse_rejects_free_text() {
        assert_eq!("in-progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert!("In Progress".parse::<TaskStatus>().is_err());
        assert!("critical".parse::<TaskPriority>().is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    }

    #[test]
    fn test_serde_matches_wire_literals() {
        assert_eq!(serde_json::to_value(TaskStatus::InProgress).unwrap(), "in-progress");
        assert_eq!(serde_json::to_value(TaskPriority::Urgent).unwrap(), "urgent");
    }

    #[test]
    fn test_row_without_creator() {
        let row = TaskRow {
            id: Uuid::new_v4(),
            author: "Alice".into(),
            division: "Eng".into(),
            task: "Fix bug".into(),
            date_of_task: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            created_by: None,
            creator_name: None,
            creator_email: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let task = Task::from(row);
        assert!(task.created_by.is_none());

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["_id"], task.id.to_string());
        assert_eq!(json["dateOfTask"], "2024-01-15");
        assert!(json["createdBy"].is_null());
    }
}
