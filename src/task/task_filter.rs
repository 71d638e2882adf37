//! Translation of raw listing/export query parameters into a task predicate.
//!
//! The same [`TaskFilter`] drives listing and export, so both always select
//! the same tasks for the same parameters.

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};
use utoipa::IntoParams;

use crate::error::{AppError, Result};
use super::task_models::Task;

/// Filter parameters exactly as they arrive on the query string.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TaskFilterParams {
    /// Case-insensitive substring of the author
    pub author: Option<String>,
    /// Case-insensitive substring of the division
    pub division: Option<String>,
    /// Exact status
    pub status: Option<String>,
    /// Exact priority
    pub priority: Option<String>,
    /// Earliest date of task, inclusive
    pub start_date: Option<String>,
    /// Latest date of task, inclusive
    pub end_date: Option<String>,
}

/// Normalized predicate over tasks. The default value matches every task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub author: Option<String>,
    pub division: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl TaskFilter {
    pub fn from_params(params: &TaskFilterParams) -> Result<Self> {
        Ok(Self {
            author: params.author.clone(),
            division: params.division.clone(),
            status: non_empty(&params.status),
            priority: non_empty(&params.priority),
            date_from: parse_bound("startDate", &params.start_date)?,
            date_to: parse_bound("endDate", &params.end_date)?,
        })
    }

    /// Status and priority are compared verbatim, so values outside the
    /// enumeration simply match nothing.
    pub fn matches(&self, task: &Task) -> bool {
        contains_ignore_case(&task.author, self.author.as_deref())
            && contains_ignore_case(&task.division, self.division.as_deref())
            && self.status.as_deref().map_or(true, |s| task.status.as_str() == s)
            && self.priority.as_deref().map_or(true, |p| task.priority.as_str() == p)
            && self.date_from.map_or(true, |from| task.date_of_task >= from)
            && self.date_to.map_or(true, |to| task.date_of_task <= to)
    }

    /// Appends a `WHERE` clause for the `t` alias of the tasks table.
    pub fn push_conditions(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        let mut glue = {
            let mut first = true;
            move || if std::mem::take(&mut first) { " WHERE " } else { " AND " }
        };

        if let Some(author) = &self.author {
            builder.push(glue()).push("t.author ILIKE ");
            builder.push_bind(like_pattern(author));
        }
        if let Some(division) = &self.division {
            builder.push(glue()).push("t.division ILIKE ");
            builder.push_bind(like_pattern(division));
        }
        if let Some(status) = &self.status {
            builder.push(glue()).push("t.status = ");
            builder.push_bind(status.clone());
        }
        if let Some(priority) = &self.priority {
            builder.push(glue()).push("t.priority = ");
            builder.push_bind(priority.clone());
        }
        if let Some(from) = self.date_from {
            builder.push(glue()).push("t.date_of_task >= ");
            builder.push_bind(from);
        }
        if let Some(to) = self.date_to {
            builder.push(glue()).push("t.date_of_task <= ");
            builder.push_bind(to);
        }
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (whose calendar date is used).
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn parse_bound(name: &str, raw: &Option<String>) -> Result<Option<NaiveDate>> {
    match non_empty(raw) {
        None => Ok(None),
        Some(value) => parse_calendar_date(&value)
            .map(Some)
            .ok_or_else(|| AppError::InvalidQuery(format!("Invalid {}: {:?}", name, value))),
    }
}

fn non_empty(raw: &Option<String>) -> Option<String> {
    raw.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

fn contains_ignore_case(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
    }
}

/// Wraps `value` for ILIKE so that it matches as a literal substring.
fn like_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::task_models::{TaskPriority, TaskStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn task(author: &str, division: &str, date: (i32, u32, u32)) -> Task {
        Task {
            id: Uuid::new_v4(),
            author: author.into(),
            division: division.into(),
            task: "Something to do".into(),
            date_of_task: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn params() -> TaskFilterParams {
        TaskFilterParams::default()
    }

    #[test]
    fn test_no_parameters_matches_everything() {
        let filter = TaskFilter::from_params(&params()).unwrap();
        assert_eq!(filter, TaskFilter::default());
        assert!(filter.matches(&task("Alice", "Eng", (2024, 1, 15))));
    }

    #[test]
    fn test_author_is_case_insensitive_substring() {
        let filter = TaskFilter::from_params(&TaskFilterParams {
            author: Some("ALI".into()),
            ..params()
        })
        .unwrap();
        assert!(filter.matches(&task("Alice", "Eng", (2024, 1, 15))));
        assert!(filter.matches(&task("Natalie", "Eng", (2024, 1, 15))));
        assert!(!filter.matches(&task("Bob", "Eng", (2024, 1, 15))));
    }

    #[test]
    fn test_empty_author_matches_everything() {
        let filter = TaskFilter::from_params(&TaskFilterParams {
            author: Some(String::new()),
            ..params()
        })
        .unwrap();
        assert_eq!(filter.author.as_deref(), Some(""));
        assert!(filter.matches(&task("Bob", "Ops", (2024, 1, 15))));
    }

    #[test]
    fn test_unknown_status_matches_nothing() {
        let filter = TaskFilter::from_params(&TaskFilterParams {
            status: Some("archived".into()),
            ..params()
        })
        .unwrap();
        assert!(!filter.matches(&task("Alice", "Eng", (2024, 1, 15))));
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let filter = TaskFilter::from_params(&TaskFilterParams {
            start_date: Some("2024-01-10".into()),
            end_date: Some("2024-01-15".into()),
            ..params()
        })
        .unwrap();
        assert!(filter.matches(&task("A", "B", (2024, 1, 10))));
        assert!(filter.matches(&task("A", "B", (2024, 1, 15))));
        assert!(!filter.matches(&task("A", "B", (2024, 1, 9))));
        assert!(!filter.matches(&task("A", "B", (2024, 1, 16))));
    }

    #[test]
    fn test_rfc3339_bound_uses_calendar_date() {
        let filter = TaskFilter::from_params(&TaskFilterParams {
            end_date: Some("2024-01-15T00:00:00.000Z".into()),
            ..params()
        })
        .unwrap();
        assert_eq!(filter.date_to, NaiveDate::from_ymd_opt(2024, 1, 15));
    }

    #[test]
    fn test_malformed_date_is_rejected() {
        let result = TaskFilter::from_params(&TaskFilterParams {
            start_date: Some("last tuesday".into()),
            ..params()
        });
        assert!(matches!(result, Err(AppError::InvalidQuery(_))));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Eng"), "%Eng%");
        assert_eq!(like_pattern("100%_a\\b"), "%100\\%\\_a\\\\b%");
    }

    #[test]
    fn test_push_conditions() {
        let filter = TaskFilter::from_params(&TaskFilterParams {
            author: Some("ali".into()),
            status: Some("completed".into()),
            start_date: Some("2024-01-01".into()),
            ..params()
        })
        .unwrap();

        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM tasks t");
        filter.push_conditions(&mut builder);
        assert_eq!(
            builder.sql(),
            "SELECT * FROM tasks t WHERE t.author ILIKE $1 AND t.status = $2 AND t.date_of_task >= $3"
        );

        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM tasks t");
        TaskFilter::default().push_conditions(&mut builder);
        assert_eq!(builder.sql(), "SELECT * FROM tasks t");
    }
}
