use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::Result;
use super::{
    pagination::Pagination,
    task_filter::TaskFilter,
    task_models::{NewTask, Task, TaskChanges, TaskRow},
    task_store::{GroupCount, GroupField, TaskStore},
};

const TASK_COLUMNS: &str = "t.id, t.author, t.division, t.task, t.date_of_task, t.status, t.priority,
        t.created_by, u.name AS creator_name, u.email AS creator_email, t.created_at, t.updated_at";

const ORDER_BY: &str = " ORDER BY t.date_of_task DESC, t.created_at DESC, t.id DESC";

/// PostgreSQL-backed task store. The creator is resolved with a join on `users`.
#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for TaskRepository {
    async fn insert(&self, task: NewTask) -> Result<Task> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "WITH t AS (
                INSERT INTO tasks (id, author, division, task, date_of_task, status, priority, created_by, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
                RETURNING *
             )
             SELECT {} FROM t LEFT JOIN users u ON u.id = t.created_by",
            TASK_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&task.author)
        .bind(&task.division)
        .bind(&task.task)
        .bind(task.date_of_task)
        .bind(task.status)
        .bind(task.priority)
        .bind(task.created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {} FROM tasks t LEFT JOIN users u ON u.id = t.created_by WHERE t.id = $1",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Task::from))
    }

    async fn find(&self, filter: &TaskFilter, window: Option<Pagination>) -> Result<Vec<Task>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM tasks t LEFT JOIN users u ON u.id = t.created_by",
            TASK_COLUMNS
        ));
        filter.push_conditions(&mut builder);
        builder.push(ORDER_BY);

        if let Some(window) = window {
            builder.push(" LIMIT ").push_bind(window.limit);
            builder.push(" OFFSET ").push_bind(window.skip());
        }

        let rows = builder
            .build_query_as::<TaskRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn count(&self, filter: &TaskFilter) -> Result<i64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tasks t");
        filter.push_conditions(&mut builder);

        let total = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    async fn update(&self, id: Uuid, changes: TaskChanges) -> Result<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "WITH t AS (
                UPDATE tasks SET
                    author = COALESCE($1, author),
                    division = COALESCE($2, division),
                    task = COALESCE($3, task),
                    date_of_task = COALESCE($4, date_of_task),
                    status = COALESCE($5, status),
                    priority = COALESCE($6, priority),
                    updated_at = GREATEST(NOW(), created_at)
                WHERE id = $7
                RETURNING *
             )
             SELECT {} FROM t LEFT JOIN users u ON u.id = t.created_by",
            TASK_COLUMNS
        ))
        .bind(changes.author)
        .bind(changes.division)
        .bind(changes.task)
        .bind(changes.date_of_task)
        .bind(changes.status)
        .bind(changes.priority)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Task::from))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn group_count(&self, field: GroupField) -> Result<Vec<GroupCount>> {
        let column = field.column();
        let rows = sqlx::query_as::<_, (String, i64)>(&format!(
            "SELECT {column} AS group_key, COUNT(*) AS group_count FROM tasks
             GROUP BY {column}
             ORDER BY group_count DESC, group_key ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(key, count)| GroupCount { key, count })
            .collect())
    }
}
