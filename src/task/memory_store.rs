use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;
use crate::user::UserRef;
use super::{
    pagination::Pagination,
    task_filter::TaskFilter,
    task_models::{NewTask, Task, TaskChanges},
    task_store::{GroupCount, GroupField, TaskStore},
};

/// In-process task store used by the service and router tests.
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<Vec<Task>>,
    users: RwLock<HashMap<Uuid, UserRef>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: UserRef) {
        self.users.write().unwrap().insert(user.id, user);
    }

    fn sorted(tasks: &[Task], filter: &TaskFilter) -> Vec<Task> {
        let mut matching: Vec<Task> = tasks.iter().filter(|t| filter.matches(t)).cloned().collect();
        matching.sort_by(|a, b| {
            b.date_of_task
                .cmp(&a.date_of_task)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });
        matching
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert(&self, task: NewTask) -> Result<Task> {
        let now = Utc::now();
        let created_by = task
            .created_by
            .and_then(|id| self.users.read().unwrap().get(&id).cloned());
        let task = Task {
            id: Uuid::new_v4(),
            author: task.author,
            division: task.division,
            task: task.task,
            date_of_task: task.date_of_task,
            status: task.status,
            priority: task.priority,
            created_by,
            created_at: now,
            updated_at: now,
        };
        self.tasks.write().unwrap().push(task.clone());
        Ok(task)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>> {
        Ok(self.tasks.read().unwrap().iter().find(|t| t.id == id).cloned())
    }

    async fn find(&self, filter: &TaskFilter, window: Option<Pagination>) -> Result<Vec<Task>> {
        let matching = Self::sorted(&self.tasks.read().unwrap(), filter);
        Ok(match window {
            None => matching,
            Some(window) => matching
                .into_iter()
                .skip(window.skip() as usize)
                .take(window.limit as usize)
                .collect(),
        })
    }

    async fn count(&self, filter: &TaskFilter) -> Result<i64> {
        Ok(self.tasks.read().unwrap().iter().filter(|t| filter.matches(t)).count() as i64)
    }

    async fn update(&self, id: Uuid, changes: TaskChanges) -> Result<Option<Task>> {
        let mut tasks = self.tasks.write().unwrap();
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        changes.apply(task);
        task.updated_at = Utc::now().max(task.created_at);
        Ok(Some(task.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut tasks = self.tasks.write().unwrap();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        Ok(tasks.len() < before)
    }

    async fn group_count(&self, field: GroupField) -> Result<Vec<GroupCount>> {
        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for task in self.tasks.read().unwrap().iter() {
            let key = match field {
                GroupField::Division => task.division.clone(),
                GroupField::Priority => task.priority.to_string(),
                GroupField::Status => task.status.to_string(),
            };
            *counts.entry(key).or_default() += 1;
        }

        let mut groups: Vec<GroupCount> = counts
            .into_iter()
            .map(|(key, count)| GroupCount { key, count })
            .collect();
        groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        Ok(groups)
    }
}
