use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::dto::{CreateTaskRequest, UpdateTaskRequest};
use super::filters::compute_pagination;
use super::model::{Pagination, Task, TaskFilters};
use super::patch::{compose, Assignment};
use super::store::{StoreResult, TaskStore};

/// Process-local [`TaskStore`] with the same semantics as the Postgres one.
#[derive(Default)]
pub struct InMemoryTaskStore {
    inner: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    tasks: BTreeMap<i64, Task>,
    last_id: i64,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn is_match(task: &Task, filters: &TaskFilters, needle: Option<&str>) -> bool {
    if filters.completed.is_some_and(|c| c != task.completed) {
        return false;
    }
    match needle {
        Some(needle) => {
            task.title.to_lowercase().contains(needle)
                || task.description.to_lowercase().contains(needle)
        }
        None => true,
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn query(&self, filters: &TaskFilters) -> StoreResult<(Vec<Task>, Pagination)> {
        let tables = self.inner.read().await;
        let needle = filters.search_term().map(str::to_lowercase);

        let mut found: Vec<&Task> = tables
            .tasks
            .values()
            .filter(|t| is_match(t, filters, needle.as_deref()))
            .collect();
        found.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let pagination = compute_pagination(found.len() as u64, filters);
        let offset = usize::try_from(filters.offset()).unwrap_or(usize::MAX);
        let page = found
            .into_iter()
            .skip(offset)
            .take(filters.limit as usize)
            .cloned()
            .collect();

        Ok((page, pagination))
    }

    async fn get_by_id(&self, id: i64) -> StoreResult<Option<Task>> {
        Ok(self.inner.read().await.tasks.get(&id).cloned())
    }

    async fn create(&self, request: &CreateTaskRequest) -> StoreResult<Task> {
        let mut tables = self.inner.write().await;
        tables.last_id += 1;

        let now = Utc::now();
        let task = Task {
            id: tables.last_id,
            title: request.title.clone(),
            description: request.description.clone().unwrap_or_default(),
            completed: false,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.insert(task.id, task.clone());

        Ok(task)
    }

    async fn update(&self, id: i64, request: &UpdateTaskRequest) -> StoreResult<Option<Task>> {
        let mut tables = self.inner.write().await;
        let Some(task) = tables.tasks.get_mut(&id) else {
            return Ok(None);
        };

        for assignment in compose(request) {
            match assignment {
                Assignment::Title(title) => task.title = title,
                Assignment::Description(text) => task.description = text,
                Assignment::Completed(flag) => task.completed = flag,
                // never earlier than created_at, even if the clock steps back
                Assignment::UpdatedAtNow => task.updated_at = Utc::now().max(task.created_at),
            }
        }

        Ok(Some(task.clone()))
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        Ok(self.inner.write().await.tasks.remove(&id).is_some())
    }
}
