use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use super::dto::{CreateTaskRequest, UpdateTaskRequest};
use super::filters::compute_pagination;
use super::model::{Pagination, Task, TaskFilters};
use super::patch::{compose, Assignment};
use super::store::{StoreError, StoreResult, TaskStore};

const TASK_COLUMNS: &str = "id, title, description, completed, created_at, updated_at";

pub const CREATE_TASKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tasks (
    id BIGSERIAL PRIMARY KEY,
    title VARCHAR(255) NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    completed BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// Postgres-backed [`TaskStore`]. Every call is bounded by `op_timeout`.
#[derive(Clone)]
pub struct PgTaskStore {
    pool: PgPool,
    op_timeout: Duration,
}

impl PgTaskStore {
    pub fn new(pool: PgPool, op_timeout: Duration) -> Self {
        Self { pool, op_timeout }
    }

    /// Creates the `tasks` table when it does not exist yet.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        self.guard(async {
            sqlx::query(CREATE_TASKS_TABLE).execute(&self.pool).await?;
            Ok(())
        })
        .await
    }

    async fn guard<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        tokio::time::timeout(self.op_timeout, op)
            .await
            .map_err(|_| StoreError::Timeout(self.op_timeout))?
    }

    async fn fetch_by_id(&self, id: i64) -> StoreResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }
}

/// Appends the WHERE clause for `filters`. Values only ever go through
/// `push_bind`.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &TaskFilters) {
    let mut keyword = " WHERE ";

    if let Some(completed) = filters.completed {
        qb.push(keyword).push("completed = ").push_bind(completed);
        keyword = " AND ";
    }

    if let Some(term) = filters.search_term() {
        let pattern = format!("%{}%", escape_like(term));
        qb.push(keyword)
            .push("(title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

// Backslash is the default LIKE escape character in Postgres.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn build_count_query(filters: &TaskFilters) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM tasks");
    push_filters(&mut qb, filters);
    qb
}

/// Newest first, one page of `filters.limit` rows.
fn build_page_query(filters: &TaskFilters) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {TASK_COLUMNS} FROM tasks"));
    push_filters(&mut qb, filters);
    qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(i64::from(filters.limit))
        .push(" OFFSET ")
        .push_bind(i64::try_from(filters.offset()).unwrap_or(i64::MAX));
    qb
}

fn build_update(id: i64, set: &[Assignment]) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE tasks SET ");

    let mut columns = qb.separated(", ");
    for assignment in set {
        columns.push(assignment.column());
        columns.push_unseparated(" = ");
        match assignment {
            Assignment::Title(text) | Assignment::Description(text) => {
                columns.push_bind_unseparated(text.clone());
            }
            Assignment::Completed(flag) => {
                columns.push_bind_unseparated(*flag);
            }
            Assignment::UpdatedAtNow => {
                columns.push_unseparated("NOW()");
            }
        }
    }

    qb.push(" WHERE id = ").push_bind(id);
    qb
}

#[async_trait]
impl TaskStore for PgTaskStore {
    #[instrument(skip(self))]
    async fn query(&self, filters: &TaskFilters) -> StoreResult<(Vec<Task>, Pagination)> {
        self.guard(async {
            let total: i64 = build_count_query(filters)
                .build_query_scalar::<i64>()
                .fetch_one(&self.pool)
                .await?;
            let pagination = compute_pagination(u64::try_from(total).unwrap_or(0), filters);

            let tasks = build_page_query(filters)
                .build_query_as::<Task>()
                .fetch_all(&self.pool)
                .await?;

            Ok((tasks, pagination))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: i64) -> StoreResult<Option<Task>> {
        self.guard(self.fetch_by_id(id)).await
    }

    #[instrument(skip(self, request))]
    async fn create(&self, request: &CreateTaskRequest) -> StoreResult<Task> {
        self.guard(async {
            let id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO tasks (title, description, completed, created_at, updated_at)
                VALUES ($1, $2, FALSE, NOW(), NOW())
                RETURNING id
                "#,
            )
            .bind(&request.title)
            .bind(request.description.as_deref().unwrap_or_default())
            .fetch_one(&self.pool)
            .await?;

            self.fetch_by_id(id)
                .await?
                .ok_or(StoreError::Inconsistent { id })
        })
        .await
    }

    #[instrument(skip(self, request))]
    async fn update(&self, id: i64, request: &UpdateTaskRequest) -> StoreResult<Option<Task>> {
        self.guard(async {
            let Some(existing) = self.fetch_by_id(id).await? else {
                return Ok(None);
            };

            let set = compose(request);
            if set.is_empty() {
                return Ok(Some(existing));
            }

            let result = build_update(id, &set).build().execute(&self.pool).await?;
            if result.rows_affected() == 0 {
                // deleted after the existence check
                return Ok(None);
            }

            self.fetch_by_id(id)
                .await?
                .ok_or(StoreError::Inconsistent { id })
                .map(Some)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> StoreResult<bool> {
        self.guard(async {
            let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;

            Ok(result.rows_affected() > 0)
        })
        .await
    }
}
