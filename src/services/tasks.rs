//! Per-user task storage. Every statement is scoped by the owner's id.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::task::TASK_COLUMNS;
use crate::models::{CreateTaskInput, Task, TaskListQuery, UpdateTaskInput};
use crate::pagination::PageParams;
use crate::query::{ListQuery, SortOrder};

fn not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

pub async fn create(pool: &PgPool, owner: Uuid, input: CreateTaskInput) -> Result<Task, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (user_id, title, status) VALUES ($1, $2, $3) RETURNING {TASK_COLUMNS}"
    ))
    .bind(owner)
    .bind(input.title)
    .bind(input.status.unwrap_or_default())
    .fetch_one(pool)
    .await?;

    log::debug!("task {} created for user {}", task.id, owner);
    Ok(task)
}

/// One page of the owner's tasks plus the total count for the same filter.
pub async fn list(
    pool: &PgPool,
    owner: Uuid,
    params: &TaskListQuery,
    page: &PageParams,
) -> Result<(Vec<Task>, i64), AppError> {
    let query = ListQuery::new("tasks", TASK_COLUMNS)
        .owned_by(owner)
        .search(params.search.as_deref(), &["title"])
        .status(params.status)
        .sort(SortOrder::from_param(params.sort.as_deref()));

    let mut select = query.select_page(page);
    let mut count = query.count();
    let (tasks, total) = tokio::try_join!(
        select.build_query_as::<Task>().fetch_all(pool),
        count.build_query_scalar::<i64>().fetch_one(pool),
    )?;
    Ok((tasks, total))
}

pub async fn get_by_id(pool: &PgPool, owner: Uuid, id: Uuid) -> Result<Task, AppError> {
    sqlx::query_as::<_, Task>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(owner)
    .fetch_optional(pool)
    .await?
    .ok_or_else(not_found)
}

/// Applies the fields present in `input`; absent fields keep their stored value.
pub async fn update(
    pool: &PgPool,
    owner: Uuid,
    id: Uuid,
    input: UpdateTaskInput,
) -> Result<Task, AppError> {
    sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks
         SET title = COALESCE($1, title), status = COALESCE($2, status), updated_at = NOW()
         WHERE id = $3 AND user_id = $4
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(input.title)
    .bind(input.status)
    .bind(id)
    .bind(owner)
    .fetch_optional(pool)
    .await?
    .ok_or_else(not_found)
}

pub async fn delete(pool: &PgPool, owner: Uuid, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(not_found());
    }
    Ok(())
}

/// Deletes whichever of `ids` the owner has. Ids owned by others are skipped silently.
pub async fn delete_batch(pool: &PgPool, owner: Uuid, ids: &[Uuid]) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = ANY($1) AND user_id = $2")
        .bind(ids)
        .bind(owner)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
