use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{
        BatchDeleteRequest, BatchDeleteResult, CreateTaskInput, TaskListQuery, UpdateTaskInput,
    },
    response::{respond, respond_empty, respond_paginated},
    services::tasks,
};
use actix_web::{delete, get, http::StatusCode, post, put, web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Retrieves a page of the authenticated user's tasks.
///
/// ## Query Parameters:
/// - `page`, `limit` (optional): Paging; invalid values fall back to page 1 and 10 rows.
/// - `search` (optional): Case-insensitive substring of the title.
/// - `status` (optional): `PENDING`, `IN_PROGRESS` or `COMPLETED`.
/// - `sort` (optional): `oldest` for ascending creation time; newest first otherwise.
///
/// ## Responses:
/// - `200 OK`: `{ items, pagination }`.
/// - `400 Bad Request`: Unknown `status` value.
/// - `401 Unauthorized`: Missing or invalid access token.
#[get("")]
pub async fn get_tasks(
    pool: web::Data<PgPool>,
    query: web::Query<TaskListQuery>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let page = query.page_params();
    let (items, total) = tasks::list(&pool, user.id(), &query, &page).await?;
    Ok(respond_paginated(items, total, &page, "Tasks retrieved successfully"))
}

/// Creates a new task for the authenticated user.
///
/// ## Request Body:
/// - `title`: 1 to 255 characters.
/// - `status` (optional): Defaults to `PENDING`.
///
/// ## Responses:
/// - `201 Created`: The new task.
/// - `400 Bad Request`: Invalid payload.
/// - `401 Unauthorized`: Missing or invalid access token.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    task_data: web::Json<CreateTaskInput>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let task_data = task_data.into_inner().trimmed();
    task_data.validate()?;

    let task = tasks::create(&pool, user.id(), task_data).await?;
    Ok(respond(StatusCode::CREATED, task, "Task created successfully"))
}

/// Deletes several of the caller's tasks at once.
///
/// Ids that do not exist or belong to somebody else are skipped, so the count may be 0.
///
/// ## Responses:
/// - `200 OK`: `{ deletedCount }`.
/// - `400 Bad Request`: `ids` missing or empty.
#[post("/delete/batch")]
pub async fn delete_tasks_batch(
    pool: web::Data<PgPool>,
    body: web::Json<BatchDeleteRequest>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let ids = body.into_inner().into_ids()?;
    let deleted_count = tasks::delete_batch(&pool, user.id(), &ids).await?;
    Ok(respond(
        StatusCode::OK,
        BatchDeleteResult { deleted_count },
        "Tasks deleted successfully",
    ))
}

/// Retrieves one of the caller's tasks.
///
/// ## Responses:
/// - `200 OK`: The task.
/// - `404 Not Found`: No such task, or it belongs to another user.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let task = tasks::get_by_id(&pool, user.id(), task_id.into_inner()).await?;
    Ok(respond(StatusCode::OK, task, "Task retrieved successfully"))
}

/// Updates one of the caller's tasks. Omitted fields keep their current value.
///
/// ## Responses:
/// - `200 OK`: The updated task.
/// - `400 Bad Request`: Invalid payload.
/// - `404 Not Found`: No such task, or it belongs to another user.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<UpdateTaskInput>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let task_data = task_data.into_inner().trimmed();
    task_data.validate()?;

    let task = tasks::update(&pool, user.id(), task_id.into_inner(), task_data).await?;
    Ok(respond(StatusCode::OK, task, "Task updated successfully"))
}

/// Deletes one of the caller's tasks.
///
/// ## Responses:
/// - `200 OK`: Deleted.
/// - `404 Not Found`: No such task, or it belongs to another user.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    tasks::delete(&pool, user.id(), task_id.into_inner()).await?;
    Ok(respond_empty(StatusCode::OK, "Task deleted successfully"))
}
