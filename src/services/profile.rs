//! User profiles and the user directory. Only safe projections leave this module.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{is_unique_violation, AppError};
use crate::models::user::PUBLIC_USER_COLUMNS;
use crate::models::{ProfileUpdate, PublicUser, UserListQuery};
use crate::pagination::PageParams;
use crate::query::{ListQuery, SortOrder};

fn not_found() -> AppError {
    AppError::NotFound("User not found".into())
}

pub async fn get_by_id(pool: &PgPool, user_id: Uuid) -> Result<PublicUser, AppError> {
    sqlx::query_as::<_, PublicUser>(&format!(
        "SELECT {PUBLIC_USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(not_found)
}

/// Merges the supplied profile keys into the stored document and, when given, replaces
/// the email. Keys that are not supplied are left alone.
pub async fn update(
    pool: &PgPool,
    user_id: Uuid,
    update: ProfileUpdate,
) -> Result<PublicUser, AppError> {
    let patch = update
        .profile_patch()
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| AppError::InternalServerError(format!("Failed to encode profile: {}", e)))?;

    let result = sqlx::query_as::<_, PublicUser>(&format!(
        "UPDATE users
         SET profile = COALESCE(profile, '{{}}'::jsonb) || COALESCE($1::jsonb, '{{}}'::jsonb),
             email = COALESCE($2, email),
             updated_at = NOW()
         WHERE id = $3
         RETURNING {PUBLIC_USER_COLUMNS}"
    ))
    .bind(patch)
    .bind(update.normalized_email())
    .bind(user_id)
    .fetch_optional(pool)
    .await;

    match result {
        Ok(Some(user)) => {
            log::info!("profile updated for user {}", user_id);
            Ok(user)
        }
        Ok(None) => Err(not_found()),
        Err(e) if is_unique_violation(&e) => {
            Err(AppError::ValidationError("Email is already in use".into()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Directory of users, searchable by email.
pub async fn list(
    pool: &PgPool,
    params: &UserListQuery,
    page: &PageParams,
) -> Result<(Vec<PublicUser>, i64), AppError> {
    let query = ListQuery::new("users", PUBLIC_USER_COLUMNS)
        .search(params.search.as_deref(), &["email"])
        .sort(SortOrder::from_param(params.sort.as_deref()));

    let mut select = query.select_page(page);
    let mut count = query.count();
    let (users, total) = tokio::try_join!(
        select.build_query_as::<PublicUser>().fetch_all(pool),
        count.build_query_scalar::<i64>().fetch_one(pool),
    )?;
    Ok((users, total))
}
