//! `/profile/{id}` addresses the caller's own profile; `/users` is the user directory.

use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{ProfileUpdate, UserListQuery},
    response::{respond, respond_paginated},
    services::profile,
};
use actix_web::{get, http::StatusCode, put, web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Only the caller's own id is addressable. Anything else looks like a missing user.
fn own_id(user: AuthenticatedUser, id: Uuid) -> Result<Uuid, AppError> {
    if user.id() == id {
        Ok(id)
    } else {
        Err(AppError::NotFound("User not found".into()))
    }
}

#[get("/{id}")]
pub async fn get_profile(
    pool: web::Data<PgPool>,
    id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let id = own_id(user, id.into_inner())?;
    let profile = profile::get_by_id(&pool, id).await?;
    Ok(respond(StatusCode::OK, profile, "Profile retrieved successfully"))
}

/// Merges the given profile keys into the stored profile and optionally changes the email.
///
/// ## Request Body:
/// - `email` (optional)
/// - `name` (optional): Shorthand for `profile.name`.
/// - `profile` (optional): Keys to overwrite, e.g. `{ "avatar": "/uploads/..." }`;
///   `"avatar": null` clears the avatar.
#[put("/{id}")]
pub async fn update_profile(
    pool: web::Data<PgPool>,
    id: web::Path<Uuid>,
    update: web::Json<ProfileUpdate>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let update = update.into_inner().trimmed();
    update.validate()?;

    let id = own_id(user, id.into_inner())?;
    let profile = profile::update(&pool, id, update).await?;
    Ok(respond(StatusCode::OK, profile, "Profile updated successfully"))
}

/// Lists users, newest first, optionally filtered by email.
#[get("")]
pub async fn get_users(
    pool: web::Data<PgPool>,
    query: web::Query<UserListQuery>,
    _user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let page = query.page_params();
    let (items, total) = profile::list(&pool, &query, &page).await?;
    Ok(respond_paginated(items, total, &page, "Users retrieved successfully"))
}

#[get("/{id}")]
pub async fn get_user(
    pool: web::Data<PgPool>,
    id: web::Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user = profile::get_by_id(&pool, id.into_inner()).await?;
    Ok(respond(StatusCode::OK, user, "User retrieved successfully"))
}

/// Updates the caller's own account.
#[put("")]
pub async fn update_current_user(
    pool: web::Data<PgPool>,
    update: web::Json<ProfileUpdate>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let update = update.into_inner().trimmed();
    update.validate()?;

    let updated = profile::update(&pool, user.id(), update).await?;
    Ok(respond(StatusCode::OK, updated, "User updated successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_own_profile_is_addressable() {
        let me = Uuid::new_v4();
        assert_eq!(own_id(AuthenticatedUser(me), me).unwrap(), me);
        assert!(matches!(
            own_id(AuthenticatedUser(me), Uuid::new_v4()),
            Err(AppError::NotFound(_))
        ));
    }
}
