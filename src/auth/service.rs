//! Registration, login and the refresh-token session lifecycle.
//!
//! Each user has at most one live refresh token, stored in
//! `users.current_refresh_token`. Login replaces it, every successful refresh rotates
//! it, and logout clears it. A refresh token is honoured only while it is both
//! cryptographically valid and identical to the stored one.

use actix_web::web;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_against_dummy, verify_password};
use crate::auth::token::JwtKeys;
use crate::auth::{normalize_email, LoginRequest, RegisterRequest};
use crate::error::{is_unique_violation, AppError};
use crate::models::user::UserCredentials;
use crate::models::PublicUser;

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const SESSION_INVALIDATED: &str = "Session invalidated";

#[derive(Debug)]
pub struct LoginOutcome {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

#[derive(Debug)]
pub struct RefreshOutcome {
    pub access_token: String,
    /// Replaces the presented token, which is no longer accepted.
    pub refresh_token: String,
}

pub async fn register(pool: &PgPool, request: RegisterRequest) -> Result<Uuid, AppError> {
    let email = normalize_email(&request.email);
    let password = request.password;
    let password_hash = web::block(move || hash_password(&password)).await??;
    let profile = json!({ "name": request.name, "avatar": null });

    let inserted = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (email, password_hash, profile) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(&email)
    .bind(password_hash)
    .bind(profile)
    .fetch_one(pool)
    .await;

    match inserted {
        Ok(id) => {
            log::info!("registered user {}", id);
            Ok(id)
        }
        Err(e) if is_unique_violation(&e) => Err(AppError::ValidationError(
            "Email is already registered".into(),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Checks the credentials and opens a new session, replacing any previous one.
///
/// Unknown emails and wrong passwords fail identically, and both run one bcrypt
/// verification.
pub async fn login(
    pool: &PgPool,
    keys: &JwtKeys,
    request: LoginRequest,
) -> Result<LoginOutcome, AppError> {
    let email = normalize_email(&request.email);
    let user = sqlx::query_as::<_, UserCredentials>(
        "SELECT id, email, password_hash, profile, created_at, updated_at
         FROM users WHERE email = $1",
    )
    .bind(&email)
    .fetch_optional(pool)
    .await?;

    let password = request.password;
    let user = match user {
        Some(user) => {
            let stored_hash = user.password_hash.clone();
            let matches = web::block(move || verify_password(&password, &stored_hash)).await??;
            matches.then_some(user)
        }
        None => {
            web::block(move || verify_against_dummy(&password)).await?;
            None
        }
    };
    let user = user.ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.into()))?;

    let access_token = keys.generate_access_token(user.id)?;
    let refresh_token = keys.generate_refresh_token(user.id)?;

    sqlx::query("UPDATE users SET current_refresh_token = $1 WHERE id = $2")
        .bind(&refresh_token)
        .bind(user.id)
        .execute(pool)
        .await?;

    log::info!("user {} logged in", user.id);
    Ok(LoginOutcome {
        access_token,
        refresh_token,
        user: user.into(),
    })
}

/// Exchanges the presented refresh token for a new access token and a new refresh token.
pub async fn refresh(
    pool: &PgPool,
    keys: &JwtKeys,
    presented: Option<&str>,
) -> Result<RefreshOutcome, AppError> {
    let presented = presented
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("No refresh token provided".into()))?;

    let claims = keys.verify_refresh_token(presented).map_err(|e| {
        log::warn!("refresh rejected: {}", e);
        e
    })?;

    let stored = sqlx::query_scalar::<_, Option<String>>(
        "SELECT current_refresh_token FROM users WHERE id = $1",
    )
    .bind(claims.sub)
    .fetch_optional(pool)
    .await?
    .flatten();

    if stored.as_deref() != Some(presented) {
        log::warn!("refresh rejected for user {}: token is not current", claims.sub);
        return Err(AppError::Forbidden(SESSION_INVALIDATED.into()));
    }

    let access_token = keys.generate_access_token(claims.sub)?;
    let refresh_token = keys.generate_refresh_token(claims.sub)?;

    // Only swap if nobody rotated or cleared the token since it was read.
    let rotated = sqlx::query(
        "UPDATE users SET current_refresh_token = $1
         WHERE id = $2 AND current_refresh_token = $3",
    )
    .bind(&refresh_token)
    .bind(claims.sub)
    .bind(presented)
    .execute(pool)
    .await?;

    if rotated.rows_affected() == 0 {
        log::warn!("refresh raced with another session change for user {}", claims.sub);
        return Err(AppError::Forbidden(SESSION_INVALIDATED.into()));
    }

    log::debug!("rotated refresh token for user {}", claims.sub);
    Ok(RefreshOutcome {
        access_token,
        refresh_token,
    })
}

/// Ends the user's session. Succeeds whether or not a session existed.
pub async fn logout(pool: &PgPool, user_id: Uuid) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET current_refresh_token = NULL WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    log::info!("user {} logged out", user_id);
    Ok(())
}
