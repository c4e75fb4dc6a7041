use crate::{
    auth::{
        cookie::{refresh_cookie, removal_cookie, REFRESH_COOKIE},
        normalize_email, service, AuthResponse, JwtKeys, LoginRequest, RefreshResponse,
        RegisterRequest, RegisterResponse,
    },
    config::{Config, Environment},
    error::AppError,
    response::{respond, respond_empty},
};
use actix_web::{
    cookie::Cookie, http::StatusCode, post, web, HttpRequest, HttpResponse, ResponseError,
};
use sqlx::PgPool;
use validator::Validate;

fn with_cookie(mut response: HttpResponse, cookie: &Cookie<'_>) -> Result<HttpResponse, AppError> {
    response
        .add_cookie(cookie)
        .map_err(|e| AppError::InternalServerError(format!("Failed to set cookie: {}", e)))?;
    Ok(response)
}

/// Renders `error` and tells the browser to drop its refresh cookie.
fn reject_clearing_cookie(
    error: AppError,
    environment: Environment,
) -> Result<HttpResponse, AppError> {
    with_cookie(error.error_response(), &removal_cookie(environment))
}

/// Register a new user
///
/// ## Responses:
/// - `201 Created`: `{ id }` of the new account.
/// - `400 Bad Request`: Invalid payload or the email is already registered.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    register_data: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let register_data = register_data.into_inner().normalized();
    register_data.validate()?;

    let id = service::register(&pool, register_data).await?;
    Ok(respond(
        StatusCode::CREATED,
        RegisterResponse { id },
        "User registered successfully",
    ))
}

/// Login user
///
/// Returns the access token and the user in the body and sets the refresh token cookie.
/// A failed login also clears any refresh cookie the client still holds.
///
/// ## Responses:
/// - `200 OK`: `{ accessToken, user }`.
/// - `400 Bad Request`: Invalid payload.
/// - `401 Unauthorized`: Unknown email or wrong password.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    keys: web::Data<JwtKeys>,
    config: web::Data<Config>,
    login_data: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let mut login_data = login_data.into_inner();
    login_data.email = normalize_email(&login_data.email);
    login_data.validate()?;

    match service::login(&pool, &keys, login_data).await {
        Ok(outcome) => {
            let cookie = refresh_cookie(
                outcome.refresh_token,
                config.environment,
                keys.refresh_ttl(),
            );
            let body = AuthResponse {
                access_token: outcome.access_token,
                user: outcome.user,
            };
            with_cookie(respond(StatusCode::OK, body, "Login successful"), &cookie)
        }
        Err(e @ AppError::Unauthorized(_)) => reject_clearing_cookie(e, config.environment),
        Err(e) => Err(e),
    }
}

/// Exchange the refresh cookie for a new access token
///
/// The refresh token is rotated: the response carries a new cookie and the presented
/// token stops working.
///
/// ## Responses:
/// - `200 OK`: `{ accessToken }`.
/// - `401 Unauthorized`: No refresh cookie.
/// - `403 Forbidden`: Invalid, expired or superseded refresh token. The cookie is cleared.
#[post("/refresh")]
pub async fn refresh(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    keys: web::Data<JwtKeys>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let presented = req.cookie(REFRESH_COOKIE);
    let presented = presented.as_ref().map(|c| c.value());

    match service::refresh(&pool, &keys, presented).await {
        Ok(outcome) => {
            let cookie = refresh_cookie(
                outcome.refresh_token,
                config.environment,
                keys.refresh_ttl(),
            );
            let body = RefreshResponse {
                access_token: outcome.access_token,
            };
            with_cookie(
                respond(StatusCode::OK, body, "Token refreshed successfully"),
                &cookie,
            )
        }
        Err(e @ AppError::Forbidden(_)) => reject_clearing_cookie(e, config.environment),
        Err(e) => Err(e),
    }
}

/// Logout user
///
/// Ends the session named by the refresh cookie, if it can be identified, and always
/// clears the cookie.
#[post("/logout")]
pub async fn logout(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    keys: web::Data<JwtKeys>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let owner = req
        .cookie(REFRESH_COOKIE)
        .and_then(|cookie| keys.refresh_token_subject(cookie.value()));

    if let Some(user_id) = owner {
        service::logout(&pool, user_id).await?;
    }

    with_cookie(
        respond_empty(StatusCode::OK, "Logged out successfully"),
        &removal_cookie(config.environment),
    )
}
