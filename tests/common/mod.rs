#![allow(dead_code)]

use actix_web::{body::MessageBody, dev::ServiceResponse, http::StatusCode, test};
use chrono::Duration;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::PathBuf;
use taskmart::auth::cookie::REFRESH_COOKIE;
use taskmart::auth::JwtKeys;
use taskmart::config::Config;
use taskmart::services::{FileStorage, UploadPolicy};
use uuid::Uuid;

pub const ACCESS_SECRET: &str = "integration-access-secret";
pub const REFRESH_SECRET: &str = "integration-refresh-secret";
pub const UPLOAD_LIMIT: usize = 1024;
pub const UPLOAD_MAX_FILES: usize = 3;

pub fn test_config(database_url: &str) -> Config {
    let database_url = database_url.to_string();
    Config::from_lookup(move |key| match key {
        "DATABASE_URL" => Some(database_url.clone()),
        "JWT_SECRET" => Some(ACCESS_SECRET.into()),
        "JWT_REFRESH_SECRET" => Some(REFRESH_SECRET.into()),
        _ => None,
    })
    .expect("test configuration should be valid")
}

pub fn test_keys() -> JwtKeys {
    JwtKeys::new(
        ACCESS_SECRET,
        REFRESH_SECRET,
        Duration::minutes(15),
        Duration::days(7),
    )
}

pub fn temp_upload_dir() -> PathBuf {
    std::env::temp_dir().join(format!("taskmart-it-{}", Uuid::new_v4()))
}

pub fn test_storage(root: PathBuf) -> FileStorage {
    FileStorage::new(
        root,
        UploadPolicy {
            max_bytes: UPLOAD_LIMIT,
            max_files: UPLOAD_MAX_FILES,
            allowed_types: vec!["image".into(), "video".into()],
        },
    )
}

/// Connects to `DATABASE_URL` and applies the migrations, or returns `None` when the
/// variable is unset so database-backed tests can skip themselves.
pub async fn db_pool() -> Option<PgPool> {
    dotenv::dotenv().ok();
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set; skipping database-backed test");
            return None;
        }
    };
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    Some(pool)
}

/// A pool that never connects, for tests that are answered before any query runs.
pub fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .connect_lazy("postgres://localhost/taskmart_unused")
        .expect("lazy pool should build")
}

/// Builds the full application around `$pool` and `$storage`.
macro_rules! test_app {
    ($pool:expr, $storage:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($pool.clone()))
                .app_data(actix_web::web::Data::new(common::test_keys()))
                .app_data(actix_web::web::Data::new(common::test_config(
                    "postgres://localhost/taskmart_unused",
                )))
                .app_data(actix_web::web::Data::new($storage))
                .wrap(actix_web::middleware::Logger::default())
                .configure(taskmart::routes::config)
                .default_service(actix_web::web::to(taskmart::routes::not_found)),
        )
        .await
    };
}
pub(crate) use test_app;

pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4().simple())
}

pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl TestUser {
    pub fn bearer(&self) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.access_token))
    }
}

pub fn refresh_cookie_value<B>(resp: &ServiceResponse<B>) -> Option<String> {
    resp.response()
        .cookies()
        .find(|c| c.name() == REFRESH_COOKIE)
        .map(|c| c.value().to_string())
}

/// Reads the body, asserting the status first so failures show the envelope.
pub async fn read_json<B: MessageBody>(resp: ServiceResponse<B>, expected: StatusCode) -> Value {
    let status = resp.status();
    let bytes = test::read_body(resp).await;
    assert_eq!(
        status,
        expected,
        "Unexpected status. Body: {:?}",
        String::from_utf8_lossy(&bytes)
    );
    serde_json::from_slice(&bytes).expect("response should be JSON")
}

pub async fn register_and_login_user(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> Result<TestUser, String> {
    let req_register = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "email": email,
            "password": password,
            "name": "Integration User"
        }))
        .to_request();
    let resp_register = test::call_service(app, req_register).await;
    if resp_register.status() != StatusCode::CREATED {
        let status = resp_register.status();
        let body = test::read_body(resp_register).await;
        return Err(format!(
            "Failed to register user. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }

    let req_login = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp_login = test::call_service(app, req_login).await;
    let status = resp_login.status();
    let refresh_token = refresh_cookie_value(&resp_login);
    let body = test::read_body(resp_login).await;
    if status != StatusCode::OK {
        return Err(format!(
            "Failed to log in. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }

    let json: Value = serde_json::from_slice(&body)
        .map_err(|e| format!("Failed to parse login response: {}", e))?;
    let id = json["data"]["user"]["id"]
        .as_str()
        .and_then(|id| Uuid::parse_str(id).ok())
        .ok_or("login response has no user id")?;
    let access_token = json["data"]["accessToken"]
        .as_str()
        .ok_or("login response has no access token")?
        .to_string();

    Ok(TestUser {
        id,
        email: email.to_string(),
        access_token,
        refresh_token: refresh_token.ok_or("login did not set the refresh cookie")?,
    })
}

pub async fn cleanup_user(pool: &PgPool, email: &str) {
    let _ = sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await;
}
