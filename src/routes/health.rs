use actix_web::{get, http::StatusCode, HttpResponse};
use chrono::Utc;
use serde_json::json;

use crate::response::respond;

/// Liveness check. Does not touch the database.
#[get("/health")]
pub async fn health() -> HttpResponse {
    respond(
        StatusCode::OK,
        json!({
            "status": "ok",
            "timestamp": Utc::now()
        }),
        "Service is healthy",
    )
}
