//!
//! # Response Envelope
//!
//! Every endpoint, successful or not, answers with the same JSON shape:
//!
//! ```json
//! { "success": true, "code": 200, "message": "...", "data": { ... } }
//! ```
//!
//! List endpoints nest their rows one level deeper, next to the pagination block:
//! `data = { "items": [...], "pagination": { ... } }`.

use actix_web::{http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::pagination::PageParams;

/// The uniform response wrapper returned by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// `true` for any 2xx code.
    pub success: bool,
    /// Mirrors the HTTP status code.
    pub code: u16,
    /// Human-readable outcome, also used for error messages.
    pub message: String,
    /// Payload, `null` for errors and payload-less successes.
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn new(status: StatusCode, data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            success: status.is_success(),
            code: status.as_u16(),
            message: message.into(),
            data,
        }
    }
}

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total_items: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub limit: i64,
}

impl Pagination {
    /// `total_pages` is `ceil(total_items / limit)`; `current_page` always echoes the
    /// requested page, including when there are no items at all.
    pub fn new(total_items: i64, page: i64, limit: i64) -> Self {
        let limit = limit.max(1);
        let total_items = total_items.max(0);
        Self {
            total_items,
            total_pages: (total_items + limit - 1) / limit,
            current_page: page,
            limit,
        }
    }
}

/// `data` block of a paginated response.
#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Builds an envelope response carrying `data`.
pub fn respond<T: Serialize>(status: StatusCode, data: T, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(ApiResponse::new(status, Some(data), message))
}

/// Builds an envelope response with `data: null`.
pub fn respond_empty(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(ApiResponse::<()>::new(status, None, message))
}

/// Builds a 200 envelope around one page of results.
pub fn respond_paginated<T: Serialize>(
    items: Vec<T>,
    total_items: i64,
    page: &PageParams,
    message: &str,
) -> HttpResponse {
    let data = Paginated {
        items,
        pagination: Pagination::new(total_items, page.page, page.limit),
    };
    respond(StatusCode::OK, data, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(Pagination::new(11, 1, 5).total_pages, 3);
        assert_eq!(Pagination::new(10, 1, 5).total_pages, 2);
        assert_eq!(Pagination::new(1, 1, 100).total_pages, 1);
    }

    #[test]
    fn test_empty_result_keeps_requested_page() {
        let pagination = Pagination::new(0, 4, 10);
        assert_eq!(
            pagination,
            Pagination {
                total_items: 0,
                total_pages: 0,
                current_page: 4,
                limit: 10,
            }
        );
    }

    #[actix_rt::test]
    async fn test_paginated_envelope_shape() {
        let page = PageParams::sanitize(Some("2"), Some("2"));
        let response = respond_paginated(vec!["a", "b"], 5, &page, "Things retrieved");
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "code": 200,
                "message": "Things retrieved",
                "data": {
                    "items": ["a", "b"],
                    "pagination": {
                        "total_items": 5,
                        "total_pages": 3,
                        "current_page": 2,
                        "limit": 2
                    }
                }
            })
        );
    }

    #[actix_rt::test]
    async fn test_error_status_marks_envelope_unsuccessful() {
        let response = respond_empty(StatusCode::NOT_FOUND, "Task not found");
        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], 404);
        assert_eq!(json["data"], serde_json::Value::Null);
    }
}
