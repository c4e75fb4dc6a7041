//!
//! # Validation Gate
//!
//! Request bodies are declared as `validator::Validate` structs. When a payload fails,
//! every violation is collected into one comma-separated message and the request is
//! rejected with HTTP 400.
//!
//! Extraction failures that happen before validation (malformed JSON, missing fields,
//! unparseable path ids) are routed through the same envelope by the extractor
//! configs returned from this module.

use actix_web::{
    error::{JsonPayloadError, PathError, QueryPayloadError},
    web, HttpRequest,
};
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::error::AppError;

/// Flattens `errors` into a single human-readable message.
///
/// Fields are visited in name order so the message is stable across runs. Nested
/// structs are prefixed with their parent field (`profile.name`).
pub fn describe(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect(None, errors, &mut messages);
    messages.join(", ")
}

fn collect(prefix: Option<&str>, errors: &ValidationErrors, out: &mut Vec<String>) {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by_key(|(name, _)| *name);

    for (field, kind) in fields {
        let path = match prefix {
            Some(parent) => format!("{}.{}", parent, field),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", path));
                    out.push(message);
                }
            }
            ValidationErrorsKind::Struct(nested) => collect(Some(&path), nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(Some(&format!("{}[{}]", path, index)), nested, out);
                }
            }
        }
    }
}

/// Strips serde's trailing "at line X column Y" from a deserialization message.
fn serde_message(error: &serde_json::Error) -> String {
    let text = error.to_string();
    match text.find(" at line ") {
        Some(idx) => text[..idx].to_string(),
        None => text,
    }
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::Deserialize(e) if e.is_data() => serde_message(e),
        JsonPayloadError::ContentType => "Content type must be application/json".to_string(),
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            "Request body is too large".to_string()
        }
        _ => "Invalid JSON format".to_string(),
    };
    AppError::ValidationError(message).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        QueryPayloadError::Deserialize(e) => format!("Invalid query parameters: {}", e),
        _ => "Invalid query parameters".to_string(),
    };
    AppError::ValidationError(message).into()
}

fn path_error(_err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::ValidationError("Invalid id".into()).into()
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error)
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_error)
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(path_error)
}
