use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    response::{respond, respond_empty},
    services::{FileStorage, IncomingFile},
};
use actix_multipart::{Field, Multipart};
use actix_web::{delete, http::StatusCode, post, web, HttpResponse};
use futures::TryStreamExt;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub paths: Vec<String>,
}

/// Reads one field into memory, giving up as soon as it grows past `max_bytes`.
async fn read_field(
    field: &mut Field,
    filename: &str,
    storage: &FileStorage,
) -> Result<Vec<u8>, AppError> {
    let max_bytes = storage.policy().max_bytes;
    let mut data = Vec::new();
    while let Some(chunk) = field.try_next().await? {
        if data.len() + chunk.len() > max_bytes {
            return Err(storage.policy().too_large(filename));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

/// Upload files
///
/// Accepts `multipart/form-data`; every part that carries a non-empty filename is
/// treated as a file. All files are checked before any is written.
///
/// ## Responses:
/// - `201 Created`: `{ paths }`, one `/uploads/<user id>/<name>` per file.
/// - `400 Bad Request`: No files, too many files, a file over the size limit, or a
///   disallowed type.
#[post("/upload")]
pub async fn upload_files(
    storage: web::Data<FileStorage>,
    mut payload: Multipart,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let mut files = Vec::new();

    while let Some(mut field) = payload.try_next().await? {
        // Parts without a file, including `filename=""` from an empty file input.
        let filename = match field.content_disposition().get_filename() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        if files.len() >= storage.policy().max_files {
            return Err(storage.policy().too_many());
        }
        let content_type = field.content_type().map(|mime| mime.essence_str().to_string());
        let data = read_field(&mut field, &filename, &storage).await?;

        files.push(IncomingFile {
            filename,
            content_type,
            data,
        });
    }

    let paths = storage.save_all(user.id(), files).await?;
    Ok(respond(
        StatusCode::CREATED,
        UploadResponse { paths },
        "Files uploaded successfully",
    ))
}

/// Delete one of the caller's files
///
/// ## Responses:
/// - `200 OK`: Deleted.
/// - `400 Bad Request`: The name is not one an upload could have stored (separators, `..`).
/// - `404 Not Found`: The caller has no file by that name.
#[delete("/delete/{filename}")]
pub async fn delete_file(
    storage: web::Data<FileStorage>,
    filename: web::Path<String>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    storage.delete(user.id(), &filename).await?;
    Ok(respond_empty(StatusCode::OK, "File deleted successfully"))
}
