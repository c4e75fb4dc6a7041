//! Per-user file storage under the upload directory.
//!
//! Uploads land in `<root>/<user id>/<file name>` and are published as
//! `/uploads/<user id>/<file name>`. A caller can only ever reach their own directory.

use lazy_static::lazy_static;
use regex::Regex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;

/// URL prefix the upload directory is served under.
pub const PUBLIC_PREFIX: &str = "/uploads";
const MAX_FILENAME_LEN: usize = 255;

lazy_static! {
    static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9._-]+").unwrap();
    static ref DOT_RUNS: Regex = Regex::new(r"\.{2,}").unwrap();
}

/// Size and media-type limits applied to every uploaded file.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    /// Per-file limit.
    pub max_bytes: usize,
    /// Files accepted in one upload. Bounds the request to `max_files * max_bytes` in memory.
    pub max_files: usize,
    /// Allowed top-level MIME types, e.g. `image`.
    pub allowed_types: Vec<String>,
}

impl UploadPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_bytes: config.upload_max_bytes,
            max_files: config.upload_max_files,
            allowed_types: config.upload_allowed_types.clone(),
        }
    }

    fn allows_type(&self, content_type: Option<&str>) -> bool {
        let top_level = content_type
            .and_then(|ct| ct.split('/').next())
            .map(str::trim)
            .unwrap_or_default();
        self.allowed_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(top_level))
    }

    pub fn check(&self, file: &IncomingFile) -> Result<(), AppError> {
        if file.data.len() > self.max_bytes {
            return Err(self.too_large(&file.filename));
        }
        if !self.allows_type(file.content_type.as_deref()) {
            return Err(AppError::ValidationError(format!(
                "File type {} is not allowed for {}",
                file.content_type.as_deref().unwrap_or("unknown"),
                file.filename
            )));
        }
        Ok(())
    }

    pub fn too_many(&self) -> AppError {
        AppError::ValidationError(format!(
            "At most {} files can be uploaded at once",
            self.max_files
        ))
    }

    pub fn too_large(&self, filename: &str) -> AppError {
        AppError::ValidationError(format!(
            "File {} exceeds the maximum size of {} bytes",
            filename, self.max_bytes
        ))
    }
}

/// A file fully read from the request, not yet written anywhere.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Reduces a client-supplied name to a single safe path component.
///
/// Directory parts are dropped and anything outside `[A-Za-z0-9._-]` becomes `_`.
/// Runs of dots collapse to one, so a stored name never contains `..`.
/// Returns `None` when nothing usable is left.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let normalized = name.replace('\\', "/");
    let base = Path::new(&normalized).file_name()?.to_str()?;

    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(base, "_");
    let cleaned = DOT_RUNS.replace_all(&cleaned, ".");
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_') {
        return None;
    }
    Some(cleaned.chars().take(MAX_FILENAME_LEN).collect())
}

/// A name is addressable only if it is exactly what an upload would have stored.
fn is_plain_filename(name: &str) -> bool {
    sanitize_filename(name).as_deref() == Some(name)
}

#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
    policy: UploadPolicy,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>, policy: UploadPolicy) -> Self {
        Self {
            root: root.into(),
            policy,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.upload_dir.clone(), UploadPolicy::from_config(config))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    fn user_dir(&self, user_id: Uuid) -> PathBuf {
        self.root.join(user_id.to_string())
    }

    /// Checks every file, then writes them all. Nothing is written if any file fails.
    pub async fn save_all(
        &self,
        user_id: Uuid,
        files: Vec<IncomingFile>,
    ) -> Result<Vec<String>, AppError> {
        if files.is_empty() {
            return Err(AppError::ValidationError("No files uploaded".into()));
        }
        if files.len() > self.policy.max_files {
            return Err(self.policy.too_many());
        }

        let mut accepted = Vec::with_capacity(files.len());
        for file in files {
            self.policy.check(&file)?;
            let name = sanitize_filename(&file.filename).ok_or_else(|| {
                AppError::ValidationError(format!("Invalid file name: {}", file.filename))
            })?;
            accepted.push((name, file.data));
        }

        let dir = self.user_dir(user_id);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::InternalServerError(format!(
                "Failed to create upload directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let mut paths = Vec::with_capacity(accepted.len());
        for (name, data) in accepted {
            let target = dir.join(&name);
            tokio::fs::write(&target, &data).await.map_err(|e| {
                AppError::InternalServerError(format!(
                    "Failed to write {}: {}",
                    target.display(),
                    e
                ))
            })?;
            paths.push(format!("{}/{}/{}", PUBLIC_PREFIX, user_id, name));
        }

        log::info!("user {} uploaded {} file(s)", user_id, paths.len());
        Ok(paths)
    }

    /// Removes one of the caller's own files.
    pub async fn delete(&self, user_id: Uuid, filename: &str) -> Result<(), AppError> {
        if !is_plain_filename(filename) {
            return Err(AppError::ValidationError("Invalid file name".into()));
        }

        let target = self.user_dir(user_id).join(filename);
        match tokio::fs::remove_file(&target).await {
            Ok(()) => {
                log::info!("user {} deleted file {}", user_id, filename);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(AppError::NotFound("File not found".into()))
            }
            Err(e) => Err(AppError::InternalServerError(format!(
                "Failed to delete {}: {}",
                target.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn storage() -> FileStorage {
        let root = std::env::temp_dir().join(format!("taskmart-files-{}", Uuid::new_v4()));
        FileStorage::new(
            root,
            UploadPolicy {
                max_bytes: 16,
                max_files: 3,
                allowed_types: vec!["image".into(), "video".into()],
            },
        )
    }

    fn file(name: &str, content_type: &str, len: usize) -> IncomingFile {
        IncomingFile {
            filename: name.into(),
            content_type: Some(content_type.into()),
            data: vec![7u8; len],
        }
    }

    #[test_log::test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("photo.png").as_deref(), Some("photo.png"));
        assert_eq!(
            sanitize_filename("../../etc/passwd").as_deref(),
            Some("passwd")
        );
        assert_eq!(
            sanitize_filename("C:\\Users\\me\\cat pic.jpg").as_deref(),
            Some("cat_pic.jpg")
        );
        assert_eq!(sanitize_filename(".hidden").as_deref(), Some("hidden"));
        assert_eq!(
            sanitize_filename("my..photo.png").as_deref(),
            Some("my.photo.png")
        );
        assert_eq!(sanitize_filename("a...b").as_deref(), Some("a.b"));
        assert_eq!(sanitize_filename(".."), None);
        assert_eq!(sanitize_filename(""), None);
    }

    #[test]
    fn test_policy_checks_size_and_type() {
        let storage = storage();
        let policy = storage.policy();
        assert!(policy.check(&file("a.png", "image/png", 16)).is_ok());
        assert!(policy.check(&file("a.mp4", "video/mp4", 1)).is_ok());
        assert!(policy.check(&file("a.png", "image/png", 17)).is_err());
        assert!(policy.check(&file("a.pdf", "application/pdf", 1)).is_err());

        let untyped = IncomingFile {
            content_type: None,
            ..file("a.bin", "", 1)
        };
        assert!(policy.check(&untyped).is_err());
    }

    #[actix_rt::test]
    async fn test_save_and_delete() {
        let storage = storage();
        let user = Uuid::new_v4();

        let paths = storage
            .save_all(user, vec![file("cat.png", "image/png", 4)])
            .await
            .unwrap();
        assert_eq!(paths, vec![format!("/uploads/{}/cat.png", user)]);
        assert!(storage.root().join(user.to_string()).join("cat.png").exists());

        // Another user cannot reach it.
        let err = storage.delete(Uuid::new_v4(), "cat.png").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        storage.delete(user, "cat.png").await.unwrap();
        let err = storage.delete(user, "cat.png").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let _ = std::fs::remove_dir_all(storage.root());
    }

    #[actix_rt::test]
    async fn test_one_bad_file_blocks_the_whole_upload() {
        let storage = storage();
        let user = Uuid::new_v4();

        let err = storage
            .save_all(
                user,
                vec![
                    file("ok.png", "image/png", 4),
                    file("big.png", "image/png", 64),
                ],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(!storage.root().join(user.to_string()).exists());
    }

    #[actix_rt::test]
    async fn test_empty_upload_and_traversal_are_rejected() {
        let storage = storage();
        let user = Uuid::new_v4();

        assert!(matches!(
            storage.save_all(user, Vec::new()).await,
            Err(AppError::ValidationError(_))
        ));
        for name in ["../secret", "a/b.png", "..", "", "..%2Fsecret", "a..b.png"] {
            assert!(
                matches!(
                    storage.delete(user, name).await,
                    Err(AppError::ValidationError(_))
                ),
                "{} should be rejected",
                name
            );
        }
    }

    #[actix_rt::test]
    async fn test_dotted_name_round_trips() {
        let storage = storage();
        let user = Uuid::new_v4();

        let paths = storage
            .save_all(user, vec![file("my..photo.png", "image/png", 4)])
            .await
            .unwrap();
        assert_eq!(paths, vec![format!("/uploads/{}/my.photo.png", user)]);

        storage.delete(user, "my.photo.png").await.unwrap();
        assert!(!storage.root().join(user.to_string()).join("my.photo.png").exists());

        let _ = std::fs::remove_dir_all(storage.root());
    }

    #[actix_rt::test]
    async fn test_file_count_is_capped() {
        let storage = storage();
        let user = Uuid::new_v4();

        let files = (0..4)
            .map(|i| file(&format!("{}.png", i), "image/png", 1))
            .collect();
        let err = storage.save_all(user, files).await.unwrap_err();
        assert_eq!(err.to_string(), "At most 3 files can be uploaded at once");
        assert!(!storage.root().join(user.to_string()).exists());
    }
}
