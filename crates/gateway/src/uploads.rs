//! Assessment image storage
//!
//! Files land in the configured uploads directory as `<millis>_<name>` and
//! are served back by `ServeDir` under the public prefix.

use classdesk_common::config::UploadConfig;
use classdesk_common::errors::AppError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Only image uploads are allowed (got {content_type})")]
    NotAnImage { content_type: String },

    #[error("At most {limit} images can be uploaded")]
    TooManyFiles { limit: usize },

    #[error("{name} is {size} bytes, the limit is {limit}")]
    TooLarge { name: String, size: usize, limit: usize },

    #[error("Failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::TooLarge { name, size, limit } => {
                tracing::warn!(file = %name, size, limit, "Rejected oversized upload");
                AppError::PayloadTooLarge { limit }
            }
            UploadError::Io(e) => AppError::Internal { message: e.to_string() },
            other => AppError::Validation {
                message: other.to_string(),
                field: Some("images".to_string()),
            },
        }
    }
}

/// Owner of the uploads directory
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    public_prefix: String,
    max_files: usize,
    max_file_bytes: usize,
}

impl UploadStore {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            dir: PathBuf::from(&config.dir),
            public_prefix: config.public_prefix.trim_end_matches('/').to_string(),
            max_files: config.max_files,
            max_file_bytes: config.max_file_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if it is missing
    pub async fn ensure_dir(&self) -> Result<(), UploadError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Reject anything that is not declared as `image/*`
    pub fn check_image(&self, content_type: Option<&str>) -> Result<(), UploadError> {
        match content_type {
            Some(ct) if ct.starts_with("image/") => Ok(()),
            other => Err(UploadError::NotAnImage {
                content_type: other.unwrap_or("unknown").to_string(),
            }),
        }
    }

    pub fn check_count(&self, count: usize) -> Result<(), UploadError> {
        if count > self.max_files {
            return Err(UploadError::TooManyFiles { limit: self.max_files });
        }
        Ok(())
    }

    pub fn check_size(&self, name: &str, size: usize) -> Result<(), UploadError> {
        if size > self.max_file_bytes {
            return Err(UploadError::TooLarge {
                name: name.to_string(),
                size,
                limit: self.max_file_bytes,
            });
        }
        Ok(())
    }

    /// Write one image and return its public path
    pub async fn save_image(&self, original_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        self.check_size(original_name, bytes.len())?;
        self.ensure_dir().await?;

        let name = sanitize_file_name(original_name);
        let mut millis = chrono::Utc::now().timestamp_millis();

        // Same name within the same millisecond: move to the next free slot
        loop {
            let file_name = format!("{}_{}", millis, name);
            let path = self.dir.join(&file_name);

            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    let written = match file.write_all(bytes).await {
                        Ok(()) => file.flush().await,
                        Err(e) => Err(e),
                    };
                    if let Err(e) = written {
                        drop(file);
                        let _ = tokio::fs::remove_file(&path).await;
                        return Err(e.into());
                    }

                    tracing::debug!(file = %file_name, bytes = bytes.len(), "Stored upload");
                    return Ok(format!("{}/{}", self.public_prefix, file_name));
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => millis += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Delete previously saved images by public path; failures are logged, not returned
    pub async fn remove_images(&self, public_paths: &[String]) {
        for public_path in public_paths {
            let Some(file_name) = public_path
                .strip_prefix(&self.public_prefix)
                .and_then(|rest| rest.strip_prefix('/'))
                .filter(|name| !name.is_empty() && !name.contains('/'))
            else {
                tracing::warn!(path = %public_path, "Not an upload path, skipping removal");
                continue;
            };

            if let Err(e) = tokio::fs::remove_file(self.dir.join(file_name)).await {
                tracing::warn!(error = %e, file = %file_name, "Failed to remove upload");
            }
        }
    }
}

/// Strip directories and keep only `[A-Za-z0-9._-]`
pub fn sanitize_file_name(original: &str) -> String {
    let base = original
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(original);

    let cleaned: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn store(dir: &Path) -> UploadStore {
        UploadStore::new(&UploadConfig {
            dir: dir.to_string_lossy().into_owned(),
            max_files: 5,
            max_file_bytes: 16,
            public_prefix: "/uploads".to_string(),
        })
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("q1.png"), "q1.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\me\\my scan (1).jpg"), "myscan1.jpg");
        assert_eq!(sanitize_file_name("..."), "image");
        assert_eq!(sanitize_file_name(""), "image");
    }

    #[test]
    fn test_checks() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());

        assert_ok!(store.check_image(Some("image/png")));
        assert!(matches!(
            store.check_image(Some("application/pdf")),
            Err(UploadError::NotAnImage { .. })
        ));
        assert_err!(store.check_image(None));

        assert_ok!(store.check_count(5));
        assert!(matches!(store.check_count(6), Err(UploadError::TooManyFiles { limit: 5 })));
    }

    #[test]
    fn test_error_status_mapping() {
        let err: AppError = UploadError::TooManyFiles { limit: 5 }.into();
        assert_eq!(err.status_code().as_u16(), 400);

        let err: AppError = UploadError::TooLarge { name: "a.png".into(), size: 20, limit: 16 }.into();
        assert_eq!(err.status_code().as_u16(), 413);
    }

    #[tokio::test]
    async fn test_save_image_writes_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());

        let first = store.save_image("q 1.png", b"png-bytes").await.unwrap();
        let second = store.save_image("q 1.png", b"png-bytes").await.unwrap();

        assert!(first.starts_with("/uploads/"));
        assert!(first.ends_with("_q1.png"));
        assert_ne!(first, second);

        let file_name = first.trim_start_matches("/uploads/");
        let written = tokio::fs::read(tmp.path().join(file_name)).await.unwrap();
        assert_eq!(written, b"png-bytes");
    }

    #[tokio::test]
    async fn test_save_image_too_large() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());

        let result = store.save_image("big.png", &[0u8; 32]).await;
        assert!(matches!(result, Err(UploadError::TooLarge { size: 32, .. })));
    }

    #[tokio::test]
    async fn test_remove_images() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());

        let saved = vec![
            store.save_image("a.png", b"a").await.unwrap(),
            store.save_image("b.png", b"b").await.unwrap(),
        ];
        let outside = tmp.path().join("keep.txt");
        tokio::fs::write(&outside, b"keep").await.unwrap();

        store
            .remove_images(&[saved[0].clone(), saved[1].clone(), "/elsewhere/keep.txt".to_string()])
            .await;

        let mut remaining = std::fs::read_dir(tmp.path()).unwrap();
        assert_eq!(remaining.next().unwrap().unwrap().file_name(), "keep.txt");
        assert!(remaining.next().is_none());
    }
}
