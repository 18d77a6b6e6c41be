//! Uploaded image storage.
//!
//! Images live in one directory and are referenced from content by their
//! public path (`/images/<file>`). Nothing outside that directory can be
//! written or deleted through this module.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tokio::fs;

use crate::errors::AppError;

/// Public path prefix under which uploaded images are served.
pub const IMAGE_URL_PREFIX: &str = "/images/";

/// Result of a delete request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub url: String,
    pub existed: bool,
}

/// Local image directory.
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub async fn open(dir: &Path) -> Result<Self, AppError> {
        fs::create_dir_all(dir).await.map_err(|e| {
            AppError::Persistence(format!(
                "Failed to create image directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Store an uploaded file and return the public path to reference it by.
    pub async fn upload(&self, original_name: &str, bytes: &[u8]) -> Result<String, AppError> {
        if bytes.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }
        let name = sanitize_file_name(original_name)?;
        let file_name = format!("{}_{}", Utc::now().timestamp_millis(), name);

        fs::write(self.dir.join(&file_name), bytes).await.map_err(|e| {
            tracing::error!("Image upload failed for {}: {}", file_name, e);
            AppError::Persistence("Upload failed".to_string())
        })?;

        tracing::info!(file = %file_name, size = bytes.len(), "Stored uploaded image");
        Ok(format!("{}{}", IMAGE_URL_PREFIX, file_name))
    }

    /// Delete an image by its public path. A missing file counts as deleted.
    pub async fn delete(&self, url: &str) -> Result<DeleteOutcome, AppError> {
        let path = self.resolve(url)?;
        let existed = match fs::remove_file(&path).await {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => return Err(e.into()),
        };
        if existed {
            tracing::info!(url, "Deleted image");
        } else {
            tracing::warn!(url, "Image not found, treated as deleted");
        }
        Ok(DeleteOutcome {
            url: url.to_string(),
            existed,
        })
    }

    /// Map a public image path to a file inside the image directory.
    fn resolve(&self, url: &str) -> Result<PathBuf, AppError> {
        let relative = url.strip_prefix(IMAGE_URL_PREFIX).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Invalid path. Must start with {}",
                IMAGE_URL_PREFIX
            ))
        })?;

        let relative = Path::new(relative);
        let only_normal = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if relative.as_os_str().is_empty() || !only_normal {
            return Err(AppError::Forbidden("Invalid path traversal".to_string()));
        }
        Ok(self.dir.join(relative))
    }
}

/// Keep only the final path component and replace whitespace with `_`.
fn sanitize_file_name(original: &str) -> Result<String, AppError> {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if base.is_empty() || base == "." || base == ".." {
        return Err(AppError::Validation("File name is required".to_string()));
    }
    Ok(base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect())
}
