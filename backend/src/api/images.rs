//! Image upload and delete endpoints.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::content::store_revision;
use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::images::DeleteOutcome;
use crate::AppState;

/// Multipart field carrying the uploaded file.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteImageRequest {
    #[serde(default)]
    pub url: String,
}

/// POST /api/admin/images - Upload an image (multipart field `file`).
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<UploadResponse> {
    let revision_id = store_revision(&state).await;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return error(
                    AppError::BadRequest(format!("Malformed upload: {}", e)),
                    revision_id,
                )
            }
        };
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                return error(
                    AppError::BadRequest(format!("Failed to read upload: {}", e)),
                    revision_id,
                )
            }
        };

        return match state.images.upload(&file_name, &bytes).await {
            Ok(url) => success(UploadResponse { url }, revision_id),
            Err(e) => error(e, revision_id),
        };
    }

    error(
        AppError::BadRequest("No file uploaded".to_string()),
        revision_id,
    )
}

/// POST /api/admin/images/delete - Delete an uploaded image by its public path.
pub async fn delete_image(
    State(state): State<AppState>,
    Json(request): Json<DeleteImageRequest>,
) -> ApiResult<DeleteOutcome> {
    let revision_id = store_revision(&state).await;

    if request.url.trim().is_empty() {
        return error(
            AppError::BadRequest("URL is required".to_string()),
            revision_id,
        );
    }

    match state.images.delete(&request.url).await {
        Ok(outcome) => success(outcome, revision_id),
        Err(e) => error(e, revision_id),
    }
}
