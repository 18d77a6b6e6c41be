//! Error handling module for the salon backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::models::SectionWriteStatus;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const INVALID_SECTION: &str = "INVALID_SECTION";
    pub const VERSION_MISMATCH: &str = "VERSION_MISMATCH";
    pub const PUBLISH_IN_PROGRESS: &str = "PUBLISH_IN_PROGRESS";
    pub const PERSISTENCE_ERROR: &str = "PERSISTENCE_ERROR";
    pub const PARTIAL_PERSISTENCE: &str = "PARTIAL_PERSISTENCE";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
}

/// Application error type.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Authentication required
    Unauthorized(String),
    /// Operation not allowed on this resource
    Forbidden(String),
    /// Resource not found
    NotFound(String),
    /// Validation error
    Validation(String),
    /// Unrecognized content section key
    InvalidSection(String),
    /// Another session published since this one was loaded
    Conflict {
        message: String,
        current_revision: i64,
    },
    /// A publish for this session is already running
    PublishInProgress,
    /// Nothing was written to the content store
    Persistence(String),
    /// Some sections were written and others were not
    PartialPersistence {
        message: String,
        sections: Vec<SectionWriteStatus>,
        /// Store revision after the partial write
        current_revision: i64,
    },
    /// Internal server error
    Internal(String),
    /// Bad request
    BadRequest(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidSection(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::PublishInProgress => StatusCode::CONFLICT,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::PartialPersistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::Forbidden(_) => codes::FORBIDDEN,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::InvalidSection(_) => codes::INVALID_SECTION,
            AppError::Conflict { .. } => codes::VERSION_MISMATCH,
            AppError::PublishInProgress => codes::PUBLISH_IN_PROGRESS,
            AppError::Persistence(_) => codes::PERSISTENCE_ERROR,
            AppError::PartialPersistence { .. } => codes::PARTIAL_PERSISTENCE,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::Forbidden(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::InvalidSection(key) => format!("Unknown content section: {}", key),
            AppError::Conflict { message, .. } => message.clone(),
            AppError::PublishInProgress => "A publish is already in progress".to_string(),
            AppError::Persistence(msg) => msg.clone(),
            AppError::PartialPersistence { message, .. } => message.clone(),
            AppError::Internal(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("I/O error: {:?}", err);
        AppError::Persistence(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::BadRequest(format!("JSON error: {}", err))
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
    pub revision_id: i64,
}

impl ErrorResponse {
    pub fn new(error: &AppError, revision_id: i64) -> Self {
        let details = match error {
            AppError::Conflict {
                current_revision, ..
            } => Some(serde_json::json!({ "currentRevision": current_revision })),
            AppError::PartialPersistence {
                sections,
                current_revision,
                ..
            } => Some(serde_json::json!({
                "sections": sections,
                "currentRevision": current_revision,
            })),
            _ => None,
        };

        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message(),
                details,
            },
            revision_id,
        }
    }
}

/// Wrapper type for errors that carry revision_id context.
pub struct AppErrorWithRevision {
    pub error: AppError,
    pub revision_id: i64,
}

impl IntoResponse for AppErrorWithRevision {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let body = ErrorResponse::new(&self.error, self.revision_id);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Section;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::InvalidSection("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::PublishInProgress.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Persistence("disk".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_conflict_details() {
        let err = AppError::Conflict {
            message: "stale".into(),
            current_revision: 7,
        };
        let body = ErrorResponse::new(&err, 3);
        assert_eq!(body.error.code, codes::VERSION_MISMATCH);
        assert_eq!(body.error.details.unwrap()["currentRevision"], 7);
        assert_eq!(body.revision_id, 3);
    }

    #[test]
    fn test_partial_persistence_lists_sections() {
        let err = AppError::PartialPersistence {
            message: "rename failed".into(),
            sections: vec![
                SectionWriteStatus {
                    section: Section::Menu,
                    written: true,
                },
                SectionWriteStatus {
                    section: Section::SiteInfo,
                    written: false,
                },
            ],
            current_revision: 2,
        };
        let details = ErrorResponse::new(&err, 0).error.details.unwrap();
        assert_eq!(details["sections"][0]["section"], "menu");
        assert_eq!(details["sections"][1]["section"], "siteInfo");
        assert_eq!(details["sections"][1]["written"], false);
        assert_eq!(details["currentRevision"], 2);
    }
}
