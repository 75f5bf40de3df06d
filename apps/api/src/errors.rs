use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::github_client::GitHubError;
use crate::resume::validation::ValidationReport;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Save blocked by profile validation. Carries the full report for the editor.
    #[error("Invalid résumé: {}", .0.toast.as_deref().unwrap_or("validation failed"))]
    InvalidDocument(Box<ValidationReport>),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("GitHub error: {0}")]
    GitHub(#[from] GitHubError),

    #[error("S3 error: {0}")]
    S3(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InvalidDocument(report) => {
                let body = Json(json!({
                    "error": {
                        "code": "INVALID_RESUME",
                        "message": report.toast.clone().unwrap_or_default(),
                        "fields": report.fields,
                        "toast": report.toast,
                        "tab": report.tab,
                    }
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::GitHub(GitHubError::UserNotFound(user)) => (
                StatusCode::NOT_FOUND,
                "GITHUB_USER_NOT_FOUND",
                format!("GitHub user '{user}' not found"),
            ),
            AppError::GitHub(GitHubError::InvalidUsername(user)) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format!("'{user}' is not a valid GitHub username"),
            ),
            AppError::GitHub(e) => {
                tracing::error!("GitHub error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "GITHUB_ERROR",
                    "Could not load repositories from GitHub".to_string(),
                )
            }
            AppError::S3(msg) => {
                tracing::error!("S3 error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "S3_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::ResumeDocument;
    use crate::resume::validation::validate_document;

    #[test]
    fn test_invalid_document_maps_to_422() {
        let mut doc = ResumeDocument::default();
        doc.profile.email = "nope".into();
        let err = AppError::InvalidDocument(Box::new(validate_document(&doc)));
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_github_user_not_found_is_404() {
        let err = AppError::GitHub(GitHubError::UserNotFound("ghost".into()));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_not_found_status() {
        let err = AppError::NotFound("Resume not found".into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
