use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::applications::ApplicationStatus;
use crate::db::StoreError;

/// Error returned by every handler; rendered as `{"error", "code"}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Email already registered")]
    EmailTaken,
    #[error("You have already applied for this job")]
    AlreadyApplied,
    #[error("Please create a resume before applying for jobs")]
    ResumeRequired,
    #[error("cannot move application from {from} to {to}")]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error("{0}")]
    InvalidState(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::EmailTaken => "email_taken",
            AppError::AlreadyApplied => "already_applied",
            AppError::ResumeRequired => "resume_required",
            AppError::InvalidTransition { .. } => "invalid_transition",
            AppError::InvalidState(_) => "invalid_state",
            AppError::Store(StoreError::NotFound) => "not_found",
            AppError::Store(StoreError::Conflict) => "conflict",
            AppError::Store(StoreError::Unavailable(_)) => "unavailable",
            AppError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
            AppError::EmailTaken | AppError::AlreadyApplied | AppError::Store(StoreError::Conflict) => {
                StatusCode::CONFLICT
            }
            AppError::ResumeRequired
            | AppError::InvalidTransition { .. }
            | AppError::InvalidState(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Store and internal failures keep their detail in the log only.
        let message = match &self {
            AppError::Store(StoreError::Unavailable(detail)) => {
                error!(error = %detail, "store unavailable");
                "Service temporarily unavailable. Please try again.".to_string()
            }
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = Json(json!({ "error": message, "code": self.code() }));
        (status, body).into_response()
    }
}
