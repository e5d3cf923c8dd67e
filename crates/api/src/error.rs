use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::models::event::MenuError;
use domain::services::RecorderError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Guest link without a token.
    #[error("Invalid link")]
    InvalidLink,

    #[error("Already invited")]
    AlreadyInvited,

    /// The host has no group yet and must finish onboarding first.
    #[error("Onboarding required")]
    OnboardingRequired,

    /// A guest submission failed part-way; resending it is safe.
    #[error("Save failed at {step}: {cause}")]
    SaveFailed { step: &'static str, cause: String },

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            ApiError::InvalidLink => (
                StatusCode::BAD_REQUEST,
                "invalid_link",
                "This link is incomplete. Please use the link from your invitation.".into(),
            ),
            ApiError::AlreadyInvited => (
                StatusCode::CONFLICT,
                "already_invited",
                "This guest is already invited to the event".into(),
            ),
            ApiError::OnboardingRequired => (
                StatusCode::CONFLICT,
                "onboarding_required",
                "Finish setting up your account first".into(),
            ),
            ApiError::SaveFailed { step, cause } => {
                tracing::error!(step = %step, cause = %cause, "Guest submission failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "save_failed",
                    "We could not save your response. Please try again.".into(),
                )
            }
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Too many requests. Please try again later.".into(),
            ),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                )
            }
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Postgres unique violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505"))
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".into()),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("23505") => ApiError::Conflict("Resource already exists".into()),
                Some("23503") => ApiError::NotFound("Referenced resource not found".into()),
                _ => ApiError::Internal(format!("Database error: {}", db_err)),
            },
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();

        // Nested errors (feedback rows) are not in field_errors().
        if messages.is_empty() {
            messages.push(errors.to_string());
        }
        messages.sort();

        ApiError::Validation(messages.join("; "))
    }
}

impl From<MenuError> for ApiError {
    fn from(err: MenuError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<RecorderError> for ApiError {
    fn from(err: RecorderError) -> Self {
        match err {
            RecorderError::InvalidGuestOrToken => {
                ApiError::NotFound("Invitation not found".into())
            }
            RecorderError::Invalid(msg) => ApiError::Validation(msg),
            RecorderError::SelectionsClosed => {
                ApiError::Conflict("Selections are closed for this event".into())
            }
            other => ApiError::SaveFailed {
                step: other.step(),
                cause: other.detail(),
            },
        }
    }
}
