use crate::domain::error::DomainError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};
use utoipa::ToSchema;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

/// Who is expected to act on an error: the caller (`user`) or the operator (`system`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ErrorLevel {
    User,
    System,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ErrorDetail {
    pub(crate) message: String,
    pub(crate) level: ErrorLevel,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ErrorBody {
    pub(crate) error: ErrorDetail,
}

impl AppError {
    fn classify(&self) -> (StatusCode, ErrorLevel, String) {
        match self {
            AppError::Domain(err) => match err {
                DomainError::Validation { .. } => {
                    (StatusCode::BAD_REQUEST, ErrorLevel::User, err.to_string())
                }
                DomainError::NotFound(_) => {
                    (StatusCode::NOT_FOUND, ErrorLevel::User, err.to_string())
                }
                DomainError::AlreadyExists(_) => {
                    (StatusCode::CONFLICT, ErrorLevel::User, err.to_string())
                }
                DomainError::Unexpected(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorLevel::System,
                    "internal error".to_string(),
                ),
            },
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, ErrorLevel::User, err.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorLevel::User, msg.clone()),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, ErrorLevel::User, msg.clone())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, level, message) = self.classify();

        match level {
            ErrorLevel::System => error!(error = %self, "request failed"),
            ErrorLevel::User => warn!(status = status.as_u16(), error = %self, "request rejected"),
        }

        let body = ErrorBody {
            error: ErrorDetail { message, level },
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        // A body cut off by the size limit surfaces here when no Content-Length was sent.
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge(rejection.body_text());
        }
        AppError::BadRequest(format!("failed to unmarshal json: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(format!("invalid query parameters: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(format!("invalid path: {}", rejection.body_text()))
    }
}
