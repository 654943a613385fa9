use axum::{Json, extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::{
    dao::storage::StorageError,
    state::{draw::AllocationError, state_machine::InvalidTransition},
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict { message } => ServiceError::InvalidState(message),
            other => ServiceError::Unavailable(other),
        }
    }
}

impl From<AllocationError> for ServiceError {
    fn from(err: AllocationError) -> Self {
        match err {
            AllocationError::OutOfRange(_) | AllocationError::AlreadyDrawn(_) => {
                ServiceError::InvalidInput(err.to_string())
            }
            AllocationError::Exhausted => ServiceError::InvalidState(err.to_string()),
        }
    }
}

impl From<InvalidTransition> for ServiceError {
    fn from(err: InvalidTransition) -> Self {
        ServiceError::InvalidState(err.message())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(format!("invalid request body: {}", rejection.body_text()))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("{0}")]
    BadRequest(String),
    /// Unauthorized access attempt.
    #[error("{0}")]
    Unauthorized(String),
    /// Requested resource not found.
    #[error("{0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("{0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("{0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Stable category the UI can branch on.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "validation",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::ServiceUnavailable(_) => "backend_unavailable",
            AppError::Internal(_) => "internal",
        }
    }

    /// HTTP status for the error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => {
                AppError::ServiceUnavailable("storage unavailable (degraded mode)".into())
            }
            ServiceError::Unauthorized(message) => AppError::Unauthorized(message),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
        }
    }
}

/// Error payload returned by every failing route.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
    /// One of `validation`, `unauthorized`, `not_found`, `conflict`,
    /// `backend_unavailable` or `internal`.
    pub kind: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = %status, error = %self, "request failed");
        }

        let payload = Json(ErrorBody {
            kind: self.kind().to_string(),
            error: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_errors_map_to_the_right_category() {
        let app: AppError = ServiceError::from(AllocationError::OutOfRange(80)).into();
        assert_eq!(app.status(), StatusCode::BAD_REQUEST);

        let app: AppError = ServiceError::from(AllocationError::AlreadyDrawn(4)).into();
        assert_eq!(app.kind(), "validation");

        let app: AppError = ServiceError::from(AllocationError::Exhausted).into();
        assert_eq!(app.status(), StatusCode::CONFLICT);
        assert_eq!(app.kind(), "conflict");
    }

    #[test]
    fn storage_conflicts_are_state_conflicts() {
        let service: ServiceError = StorageError::conflict("duplicate").into();
        assert!(matches!(service, ServiceError::InvalidState(_)));

        let unavailable = StorageError::unavailable(
            "down".into(),
            std::io::Error::other("connection refused"),
        );
        let app: AppError = ServiceError::from(unavailable).into();
        assert_eq!(app.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(app.kind(), "backend_unavailable");
    }
}
