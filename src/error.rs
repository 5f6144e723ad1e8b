use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::{dao::storage::StorageError, services::lifecycle_service::LifecycleError};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend failed while serving the request.
    #[error("storage failure")]
    Storage(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Storage(err)
    }
}

impl From<LifecycleError> for ServiceError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::GameNotFound(_)
            | LifecycleError::PlayerNotFound(_)
            | LifecycleError::BoardNotFound(_) => ServiceError::NotFound(err.to_string()),
            LifecycleError::GameAlreadyStarted(_)
            | LifecycleError::BoardAlreadyGenerated(_)
            | LifecycleError::InvalidTransition(_) => ServiceError::InvalidState(err.to_string()),
            LifecycleError::Storage(source) => ServiceError::Storage(source),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Storage(source) => {
                error!(error = %source, "storage operation failed");
                AppError::Internal(source.to_string())
            }
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
        }
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        ServiceError::from(err).into()
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn status_of(err: LifecycleError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn lifecycle_errors_map_to_http_statuses() {
        let id = Uuid::new_v4();
        assert_eq!(status_of(LifecycleError::GameNotFound(id)), StatusCode::NOT_FOUND);
        assert_eq!(status_of(LifecycleError::PlayerNotFound(id)), StatusCode::NOT_FOUND);
        assert_eq!(status_of(LifecycleError::BoardNotFound(id)), StatusCode::NOT_FOUND);
        assert_eq!(status_of(LifecycleError::GameAlreadyStarted(id)), StatusCode::CONFLICT);
        assert_eq!(
            status_of(LifecycleError::Storage(StorageError::missing("game", id))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn degraded_mode_is_service_unavailable() {
        let response = AppError::from(ServiceError::Degraded).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
