use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{error, warn};

use models::errors::ModelError;
use service::auth::errors::AuthError;
use service::errors::ServiceError;

/// Error rendered as `{"statusCode", "error", "message"}`.
#[derive(Debug, Error)]
#[error("{status}: {message}")]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self { Self::new(StatusCode::BAD_REQUEST, message) }

    pub fn unauthorized(message: impl Into<String>) -> Self { Self::new(StatusCode::UNAUTHORIZED, message) }

    pub fn internal(message: impl Into<String>) -> Self { Self::new(StatusCode::INTERNAL_SERVER_ERROR, message) }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), error = %self.message, "request failed");
        } else {
            warn!(status = self.status.as_u16(), error = %self.message, "request rejected");
        }
        let body = serde_json::json!({
            "statusCode": self.status.as_u16(),
            "error": self.status.canonical_reason().unwrap_or("Error"),
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<ModelError> for JsonApiError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => Self::bad_request(msg),
            ModelError::Conflict(msg) => Self::new(StatusCode::CONFLICT, msg),
            ModelError::Db(msg) => Self::internal(msg),
        }
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, msg),
            ServiceError::Model(inner) => inner.into(),
            other @ ServiceError::Storage(_) => Self::internal(other.to_string()),
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(msg) => Self::bad_request(msg),
            AuthError::Conflict => Self::new(StatusCode::CONFLICT, "Username already exists"),
            AuthError::Unauthorized => Self::unauthorized("Invalid credentials"),
            AuthError::InvalidToken(_) => Self::unauthorized("Unauthorized"),
            other => {
                error!(code = other.code(), error = %other, "auth failure");
                Self::internal(other.to_string())
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
