use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::app::ServiceError;

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

/// Uniform error body: `{"statusCode": n, "message": "..."}`.
#[derive(Serialize)]
struct ErrorResponse {
    #[serde(rename = "statusCode")]
    status_code: u16,
    message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::UserNotFound(_)
            | ServiceError::PostNotFound(_)
            | ServiceError::LikeNotFound(_, _) => Self::not_found(err.to_string()),
            ServiceError::DuplicateUsername(_) => Self::bad_request(err.to_string()),
            ServiceError::Forbidden => Self::forbidden(err.to_string()),
            ServiceError::InvalidCredentials => Self::unauthorized(err.to_string()),
            ServiceError::Storage(inner) => {
                tracing::error!(error = ?inner, "storage failure");
                Self::internal("internal server error")
            }
            ServiceError::Internal(message) => {
                tracing::error!(message, "internal failure");
                Self::internal("internal server error")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            status_code: self.status.as_u16(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}
