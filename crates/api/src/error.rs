use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// API-facing error type; serializes to an `{error, message}` JSON body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Validation(_) => "validation_error",
            ApiError::Internal(_) => "internal_error",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Internal details go to the log, not to the client.
        let message = match &self {
            ApiError::Internal(detail) => {
                tracing::error!("Internal error: {detail}");
                "An internal error occurred".to_string()
            }
            ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Validation(msg)
            | ApiError::ServiceUnavailable(msg) => msg.clone(),
        };

        let body = ErrorBody {
            error: self.code(),
            message,
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if matches!(err, sqlx::Error::RowNotFound) {
            return ApiError::NotFound("Resource not found".into());
        }

        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some("23505") => return ApiError::Conflict("Resource already exists".into()),
                Some("23503") => return ApiError::NotFound("Referenced resource not found".into()),
                _ => {}
            }
        }

        ApiError::Internal(format!("Database error: {err}"))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages = Vec::new();
        for (_, field_errors) in errors.field_errors() {
            for error in field_errors {
                if let Some(message) = &error.message {
                    messages.push(message.to_string());
                }
            }
        }

        match messages.as_slice() {
            [single] => ApiError::Validation(single.clone()),
            _ => ApiError::Validation(format!("{} validation errors", messages.len())),
        }
    }
}

impl From<domain::services::scan::ScanError> for ApiError {
    fn from(err: domain::services::scan::ScanError) -> Self {
        ApiError::Internal(format!("Expiry scan failed: {err}"))
    }
}
