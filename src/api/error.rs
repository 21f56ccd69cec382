use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::EnhancementError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    /// External model provider unreachable or erroring; retryable by the
    /// caller, so surfaced as a 400 with the provider detail.
    ProviderFailure(String),

    /// Provider replied, but not with parseable JSON; also retryable.
    MalformedModelReply(String),

    /// Provider replied with valid JSON missing an agreed field. Contract
    /// drift, not user error: 500, and operators get alerted via logs.
    ResponseShape(String),

    ValidationError(String),

    Conflict(String),

    InternalError(String),

    Unauthorized(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::ProviderFailure(msg) => write!(f, "Provider failure: {}", msg),
            ApiError::MalformedModelReply(msg) => write!(f, "Malformed model reply: {}", msg),
            ApiError::ResponseShape(msg) => write!(f, "Invalid response structure: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            ApiError::ProviderFailure(msg) => {
                tracing::warn!("Model provider error: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    format!("Failed to enhance prompt: {msg}"),
                )
            }
            ApiError::MalformedModelReply(msg) => {
                tracing::warn!("Unparseable model reply: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    format!("Failed to parse AI response as JSON: {msg}"),
                )
            }
            ApiError::ResponseShape(field) => {
                tracing::error!("Model reply violated the agreed schema: {}", field);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Invalid response structure: {field}"),
                )
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<EnhancementError> for ApiError {
    fn from(err: EnhancementError) -> Self {
        match err {
            EnhancementError::Validation(msg) => ApiError::ValidationError(msg),
            EnhancementError::TemplateNotFound => ApiError::template_not_found(),
            EnhancementError::Provider(msg) => ApiError::ProviderFailure(msg),
            EnhancementError::Malformed(msg) => ApiError::MalformedModelReply(msg),
            EnhancementError::ResponseShape(field) => ApiError::ResponseShape(field),
            EnhancementError::Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        ApiError::NotFound(format!("{} {} not found", resource, id))
    }

    pub fn template_not_found() -> Self {
        ApiError::NotFound("Template not found".to_string())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }
}
