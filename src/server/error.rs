use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::sql::{QueryBuilderError, ValidationError};

use super::api::error_response::{ErrorResponse, ErrorResponseType};

pub enum ServerError {
    NotFound(Uri),
    /// the target of an edit does not exist
    VideoNotFound(i64),
    Validation(ValidationError),
    UncaughtError {
        details: Option<serde_json::Value>,
        message: String,
        error_type: ErrorResponseType,
    },
    /// logged, never shown to the client
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            Self::UncaughtError {
                details,
                message,
                error_type,
            } => (
                StatusCode::BAD_REQUEST,
                axum::Json(ErrorResponse {
                    details,
                    message,
                    error_type,
                }),
            )
                .into_response(),
            Self::Validation(err) => (
                StatusCode::BAD_REQUEST,
                axum::Json(ErrorResponse {
                    message: err.to_string(),
                    details: serde_json::to_value(&err.issues).ok(),
                    error_type: ErrorResponseType::ValidationError,
                }),
            )
                .into_response(),
            Self::Internal(message) => {
                tracing::error!(error = %message, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(ErrorResponse {
                        details: None,
                        message: "Internal server error".to_owned(),
                        error_type: ErrorResponseType::InternalError,
                    }),
                )
                    .into_response()
            }
            Self::VideoNotFound(id) => (
                StatusCode::NOT_FOUND,
                format!("Video not found: {}", id),
            )
                .into_response(),
            Self::NotFound(uri) => (
                StatusCode::NOT_FOUND,
                format!("Path not found: {}", uri.path()),
            )
                .into_response(),
        }
    }
}

fn uncaught(message: String) -> ServerError {
    ServerError::UncaughtError {
        details: None,
        message,
        error_type: ErrorResponseType::UncaughtError,
    }
}

impl From<ValidationError> for ServerError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<QueryBuilderError> for ServerError {
    fn from(err: QueryBuilderError) -> Self {
        match err {
            QueryBuilderError::Internal(_) => Self::Internal(err.to_string()),
            QueryBuilderError::NoSelectedColumns | QueryBuilderError::NoEditedColumns => {
                uncaught(err.to_string())
            }
        }
    }
}

impl From<sqlx::Error> for ServerError {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<JsonRejection> for ServerError {
    fn from(err: JsonRejection) -> Self {
        uncaught(err.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(err: QueryRejection) -> Self {
        uncaught(err.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(err: PathRejection) -> Self {
        uncaught(err.body_text())
    }
}
