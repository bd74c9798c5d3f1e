/// Error types for casting-service
///
/// Every variant renders as `{"success": false, "error": <status>, "message": <code>}`.
use crate::db::RepositoryError;
use actix_middleware::error_response;
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use jwks_auth::AuthError;
use thiserror::Error;

/// Result type for casting-service handlers
pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("resource not found")]
    NotFound,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("unprocessable: {0}")]
    Unprocessable(String),
}

impl ApiError {
    fn message(&self) -> &'static str {
        match self {
            ApiError::Auth(err) => err.code(),
            ApiError::BadRequest(_) => "bad request",
            ApiError::NotFound => "resource not found",
            ApiError::MethodNotAllowed => "method not allowed",
            ApiError::Unprocessable(_) => "unprocessable",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Auth(err) => {
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::UNAUTHORIZED)
            }
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        error_response(self.status_code(), self.message())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match &err {
            RepositoryError::Database(db_err) => {
                tracing::error!(error = %db_err, "Repository operation failed");
            }
            other => tracing::debug!("Repository rejected input: {}", other),
        }
        ApiError::Unprocessable(err.to_string())
    }
}
