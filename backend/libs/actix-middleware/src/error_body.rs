//! JSON error envelope
//!
//! Every failure is rendered as `{"success": false, "error": <status>, "message": <text>}`.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use jwks_auth::AuthError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: u16,
    pub message: String,
}

impl ErrorBody {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: status.as_u16(),
            message: message.into(),
        }
    }
}

pub fn error_response(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody::new(status, message))
}

/// Renders an `AuthError` through actix's error machinery
#[derive(Debug)]
pub struct AuthRejection(pub AuthError);

impl fmt::Display for AuthRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<AuthError> for AuthRejection {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl ResponseError for AuthRejection {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::UNAUTHORIZED)
    }

    fn error_response(&self) -> HttpResponse {
        error_response(self.status_code(), self.0.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;

    #[test]
    fn test_rejection_body_shape() {
        let response = AuthRejection(AuthError::TokenExpired).error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = response.into_body().try_into_bytes().unwrap();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            ErrorBody {
                success: false,
                error: 401,
                message: "token_expired".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_permissions_is_bad_request() {
        let rejection = AuthRejection(AuthError::MissingPermissionsClaim);
        assert_eq!(rejection.status_code(), StatusCode::BAD_REQUEST);
    }
}
