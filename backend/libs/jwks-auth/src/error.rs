//! Authentication and authorization failure modes.
//!
//! Every variant carries a fixed HTTP status and a stable machine-readable
//! code so that transport layers can render them without inspecting the
//! message text.

use thiserror::Error;

/// Result alias for the auth subsystem
pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Authorization header missing or not a `Bearer <token>` pair
    #[error("Authorization header is missing or malformed")]
    Unauthorized,

    /// Token header decoded but carries no key id
    #[error("Token header does not declare a key id")]
    MalformedHeader,

    /// The published key set has no key for the declared key id
    #[error("Unable to find a signing key for kid '{0}'")]
    KeyNotFound(String),

    /// The identity provider's key set could not be fetched or parsed
    #[error("Signing key set unavailable: {0}")]
    KeySetUnavailable(String),

    #[error("Token signature verification failed")]
    InvalidSignature,

    #[error("Token has expired")]
    TokenExpired,

    /// Audience or issuer mismatch
    #[error("Incorrect claims: {0}")]
    InvalidClaims(String),

    /// Catch-all for tokens that cannot be parsed or verified
    #[error("Unable to parse authentication token: {0}")]
    InvalidToken(String),

    #[error("Token does not carry a permissions claim")]
    MissingPermissionsClaim,

    /// Permissions claim present but lacks the required permission
    #[error("Permission '{0}' not granted")]
    Forbidden(String),
}

impl AuthError {
    /// HTTP status the failure maps to
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::Unauthorized
            | AuthError::MalformedHeader
            | AuthError::InvalidSignature
            | AuthError::TokenExpired
            | AuthError::InvalidClaims(_)
            | AuthError::Forbidden(_) => 401,
            AuthError::KeyNotFound(_)
            | AuthError::InvalidToken(_)
            | AuthError::MissingPermissionsClaim => 400,
            AuthError::KeySetUnavailable(_) => 503,
        }
    }

    /// Stable code rendered as the `message` of error responses
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Unauthorized => "unauthorized",
            AuthError::MalformedHeader => "invalid_header",
            AuthError::KeyNotFound(_) => "key_not_found",
            AuthError::KeySetUnavailable(_) => "key_set_unavailable",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims(_) => "invalid_claims",
            AuthError::InvalidToken(_) => "invalid_token",
            AuthError::MissingPermissionsClaim => "missing_permissions",
            AuthError::Forbidden(_) => "forbidden",
        }
    }
}
