//! # Actix Middleware Library
//!
//! Shared middleware components for actix services
//!
//! ## Modules
//! - `jwt_auth`: per-route bearer token and permission guard
//! - `error_body`: JSON error envelope shared by every failure response

pub mod error_body;
pub mod jwt_auth;

pub use error_body::{error_response, AuthRejection, ErrorBody};
pub use jwt_auth::{authorize, RequirePermission, VerifiedClaims};
