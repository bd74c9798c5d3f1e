//! # JWKS Auth Library
//!
//! Bearer token authentication against an identity provider that publishes
//! its signing keys as a JSON Web Key Set.
//!
//! ## Modules
//! - `jwks`: key set fetching and `kid` resolution
//! - `verifier`: signature and claim validation
//! - `claims`: decoded claims and permission checks
//! - `bearer`: `Authorization` header parsing
//! - `config`: environment-driven provider settings

pub mod bearer;
pub mod claims;
pub mod config;
pub mod error;
pub mod jwks;
pub mod verifier;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use bearer::extract_bearer_token;
pub use claims::{check_permissions, Claims, PERMISSIONS_CLAIM};
pub use config::AuthConfig;
pub use error::{AuthError, Result};
pub use jwks::{HttpKeySource, Jwk, JwkSet, KeyResolver, KeySource};
pub use verifier::TokenVerifier;
