//! `Authorization: Bearer <token>` parsing

use crate::error::{AuthError, Result};

const BEARER_SCHEME: &str = "bearer";

/// Extract the token from an `Authorization` header value
///
/// The value must split on whitespace into exactly two parts, the first of
/// which is the `bearer` scheme in any letter case.
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str> {
    let header = header.ok_or(AuthError::Unauthorized)?;
    let mut parts = header.split_whitespace();

    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => {
            Ok(token)
        }
        _ => Err(AuthError::Unauthorized),
    }
}
