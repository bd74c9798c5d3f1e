//! Decoded token claims and permission checks

use crate::error::{AuthError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const PERMISSIONS_CLAIM: &str = "permissions";

/// Decoded token payload, keyed by claim name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn subject(&self) -> Option<&str> {
        self.get("sub").and_then(Value::as_str)
    }

    /// String entries of the `permissions` claim, `None` when the claim is
    /// absent or not a list
    pub fn permissions(&self) -> Option<Vec<&str>> {
        self.get(PERMISSIONS_CLAIM)
            .and_then(Value::as_array)
            .map(|entries| entries.iter().filter_map(Value::as_str).collect())
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(claims: Map<String, Value>) -> Self {
        Self(claims)
    }
}

/// Confirm `permission` is granted by `claims`
///
/// An empty `permission` only requires the claim to be present.
pub fn check_permissions(permission: &str, claims: &Claims) -> Result<()> {
    let granted = claims
        .permissions()
        .ok_or(AuthError::MissingPermissionsClaim)?;

    if permission.is_empty() || granted.contains(&permission) {
        return Ok(());
    }

    Err(AuthError::Forbidden(permission.to_string()))
}
