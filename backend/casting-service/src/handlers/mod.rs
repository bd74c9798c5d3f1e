/// HTTP request handlers
pub mod actors;
pub mod health;
pub mod movies;

pub use actors::*;
pub use health::*;
pub use movies::*;

use crate::error::{ApiError, Result};
use actix_web::HttpResponse;
use serde::de::DeserializeOwned;

/// Decode a JSON body read after the target record was found; classified
/// like `routes::json_config` (bad syntax 400, wrong shape 422)
pub(crate) fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|err| {
        if err.is_data() {
            ApiError::Unprocessable(err.to_string())
        } else {
            ApiError::BadRequest(err.to_string())
        }
    })
}

/// Fallback for paths no resource matches
pub async fn not_found() -> Result<HttpResponse> {
    Err(ApiError::NotFound)
}

/// Fallback for a known path requested with an unsupported verb
pub async fn method_not_allowed() -> Result<HttpResponse> {
    Err(ApiError::MethodNotAllowed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActorPatch;

    #[test]
    fn test_decode_body_classifies_errors() {
        let err = decode_body::<ActorPatch>(b"{\"name\":").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err = decode_body::<ActorPatch>(b"").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err = decode_body::<ActorPatch>(br#"{"age":"old"}"#).unwrap_err();
        assert!(matches!(err, ApiError::Unprocessable(_)));

        let patch = decode_body::<ActorPatch>(br#"{"age":31}"#).unwrap();
        assert_eq!(patch.age, Some(Some(31)));
    }
}
