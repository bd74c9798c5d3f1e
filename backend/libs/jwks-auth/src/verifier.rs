//! Bearer token verification against the provider's published keys
//!
//! Verification order:
//! 1. Decode the unverified header and require a `kid`
//! 2. Resolve the signing key for that `kid`
//! 3. Verify the signature with an allow-listed algorithm
//! 4. Validate `exp`, then `aud` and `iss`

use crate::claims::Claims;
use crate::config::AuthConfig;
use crate::error::{AuthError, Result};
use crate::jwks::KeyResolver;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use tracing::debug;

pub struct TokenVerifier {
    resolver: KeyResolver,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig, resolver: KeyResolver) -> Self {
        let primary = config.algorithms.first().copied().unwrap_or(Algorithm::RS256);
        let mut validation = Validation::new(primary);
        validation.algorithms = config.algorithms.clone();
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.validate_exp = true;
        validation.leeway = config.leeway_secs;

        Self {
            resolver,
            validation,
        }
    }

    /// Verifier fetching keys from the configured endpoint
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config, KeyResolver::from_config(config))
    }

    pub fn resolver(&self) -> &KeyResolver {
        &self.resolver
    }

    /// Verify `token` and return its decoded claims
    pub async fn verify(&self, token: &str) -> Result<Claims> {
        let header = decode_header(token).map_err(|e| {
            debug!("Failed to decode token header: {}", e);
            AuthError::InvalidToken(e.to_string())
        })?;
        let kid = header.kid.ok_or(AuthError::MalformedHeader)?;

        let jwk = self.resolver.resolve(&kid).await?;
        let (n, e) = jwk.rsa_components().ok_or_else(|| {
            AuthError::InvalidToken(format!("signing key '{}' is not an RSA key", kid))
        })?;
        let decoding_key = DecodingKey::from_rsa_components(n, e)
            .map_err(|e| AuthError::InvalidToken(format!("unusable signing key: {}", e)))?;

        let token_data = decode::<Map<String, Value>>(token, &decoding_key, &self.validation)
            .map_err(|e| {
                debug!(kid = %kid, "Token verification failed: {}", e);
                classify(e)
            })?;

        Ok(Claims::new(token_data.claims))
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidAudience => AuthError::InvalidClaims("audience mismatch".to_string()),
        ErrorKind::InvalidIssuer => AuthError::InvalidClaims("issuer mismatch".to_string()),
        ErrorKind::MissingRequiredClaim(claim) if claim == "aud" || claim == "iss" => {
            AuthError::InvalidClaims(format!("missing {} claim", claim))
        }
        _ => AuthError::InvalidToken(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{claims_for, TestKeyPair};
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine as _;
    use jsonwebtoken::Header;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const AUDIENCE: &str = "movie";
    const ISSUER: &str = "https://casting.test/";

    async fn serve_keys(server: &MockServer, body: Value) {
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    fn verifier_for(server: &MockServer) -> TokenVerifier {
        let config = AuthConfig::new("casting.test", AUDIENCE)
            .with_jwks_url(format!("{}/.well-known/jwks.json", server.uri()));
        TokenVerifier::from_config(&config)
    }

    #[tokio::test]
    async fn test_valid_token_yields_claims() {
        let server = MockServer::start().await;
        let keys = TestKeyPair::new("kid-1");
        serve_keys(&server, json!(keys.key_set())).await;

        let token = keys.sign(&claims_for(AUDIENCE, ISSUER, 3600, &["get:actors"]));
        let claims = verifier_for(&server).verify(&token).await.unwrap();

        assert_eq!(claims.subject(), Some("auth0|test-user"));
        assert_eq!(claims.permissions(), Some(vec!["get:actors"]));
    }

    #[tokio::test]
    async fn test_unknown_kid_never_falls_back() {
        let server = MockServer::start().await;
        let keys = TestKeyPair::new("kid-1");
        serve_keys(&server, json!({"keys": [keys.jwk_with_kid("published")]})).await;

        let token = keys.sign(&claims_for(AUDIENCE, ISSUER, 3600, &[]));
        let err = verifier_for(&server).verify(&token).await.unwrap_err();

        assert_eq!(err, AuthError::KeyNotFound("kid-1".to_string()));
    }

    #[tokio::test]
    async fn test_header_without_kid_is_malformed() {
        let server = MockServer::start().await;
        let keys = TestKeyPair::new("kid-1");
        serve_keys(&server, json!(keys.key_set())).await;

        let token = keys.sign_with_header(
            &Header::new(Algorithm::RS256),
            &claims_for(AUDIENCE, ISSUER, 3600, &[]),
        );
        let err = verifier_for(&server).verify(&token).await.unwrap_err();

        assert_eq!(err, AuthError::MalformedHeader);
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let server = MockServer::start().await;
        let keys = TestKeyPair::new("kid-1");
        serve_keys(&server, json!(keys.key_set())).await;

        let token = keys.sign(&claims_for(AUDIENCE, ISSUER, -3600, &["get:actors"]));
        let err = verifier_for(&server).verify(&token).await.unwrap_err();

        assert_eq!(err, AuthError::TokenExpired);
    }

    #[tokio::test]
    async fn test_expiry_is_checked_before_audience() {
        let server = MockServer::start().await;
        let keys = TestKeyPair::new("kid-1");
        serve_keys(&server, json!(keys.key_set())).await;

        let token = keys.sign(&claims_for("other-api", ISSUER, -3600, &[]));
        let err = verifier_for(&server).verify(&token).await.unwrap_err();

        assert_eq!(err, AuthError::TokenExpired);
    }

    #[tokio::test]
    async fn test_wrong_audience_is_invalid_claims() {
        let server = MockServer::start().await;
        let keys = TestKeyPair::new("kid-1");
        serve_keys(&server, json!(keys.key_set())).await;

        let token = keys.sign(&claims_for("other-api", ISSUER, 3600, &[]));
        let err = verifier_for(&server).verify(&token).await.unwrap_err();

        assert!(matches!(err, AuthError::InvalidClaims(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_wrong_issuer_is_invalid_claims() {
        let server = MockServer::start().await;
        let keys = TestKeyPair::new("kid-1");
        serve_keys(&server, json!(keys.key_set())).await;

        let token = keys.sign(&claims_for(AUDIENCE, "https://evil.test/", 3600, &[]));
        let err = verifier_for(&server).verify(&token).await.unwrap_err();

        assert!(matches!(err, AuthError::InvalidClaims(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_foreign_signature_is_rejected() {
        let server = MockServer::start().await;
        let published = TestKeyPair::new("kid-1");
        let attacker = TestKeyPair::fresh("kid-1");
        serve_keys(&server, json!(published.key_set())).await;

        let token = attacker.sign(&claims_for(AUDIENCE, ISSUER, 3600, &["delete:movies"]));
        let err = verifier_for(&server).verify(&token).await.unwrap_err();

        assert_eq!(err, AuthError::InvalidSignature);
    }

    #[tokio::test]
    async fn test_disallowed_algorithm_is_invalid_token() {
        let server = MockServer::start().await;
        let keys = TestKeyPair::new("kid-1");
        serve_keys(&server, json!(keys.key_set())).await;

        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","kid":"kid-1","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(r#"{"sub":"x"}"#);
        let token = format!("{}.{}.c2lnbmF0dXJl", header, payload);
        let err = verifier_for(&server).verify(&token).await.unwrap_err();

        assert!(matches!(err, AuthError::InvalidToken(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_garbage_token_is_invalid_token() {
        let server = MockServer::start().await;
        let err = verifier_for(&server).verify("not-a-jwt").await.unwrap_err();

        assert!(matches!(err, AuthError::InvalidToken(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_provider_outage_is_key_set_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let keys = TestKeyPair::new("kid-1");
        let token = keys.sign(&claims_for(AUDIENCE, ISSUER, 3600, &[]));
        let err = verifier_for(&server).verify(&token).await.unwrap_err();

        assert!(matches!(err, AuthError::KeySetUnavailable(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let server = MockServer::start().await;
        let keys = TestKeyPair::new("kid-1");
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!(keys.key_set()))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let config = AuthConfig::new("casting.test", AUDIENCE)
            .with_jwks_url(format!("{}/.well-known/jwks.json", server.uri()))
            .with_fetch_timeout(Duration::from_millis(200));
        let token = keys.sign(&claims_for(AUDIENCE, ISSUER, 3600, &[]));
        let err = TokenVerifier::from_config(&config)
            .verify(&token)
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::KeySetUnavailable(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_missing_permissions_still_verifies() {
        let server = MockServer::start().await;
        let keys = TestKeyPair::new("kid-1");
        serve_keys(&server, json!(keys.key_set())).await;

        let token = keys.sign(&json!({
            "aud": AUDIENCE,
            "iss": ISSUER,
            "exp": crate::test_utils::unix_now() + 600,
        }));
        let claims = verifier_for(&server).verify(&token).await.unwrap();

        assert!(claims.permissions().is_none());
        assert_eq!(
            crate::check_permissions("get:actors", &claims),
            Err(AuthError::MissingPermissionsClaim)
        );
    }
}
