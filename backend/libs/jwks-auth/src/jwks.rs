//! JSON Web Key Set resolution
//!
//! Fetches the identity provider's published key set and selects the key
//! matching a token's `kid`. With a zero TTL every resolution refetches the
//! set; with a positive TTL the set is cached and an unknown `kid` forces a
//! single refetch before the key is reported missing, so rotated keys become
//! visible on the next request.

use crate::config::AuthConfig;
use crate::error::{AuthError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Public signing key descriptor (subset of RFC 7517)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    #[serde(default)]
    pub kid: Option<String>,
    pub kty: String,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// RSA modulus (base64url)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    /// RSA exponent (base64url)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
}

impl Jwk {
    /// Modulus and exponent when this is an RSA key
    pub fn rsa_components(&self) -> Option<(&str, &str)> {
        if self.kty != "RSA" {
            return None;
        }
        match (self.n.as_deref(), self.e.as_deref()) {
            (Some(n), Some(e)) => Some((n, e)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// First key whose id matches
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|key| key.kid.as_deref() == Some(kid))
    }
}

/// Where key sets come from
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn fetch_key_set(&self) -> Result<JwkSet>;
}

/// Fetches the key set over HTTPS with a per-request timeout
pub struct HttpKeySource {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpKeySource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            timeout,
        }
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    async fn fetch_key_set(&self) -> Result<JwkSet> {
        debug!("Fetching signing key set from {}", self.url);

        let response = self
            .http
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to fetch signing key set: {}", e);
                AuthError::KeySetUnavailable(format!("request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            error!("Signing key set request failed with status: {}", status);
            return Err(AuthError::KeySetUnavailable(format!(
                "provider returned {}",
                status
            )));
        }

        let key_set: JwkSet = response.json().await.map_err(|e| {
            error!("Failed to parse signing key set: {}", e);
            AuthError::KeySetUnavailable(format!("invalid key set: {}", e))
        })?;

        info!("Fetched {} signing keys", key_set.keys.len());
        Ok(key_set)
    }
}

struct CachedKeySet {
    key_set: JwkSet,
    fetched_at: Instant,
}

impl CachedKeySet {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() >= ttl
    }
}

/// Selects the signing key for a token's key id
pub struct KeyResolver {
    source: Arc<dyn KeySource>,
    cache_ttl: Duration,
    cache: RwLock<Option<CachedKeySet>>,
}

impl KeyResolver {
    pub fn new(source: Arc<dyn KeySource>, cache_ttl: Duration) -> Self {
        Self {
            source,
            cache_ttl,
            cache: RwLock::new(None),
        }
    }

    /// Resolver backed by the configured HTTPS key set endpoint
    pub fn from_config(config: &AuthConfig) -> Self {
        let source = HttpKeySource::new(config.jwks_url.clone(), config.fetch_timeout);
        Self::new(Arc::new(source), config.cache_ttl)
    }

    fn caching(&self) -> bool {
        !self.cache_ttl.is_zero()
    }

    /// Return the key whose `kid` matches, or `KeyNotFound` after a full scan
    pub async fn resolve(&self, kid: &str) -> Result<Jwk> {
        if self.caching() {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref().filter(|c| !c.is_expired(self.cache_ttl)) {
                if let Some(key) = cached.key_set.find(kid) {
                    debug!(kid = %kid, "Signing key served from cache");
                    return Ok(key.clone());
                }
                debug!(kid = %kid, "Key id not cached, refetching key set");
            }
        }

        let key_set = self.source.fetch_key_set().await?;
        let found = key_set.find(kid).cloned();

        if self.caching() {
            *self.cache.write().await = Some(CachedKeySet {
                key_set,
                fetched_at: Instant::now(),
            });
        }

        found.ok_or_else(|| {
            warn!(kid = %kid, "No signing key matches token key id");
            AuthError::KeyNotFound(kid.to_string())
        })
    }

    /// Drop any cached key set
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }
}
