//! Identity provider configuration
//!
//! Loaded from environment variables:
//! - `AUTH0_DOMAIN`: identity provider domain (REQUIRED)
//! - `API_AUDIENCE`: expected `aud` claim (REQUIRED)
//! - `JWT_ALGORITHMS`: comma-separated allow-list (default: `RS256`)
//! - `JWKS_URL`: key set location (default: `https://<domain>/.well-known/jwks.json`)
//! - `JWT_ISSUER`: expected `iss` claim (default: `https://<domain>/`)
//! - `JWKS_TIMEOUT_SECS`: key set fetch timeout (default: 5)
//! - `JWKS_CACHE_TTL_SECS`: key set cache lifetime, 0 disables caching (default: 0)
//! - `JWT_LEEWAY_SECS`: clock skew tolerance for `exp` (default: 0)

use jsonwebtoken::Algorithm;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub domain: String,
    pub audience: String,
    pub issuer: String,
    pub jwks_url: String,
    pub algorithms: Vec<Algorithm>,
    pub fetch_timeout: Duration,
    pub cache_ttl: Duration,
    pub leeway_secs: u64,
}

impl AuthConfig {
    /// Configuration with issuer and key set URL derived from the domain
    pub fn new(domain: impl Into<String>, audience: impl Into<String>) -> Self {
        let domain = domain.into();
        Self {
            issuer: format!("https://{}/", domain),
            jwks_url: format!("https://{}/.well-known/jwks.json", domain),
            domain,
            audience: audience.into(),
            algorithms: vec![Algorithm::RS256],
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            cache_ttl: Duration::ZERO,
            leeway_secs: 0,
        }
    }

    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks_url = url.into();
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let domain = lookup("AUTH0_DOMAIN")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| "AUTH0_DOMAIN must be set".to_string())?;
        let audience = lookup("API_AUDIENCE")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| "API_AUDIENCE must be set".to_string())?;

        let mut config = Self::new(domain.trim(), audience.trim());

        if let Some(raw) = lookup("JWT_ALGORITHMS") {
            config.algorithms = parse_algorithms(&raw)?;
        }
        if let Some(url) = lookup("JWKS_URL") {
            config.jwks_url = url;
        }
        if let Some(issuer) = lookup("JWT_ISSUER") {
            config.issuer = issuer;
        }
        config.fetch_timeout = Duration::from_secs(parse_u64(
            &lookup,
            "JWKS_TIMEOUT_SECS",
            DEFAULT_FETCH_TIMEOUT_SECS,
        )?);
        config.cache_ttl = Duration::from_secs(parse_u64(&lookup, "JWKS_CACHE_TTL_SECS", 0)?);
        config.leeway_secs = parse_u64(&lookup, "JWT_LEEWAY_SECS", 0)?;

        Ok(config)
    }
}

fn parse_algorithms(raw: &str) -> Result<Vec<Algorithm>, String> {
    let algorithms = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|name| {
            Algorithm::from_str(name).map_err(|_| format!("Unsupported JWT algorithm '{}'", name))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if algorithms.is_empty() {
        return Err("JWT_ALGORITHMS must list at least one algorithm".to_string());
    }
    Ok(algorithms)
}

fn parse_u64<F>(lookup: &F, key: &str, default: u64) -> Result<u64, String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        None => Ok(default),
    }
}
