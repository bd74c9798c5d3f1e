//! Test utilities for minting tokens against a locally generated key
//!
//! Generating RSA keys is slow, so every `TestKeyPair::new` shares one
//! process-wide key; use `TestKeyPair::fresh` when distinct key material
//! matters (signature mismatch scenarios).

use crate::jwks::{Jwk, JwkSet};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use serde_json::{json, Value};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

static SHARED_KEY: OnceLock<RsaPrivateKey> = OnceLock::new();

fn generate_key() -> RsaPrivateKey {
    RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("generate RSA test key")
}

pub struct TestKeyPair {
    pub kid: String,
    private_key: RsaPrivateKey,
}

impl TestKeyPair {
    pub fn new(kid: &str) -> Self {
        Self {
            kid: kid.to_string(),
            private_key: SHARED_KEY.get_or_init(generate_key).clone(),
        }
    }

    pub fn fresh(kid: &str) -> Self {
        Self {
            kid: kid.to_string(),
            private_key: generate_key(),
        }
    }

    /// Public half as published in a key set
    pub fn jwk(&self) -> Jwk {
        let public = self.private_key.to_public_key();
        Jwk {
            kid: Some(self.kid.clone()),
            kty: "RSA".to_string(),
            use_: Some("sig".to_string()),
            alg: Some("RS256".to_string()),
            n: Some(URL_SAFE_NO_PAD.encode(public.n().to_bytes_be())),
            e: Some(URL_SAFE_NO_PAD.encode(public.e().to_bytes_be())),
        }
    }

    /// Same public key published under another key id
    pub fn jwk_with_kid(&self, kid: &str) -> Jwk {
        Jwk {
            kid: Some(kid.to_string()),
            ..self.jwk()
        }
    }

    pub fn key_set(&self) -> JwkSet {
        JwkSet {
            keys: vec![self.jwk()],
        }
    }

    /// RS256 token with this pair's key id in the header
    pub fn sign(&self, claims: &Value) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.kid.clone());
        self.sign_with_header(&header, claims)
    }

    pub fn sign_with_header(&self, header: &Header, claims: &Value) -> String {
        let pem = self
            .private_key
            .to_pkcs1_pem(LineEnding::LF)
            .expect("encode RSA test key");
        let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("load RSA test key");
        encode(header, claims, &key).expect("sign test token")
    }
}

pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Claims a provider would issue, expiring `expires_in_secs` from now
pub fn claims_for(audience: &str, issuer: &str, expires_in_secs: i64, permissions: &[&str]) -> Value {
    let now = unix_now();
    json!({
        "sub": "auth0|test-user",
        "aud": audience,
        "iss": issuer,
        "iat": now,
        "exp": now + expires_in_secs,
        "permissions": permissions,
    })
}
