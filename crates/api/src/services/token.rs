//! Access token issuance and verification (JWT).
//!
//! Tokens carry the user id as `sub` plus `iat`/`exp`. Signing uses RS256
//! when a key pair is configured and HS256 otherwise, see
//! [`crate::config::JwtKeys`].

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use favorites_core::UserId;

use crate::config::{JwtConfig, JwtKeys};

/// Errors raised while issuing or checking tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Configured key material could not be loaded.
    #[error("invalid signing key: {0}")]
    Key(jsonwebtoken::errors::Error),

    /// Signing failed.
    #[error("failed to sign token: {0}")]
    Sign(jsonwebtoken::errors::Error),

    /// Token is past its `exp`.
    #[error("token expired")]
    Expired,

    /// Token is malformed, tampered with or signed by someone else.
    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
}

/// JWT claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: UserId,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies access tokens.
///
/// Cheaply cloneable; key material is parsed once at startup.
#[derive(Clone)]
pub struct TokenIssuer {
    inner: Arc<TokenIssuerInner>,
}

struct TokenIssuerInner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    header: Header,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    /// Build an issuer from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Key`] if a configured PEM key cannot be parsed.
    pub fn new(config: &JwtConfig) -> Result<Self, TokenError> {
        let (encoding, decoding, algorithm) = match &config.keys {
            JwtKeys::Rsa {
                private_pem,
                public_pem,
            } => (
                EncodingKey::from_rsa_pem(private_pem.expose_secret().as_bytes())
                    .map_err(TokenError::Key)?,
                DecodingKey::from_rsa_pem(public_pem.as_bytes()).map_err(TokenError::Key)?,
                Algorithm::RS256,
            ),
            JwtKeys::Hmac { secret } => {
                let bytes = secret.expose_secret().as_bytes();
                (
                    EncodingKey::from_secret(bytes),
                    DecodingKey::from_secret(bytes),
                    Algorithm::HS256,
                )
            }
        };

        Ok(Self {
            inner: Arc::new(TokenIssuerInner {
                encoding,
                decoding,
                header: Header::new(algorithm),
                validation: Validation::new(algorithm),
                ttl: config.ttl,
            }),
        })
    }

    /// Sign a token for `user_id`, valid from now for the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Sign`] if signing fails.
    pub fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now().timestamp())
    }

    pub(crate) fn issue_at(&self, user_id: UserId, issued_at: i64) -> Result<String, TokenError> {
        let ttl = i64::try_from(self.inner.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: user_id,
            iat: issued_at,
            exp: issued_at.saturating_add(ttl),
        };
        jsonwebtoken::encode(&self.inner.header, &claims, &self.inner.encoding)
            .map_err(TokenError::Sign)
    }

    /// Verify signature and expiry, returning the claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Expired`] or [`TokenError::Invalid`].
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.inner.decoding, &self.inner.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            })
    }
}
