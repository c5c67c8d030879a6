//! Token issue, validation and revocation.
//!
//! Verification stays stateless (HS256 signature + expiry) except for the
//! revocation counter embedded in refresh tokens: validation re-reads the
//! stored counter on every call, so a `revoke` takes effect on the very
//! next validation. Validation outcomes are never cached across requests.
//!
//! Session lifecycle as seen through this service:
//! ANONYMOUS → (login: `issue_refresh_token`) → AUTHENTICATED →
//! (access token expires) → NEEDS_REFRESH → (`issue_access_token`) →
//! AUTHENTICATED; logout or a password change calls `revoke`, moving every
//! outstanding refresh token for that user to REVOKED permanently.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use gatehouse_core::UserId;

use crate::claims::{AccessClaims, RefreshClaims};
use crate::store::{PermissionSource, RevocationStore, StoreError};

#[derive(Debug, Error)]
pub enum TokenError {
    /// Bad signature or schema: the token is corrupt or not ours.
    #[error("the token could not be verified")]
    NotVerifiable,

    /// Signature and schema are fine but the expiry has passed.
    #[error("the token has expired")]
    Expired,

    /// Signature and expiry are valid but the embedded counter is stale:
    /// the session was revoked, not corrupted.
    #[error("the token was superseded by a revocation")]
    Superseded,

    /// Signing-library failure: internal, never the caller's fault.
    #[error("token signing failed")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Token lifetimes. Defaults: 15 minutes for access, 30 days for refresh.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(30),
        }
    }
}

/// Issues and validates access/refresh tokens.
///
/// Constructed once at start-up and shared; holds the signing keys, the
/// lifetimes and handles to the storage contracts.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: TokenConfig,
    revocations: Arc<dyn RevocationStore>,
    permissions: Arc<dyn PermissionSource>,
}

impl TokenService {
    pub fn new(
        secret: &[u8],
        config: TokenConfig,
        revocations: Arc<dyn RevocationStore>,
        permissions: Arc<dyn PermissionSource>,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            config,
            revocations,
            permissions,
        }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Mint a refresh token embedding the user's current revocation counter.
    ///
    /// The caller must deliver it only as an HTTP-only, Secure, path-scoped
    /// cookie (see [`crate::cookie::RefreshTokenCookie`]), never in a
    /// response body.
    pub fn issue_refresh_token(&self, user: UserId) -> Result<String, TokenError> {
        let claims = RefreshClaims {
            sub: user,
            cnt: self.revocations.counter(user)?,
            exp: (Utc::now() + self.config.refresh_ttl).timestamp(),
        };
        self.encode(&claims)
    }

    /// Exchange a refresh token for a new short-lived access token.
    ///
    /// The embedded counter is compared against the stored one on every
    /// call; a mismatch means the session was revoked and fails with
    /// [`TokenError::Superseded`], distinct from a signature failure.
    pub fn issue_access_token(&self, refresh_jwt: &str) -> Result<String, TokenError> {
        let claims: RefreshClaims = self.decode(refresh_jwt)?;

        let current = self.revocations.counter(claims.sub)?;
        if claims.cnt != current {
            return Err(TokenError::Superseded);
        }

        let access = AccessClaims {
            sub: claims.sub,
            perm: self.permissions.granted_permission(claims.sub)?,
            exp: (Utc::now() + self.config.access_ttl).timestamp(),
        };
        self.encode(&access)
    }

    /// Verify an access token presented on a request.
    pub fn decode_access_token(&self, jwt: &str) -> Result<AccessClaims, TokenError> {
        self.decode(jwt)
    }

    /// Atomically advance the user's revocation counter, permanently
    /// invalidating every refresh token issued before the increment.
    /// Triggered by explicit logout and by password change.
    pub fn revoke(&self, user: UserId) -> Result<(), TokenError> {
        let count = self.revocations.increment(user)?;
        tracing::info!(user = %user, count, "revoked outstanding refresh tokens");
        Ok(())
    }

    fn encode<C: serde::Serialize>(&self, claims: &C) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    fn decode<C: serde::de::DeserializeOwned>(&self, jwt: &str) -> Result<C, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        jsonwebtoken::decode::<C>(jwt, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::NotVerifiable,
            })
    }
}
