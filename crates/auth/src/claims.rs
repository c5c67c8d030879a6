//! JWT claims models (transport-agnostic).

use serde::{Deserialize, Serialize};

use gatehouse_core::UserId;

/// Claims embedded in a long-lived refresh token.
///
/// `cnt` snapshots the user's revocation counter at issue time; a token
/// whose count falls behind the stored counter is permanently rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject: the user the token was issued to.
    pub sub: UserId,

    /// Revocation counter value at issue time.
    pub cnt: u64,

    /// Expiration as a unix timestamp (seconds).
    pub exp: i64,
}

/// Claims embedded in a short-lived access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the authenticated user.
    pub sub: UserId,

    /// The permission granted by the user's role at issue time, e.g.
    /// `user:read:{all}` or `user:update:17`.
    pub perm: String,

    /// Expiration as a unix timestamp (seconds).
    pub exp: i64,
}
