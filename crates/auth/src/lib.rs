//! `gatehouse-auth` — token protocol and permission evaluation.
//!
//! This crate is intentionally decoupled from HTTP and from concrete
//! storage: token verification is stateless (HS256 JWTs) except for the
//! per-user revocation counter, which is consumed through the
//! [`store::RevocationStore`] contract.

pub mod claims;
pub mod cookie;
pub mod permissions;
pub mod store;
pub mod tokens;

pub use claims::{AccessClaims, RefreshClaims};
pub use cookie::{RefreshTokenCookie, REFRESH_COOKIE_NAME, REFRESH_COOKIE_PATH};
pub use permissions::{check, expand};
pub use store::{
    CredentialSource, InMemoryAuthStore, PermissionSource, RevocationStore, StoreError,
};
pub use tokens::{TokenConfig, TokenError, TokenService};
