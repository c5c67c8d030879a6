//! Refresh-token delivery cookie.
//!
//! The refresh token travels exclusively in this cookie: HTTP-only (no
//! script access), Secure, and path-scoped to the token-exchange endpoint so
//! it is not replayed on every request. The gateway never clears it; logout
//! revokes server-side and the cookie ages out via Max-Age.

use chrono::Duration;

/// Fixed cookie name. Lowercase, matching the request parser's
/// case-normalization of cookie names.
pub const REFRESH_COOKIE_NAME: &str = "gatehouse_refresh";

/// Path prefix the cookie is scoped to.
pub const REFRESH_COOKIE_PATH: &str = "/token";

/// A refresh-token cookie ready to be rendered as a `Set-Cookie` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenCookie {
    value: String,
    max_age: Duration,
}

impl RefreshTokenCookie {
    pub fn new(token: String, max_age: Duration) -> Self {
        Self {
            value: token,
            max_age,
        }
    }

    /// Render the full `Set-Cookie` header value.
    pub fn header_value(&self) -> String {
        format!(
            "{REFRESH_COOKIE_NAME}={}; Max-Age={}; Path={REFRESH_COOKIE_PATH}; Secure; HttpOnly; SameSite=Strict",
            self.value,
            self.max_age.num_seconds(),
        )
    }
}
