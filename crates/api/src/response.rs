//! Minimal response value handed back by handlers and the error mapper.
//!
//! Deliberately framework-free: the axum adapter in `app` converts this
//! into a transport response. Rich response modeling is out of scope; this
//! carries exactly what the gateway needs (status, JSON body, headers).

use serde_json::{json, Value};

use gatehouse_auth::RefreshTokenCookie;
use gatehouse_routing::HttpMethod;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    status: u16,
    body: Option<Value>,
    headers: Vec<(String, String)>,
}

impl ApiResponse {
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self {
            status,
            body,
            headers: Vec::new(),
        }
    }

    pub fn data(body: Value) -> Self {
        Self::new(200, Some(body))
    }

    pub fn created() -> Self {
        Self::new(201, None)
    }

    pub fn no_content() -> Self {
        Self::new(204, None)
    }

    /// Client error with a machine-readable reason code.
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(400, Some(error_body(code, message)))
    }

    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(401, Some(error_body(code, message)))
    }

    /// Denial must not reveal which permission would have sufficed.
    pub fn missing_permissions() -> Self {
        Self::new(
            403,
            Some(error_body(
                "MISSING_PERMISSIONS",
                "the granted permissions do not cover this request",
            )),
        )
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, Some(error_body("NOT_FOUND", message)))
    }

    /// 405 carrying the full list of supported methods, both as an `Allow`
    /// header and in the body.
    pub fn method_not_allowed(available: &[HttpMethod]) -> Self {
        let allow = available
            .iter()
            .map(HttpMethod::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        Self::new(
            405,
            Some(json!({
                "error": "METHOD_NOT_ALLOWED",
                "message": "the path does not support this method",
                "availableMethods": available,
            })),
        )
        .with_header("allow", allow)
    }

    /// Opaque internal fault; details go to the log, not the client.
    pub fn internal_error() -> Self {
        Self::new(
            500,
            Some(error_body("INTERNAL_ERROR", "an internal error occurred")),
        )
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_cookie(self, cookie: &RefreshTokenCookie) -> Self {
        self.with_header("set-cookie", cookie.header_value())
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn into_parts(self) -> (u16, Vec<(String, String)>, Option<Value>) {
        (self.status, self.headers, self.body)
    }
}

fn error_body(code: &'static str, message: impl Into<String>) -> Value {
    json!({
        "error": code,
        "message": message.into(),
    })
}
