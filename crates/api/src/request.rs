//! Typed view of one incoming request.
//!
//! `RequestContext` is built per request from the raw transport pieces,
//! immutable thereafter, and discarded once the response is produced. All
//! parse failures here are the caller's fault and surface as 400s.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use gatehouse_routing::{ApiPath, HttpMethod, InvalidMethodError, PathParseError};

/// JSON object body, passed through untouched.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error(transparent)]
    InvalidPath(#[from] PathParseError),

    #[error(transparent)]
    InvalidMethod(#[from] InvalidMethodError),

    #[error("invalid query pair '{0}'")]
    InvalidQuery(String),

    #[error("invalid cookie piece '{0}'")]
    InvalidCookie(String),
}

/// A query value: digit-only values coerce to integers, everything else
/// stays a (plus-decoded) string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    Int(u64),
    Str(String),
}

/// Parsed request: typed path/method, lowercased header and cookie maps,
/// typed query map, optional JSON body.
#[derive(Debug, Clone)]
pub struct RequestContext {
    path: ApiPath,
    method: HttpMethod,
    headers: HashMap<String, String>,
    cookies: HashMap<String, String>,
    query: HashMap<String, QueryValue>,
    body: Option<JsonMap>,
}

impl RequestContext {
    /// Parse the raw transport pieces into a typed request.
    ///
    /// `raw_path` is the path without any mount prefix; `raw_query` is the
    /// query string without the leading `?`.
    pub fn build(
        raw_path: &str,
        raw_method: &str,
        raw_query: &str,
        raw_headers: &[(String, String)],
        body: Option<JsonMap>,
    ) -> Result<Self, RequestError> {
        let path = ApiPath::parse(raw_path)?;
        let method: HttpMethod = raw_method.parse()?;
        let query = parse_query(raw_query)?;
        let (headers, cookies) = parse_headers(raw_headers)?;

        Ok(Self {
            path,
            method,
            headers,
            cookies,
            query,
            body,
        })
    }

    pub fn path(&self) -> &ApiPath {
        &self.path
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Header lookup, case-insensitive on the key.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(&key.to_lowercase()).map(String::as_str)
    }

    /// Cookie lookup, case-insensitive on the name.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn query(&self) -> &HashMap<String, QueryValue> {
        &self.query
    }

    /// Query lookup, case-insensitive on the parameter name.
    pub fn query_value(&self, parameter: &str) -> Option<&QueryValue> {
        self.query.get(&parameter.to_lowercase())
    }

    pub fn body(&self) -> Option<&JsonMap> {
        self.body.as_ref()
    }

    /// The bearer token from the `Authorization` header.
    ///
    /// Some only when the value is exactly two space-separated tokens with
    /// the first equal to `Bearer`. Any other shape is "no token" — callers
    /// decide whether absence is an auth failure.
    pub fn access_token(&self) -> Option<&str> {
        let value = self.header("authorization")?;
        let parts: Vec<&str> = value.split(' ').collect();
        match parts.as_slice() {
            ["Bearer", token] => Some(*token),
            _ => None,
        }
    }
}

/// Strip spaces; split on `&` then `=`; keys must be letters only and are
/// lowercased; a key with no value defaults its value to the key itself;
/// digit-only values coerce to integers; later duplicates overwrite.
fn parse_query(raw: &str) -> Result<HashMap<String, QueryValue>, RequestError> {
    let mut query = HashMap::new();

    let raw = raw.replace(' ', "");
    if raw.is_empty() {
        return Ok(query);
    }

    for pair in raw.split('&') {
        let mut parts = pair.split('=');
        let key = parts.next().unwrap_or_default().to_lowercase();
        let value = parts.next();
        if parts.next().is_some() {
            return Err(RequestError::InvalidQuery(pair.to_string()));
        }
        if key.is_empty() || !key.bytes().all(|b| b.is_ascii_lowercase()) {
            return Err(RequestError::InvalidQuery(pair.to_string()));
        }

        let value = match value {
            // Flag form: no value (or an empty one) defaults to the key.
            None | Some("") => QueryValue::Str(key.clone()),
            Some(v) if v.bytes().all(|b| b.is_ascii_digit()) => match v.parse::<u64>() {
                Ok(n) => QueryValue::Int(n),
                Err(_) => return Err(RequestError::InvalidQuery(pair.to_string())),
            },
            Some(v) => QueryValue::Str(v.replace('+', " ")),
        };

        query.insert(key, value);
    }

    Ok(query)
}

/// Lowercase header keys; a `cookie` header is redirected into the cookie
/// map by splitting on `"; "` then each piece on `=` (exactly one required).
fn parse_headers(
    raw: &[(String, String)],
) -> Result<(HashMap<String, String>, HashMap<String, String>), RequestError> {
    let mut headers = HashMap::new();
    let mut cookies = HashMap::new();

    for (key, value) in raw {
        let key = key.to_lowercase();
        if key == "cookie" {
            for piece in value.split("; ") {
                let parts: Vec<&str> = piece.split('=').collect();
                let [name, cookie_value] = parts.as_slice() else {
                    return Err(RequestError::InvalidCookie(piece.to_string()));
                };
                cookies.insert(name.to_lowercase(), cookie_value.to_string());
            }
        } else {
            headers.insert(key, value.clone());
        }
    }

    Ok((headers, cookies))
}
