//! Parsed, validated representation of a request path.
//!
//! A path is an ordered sequence of typed segments: all-letter literals
//! (case-normalized) and all-digit numerics (parsed to integers). The
//! canonical key replaces every numeric segment with a fixed placeholder so
//! that `/users/1` and `/users/2` resolve to the same route.

use serde::Serialize;
use thiserror::Error;

/// Placeholder token standing in for a numeric segment in canonical keys
/// and in declarative route paths.
pub const PARAM_PLACEHOLDER: &str = "{x}";

/// One validated path segment. Order within the path is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PathSegment {
    Literal(String),
    Numeric(u64),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathParseError {
    #[error("path is empty")]
    Empty,

    #[error("path contains an empty sub-segment")]
    EmptySegment,

    #[error("invalid path segment '{0}': segments must be all-letter or all-digit")]
    InvalidSegment(String),
}

/// A parsed request path.
///
/// Invariants: non-empty; literal segments match `[a-z]+` after
/// normalization; numeric segments are digits-only. Built per request,
/// immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath {
    segments: Vec<PathSegment>,
}

impl ApiPath {
    /// Parse and normalize a raw path string.
    ///
    /// Leading/trailing separators are stripped, letter segments are
    /// lowercased and digit segments are converted to integers. Anything
    /// else (empty input, consecutive separators, mixed or disallowed
    /// characters) is rejected.
    pub fn parse(raw: &str) -> Result<Self, PathParseError> {
        let trimmed = raw.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(PathParseError::Empty);
        }

        let mut segments = Vec::new();
        for part in trimmed.split('/') {
            if part.is_empty() {
                return Err(PathParseError::EmptySegment);
            }
            if part.bytes().all(|b| b.is_ascii_digit()) {
                let value = part
                    .parse::<u64>()
                    .map_err(|_| PathParseError::InvalidSegment(part.to_string()))?;
                segments.push(PathSegment::Numeric(value));
            } else if part.bytes().all(|b| b.is_ascii_alphabetic()) {
                segments.push(PathSegment::Literal(part.to_ascii_lowercase()));
            } else {
                return Err(PathParseError::InvalidSegment(part.to_string()));
            }
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// The numeric segment values, in original order.
    pub fn parameters(&self) -> Vec<u64> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                PathSegment::Numeric(n) => Some(*n),
                PathSegment::Literal(_) => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Canonical lookup key: every numeric segment replaced by the
    /// placeholder token, literal segments preserved.
    ///
    /// `/Users/1` and `/users/2` canonicalize identically.
    pub fn canonical_key(&self) -> String {
        let mut key = String::new();
        for segment in &self.segments {
            key.push('/');
            match segment {
                PathSegment::Literal(s) => key.push_str(s),
                PathSegment::Numeric(_) => key.push_str(PARAM_PLACEHOLDER),
            }
        }
        key
    }
}

impl core::fmt::Display for ApiPath {
    /// Renders the normalized path with concrete segment values.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for segment in &self.segments {
            match segment {
                PathSegment::Literal(s) => write!(f, "/{s}")?,
                PathSegment::Numeric(n) => write!(f, "/{n}")?,
            }
        }
        Ok(())
    }
}

/// Number of placeholder tokens in a canonical path string.
pub(crate) fn placeholder_count(canonical: &str) -> usize {
    canonical.matches(PARAM_PLACEHOLDER).count()
}
