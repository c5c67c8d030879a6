//! Shared error model for the gateway boundary.

use thiserror::Error;

/// Opaque internal fault (storage unavailable, signing-library failure, ...).
///
/// Fatal for the current request only: the boundary renders a generic
/// internal error while the full context stays available for logging.
/// Retry policy belongs to the caller/transport layer, not this core.
#[derive(Debug, Error)]
#[error("internal error")]
pub struct InternalError {
    #[source]
    source: anyhow::Error,
}

impl InternalError {
    pub fn new(source: impl Into<anyhow::Error>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Full causal chain, for `tracing::error!` at the boundary.
    pub fn details(&self) -> &anyhow::Error {
        &self.source
    }
}

impl From<anyhow::Error> for InternalError {
    fn from(source: anyhow::Error) -> Self {
        Self { source }
    }
}
