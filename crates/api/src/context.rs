use std::sync::Arc;

use thiserror::Error;

use gatehouse_auth::TokenService;
use gatehouse_routing::{Router, TableError};

use crate::registry::{HandlerId, HandlerRegistry, MissingHandler};

/// Everything a wired gateway needs to serve requests.
///
/// Built once at startup; from then on the route table, the handler set and
/// the token material are immutable and shared across workers.
pub struct ApiContext {
    router: Router<HandlerId>,
    handlers: HandlerRegistry,
    tokens: Arc<TokenService>,
}

#[derive(Debug, Error)]
pub enum WiringError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Handlers(#[from] MissingHandler),
}

impl ApiContext {
    /// Wire a context, refusing to start if any declared route lacks a
    /// registered handler.
    pub fn new(
        router: Router<HandlerId>,
        handlers: HandlerRegistry,
        tokens: Arc<TokenService>,
    ) -> Result<Self, WiringError> {
        handlers.ensure_complete()?;
        Ok(Self {
            router,
            handlers,
            tokens,
        })
    }

    pub fn router(&self) -> &Router<HandlerId> {
        &self.router
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn tokens_arc(&self) -> Arc<TokenService> {
        Arc::clone(&self.tokens)
    }
}
