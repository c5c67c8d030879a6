//! Handler registry.
//!
//! Routes reference handlers by enumerated identifier; the identifiers are
//! resolved against this registry once at start-up. This keeps business
//! logic out of the routing core and makes the route table a plain data
//! structure.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use gatehouse_core::InternalError;
use gatehouse_routing::BoundParams;

use crate::request::RequestContext;
use crate::response::ApiResponse;

/// Identifier of a route handler. One variant per operation the API exposes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum HandlerId {
    Register,
    VerifyUser,
    Login,
    IssueToken,
    GetUser,
    UpdateUser,
    DeleteUser,
    ChangePassword,
    RequestEmailChange,
    VerifyEmailChange,
    Logout,
    ListUsers,
    UserCount,
    ListRoles,
}

impl HandlerId {
    pub const ALL: [HandlerId; 14] = [
        Self::Register,
        Self::VerifyUser,
        Self::Login,
        Self::IssueToken,
        Self::GetUser,
        Self::UpdateUser,
        Self::DeleteUser,
        Self::ChangePassword,
        Self::RequestEmailChange,
        Self::VerifyEmailChange,
        Self::Logout,
        Self::ListUsers,
        Self::UserCount,
        Self::ListRoles,
    ];
}

/// Contract every route handler implements.
///
/// Handlers receive the parsed request and the bound route parameters; the
/// gateway has already enforced authentication and permissions. A returned
/// `InternalError` is rendered as an opaque 500.
pub trait RouteHandler: Send + Sync {
    fn handle(
        &self,
        request: &RequestContext,
        params: &BoundParams,
    ) -> Result<ApiResponse, InternalError>;
}

/// Function adapter so start-up wiring can register plain closures.
pub struct FnHandler<F>(pub F);

impl<F> RouteHandler for FnHandler<F>
where
    F: Fn(&RequestContext, &BoundParams) -> Result<ApiResponse, InternalError> + Send + Sync,
{
    fn handle(
        &self,
        request: &RequestContext,
        params: &BoundParams,
    ) -> Result<ApiResponse, InternalError> {
        (self.0)(request, params)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("no handler registered for {0:?}")]
pub struct MissingHandler(pub HandlerId);

/// Start-up-resolved map from identifier to handler implementation.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<HandlerId, Arc<dyn RouteHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, id: HandlerId, handler: Arc<dyn RouteHandler>) -> Self {
        self.handlers.insert(id, handler);
        self
    }

    /// Start-up invariant: every identifier must be resolvable.
    pub fn ensure_complete(&self) -> Result<(), MissingHandler> {
        for id in HandlerId::ALL {
            if !self.handlers.contains_key(&id) {
                return Err(MissingHandler(id));
            }
        }
        Ok(())
    }

    pub fn resolve(&self, id: HandlerId) -> Option<&Arc<dyn RouteHandler>> {
        self.handlers.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_registry_is_rejected() {
        let registry = HandlerRegistry::new();
        assert_eq!(
            registry.ensure_complete(),
            Err(MissingHandler(HandlerId::Register))
        );
    }
}
