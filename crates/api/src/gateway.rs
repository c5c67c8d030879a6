//! End-to-end request dispatch.
//!
//! Raw request → `RequestContext` (parse) → `Router` (match + bind) →
//! token + permission checks (when the route requires them) → handler.
//! Every failure maps to exactly one client-facing response; internal
//! faults are logged with full context and rendered opaquely.

use anyhow::anyhow;
use thiserror::Error;

use gatehouse_auth::{check, expand, StoreError, TokenError};
use gatehouse_core::{InternalError, RequestId};
use gatehouse_routing::RoutingError;

use crate::context::ApiContext;
use crate::request::{JsonMap, RequestContext, RequestError};
use crate::response::ApiResponse;

/// The raw transport pieces of one request, before any parsing.
#[derive(Debug)]
pub struct RawRequest {
    /// Path without any mount prefix.
    pub path: String,
    pub method: String,
    /// Query string without the leading `?`.
    pub query: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<JsonMap>,
}

#[derive(Debug, Error)]
enum GatewayError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error("no access token provided")]
    Unauthenticated,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("missing permissions")]
    Forbidden,

    #[error(transparent)]
    Internal(#[from] InternalError),
}

/// Dispatch one request through the gateway.
///
/// Infallible at this level: every error becomes a response. Each request
/// gets a correlation id carried on the tracing span.
pub fn dispatch(ctx: &ApiContext, raw: RawRequest) -> ApiResponse {
    let request_id = RequestId::new();
    let span = tracing::info_span!(
        "request",
        id = %request_id,
        method = %raw.method,
        path = %raw.path,
    );
    let _guard = span.enter();

    let response = dispatch_inner(ctx, raw).unwrap_or_else(error_response);
    tracing::info!(status = response.status(), "request dispatched");
    response
}

fn dispatch_inner(ctx: &ApiContext, raw: RawRequest) -> Result<ApiResponse, GatewayError> {
    let request =
        RequestContext::build(&raw.path, &raw.method, &raw.query, &raw.headers, raw.body)?;

    let matched = ctx.router().route(request.path(), request.method())?;

    if matched.requires_auth {
        let token = request
            .access_token()
            .ok_or(GatewayError::Unauthenticated)?;
        let claims = ctx.tokens().decode_access_token(token)?;

        if !matched.permissions.is_empty() {
            let required: Vec<String> = matched
                .permissions
                .iter()
                .map(|template| expand(template, &matched.params))
                .collect();
            if !check(&required, &claims.perm) {
                tracing::debug!(user = %claims.sub, "permission check failed");
                return Err(GatewayError::Forbidden);
            }
        }
        tracing::debug!(user = %claims.sub, "authenticated");
    }

    let handler = ctx.handlers().resolve(*matched.handler).ok_or_else(|| {
        GatewayError::Internal(InternalError::new(anyhow!(
            "no handler registered for {:?}",
            matched.handler
        )))
    })?;

    handler
        .handle(&request, &matched.params)
        .map_err(GatewayError::Internal)
}

fn error_response(err: GatewayError) -> ApiResponse {
    match err {
        GatewayError::Request(e) => request_error_response(e),
        GatewayError::Routing(RoutingError::PathNotFound(path)) => {
            ApiResponse::not_found(format!("no route matches the path '{path}'"))
        }
        GatewayError::Routing(RoutingError::MethodNotFound { available, .. }) => {
            ApiResponse::method_not_allowed(&available)
        }
        GatewayError::Unauthenticated => {
            ApiResponse::unauthorized("NO_TOKEN", "no access token provided")
        }
        GatewayError::Token(e) => token_failure_response(e, "access token"),
        GatewayError::Forbidden => ApiResponse::missing_permissions(),
        GatewayError::Internal(e) => {
            tracing::error!(error = ?e.details(), "internal fault");
            ApiResponse::internal_error()
        }
    }
}

fn request_error_response(err: RequestError) -> ApiResponse {
    let code = match &err {
        RequestError::InvalidPath(_) => "INVALID_PATH",
        RequestError::InvalidMethod(_) => "INVALID_METHOD",
        RequestError::InvalidQuery(_) => "INVALID_QUERY",
        RequestError::InvalidCookie(_) => "INVALID_COOKIE",
    };
    ApiResponse::bad_request(code, err.to_string())
}

/// Map a token failure to a response, preserving the cause tag so clients
/// can tell a revoked session from a corrupt or expired token.
pub(crate) fn token_failure_response(err: TokenError, what: &str) -> ApiResponse {
    match err {
        TokenError::NotVerifiable => {
            ApiResponse::unauthorized("NOT_VERIFIABLE", format!("the {what} is invalid"))
        }
        TokenError::Expired => {
            ApiResponse::unauthorized("EXPIRED", format!("the {what} has expired"))
        }
        TokenError::Superseded => {
            ApiResponse::unauthorized("OLD_TOKEN", "the session was revoked")
        }
        TokenError::Store(StoreError::UserNotFound(_)) => {
            ApiResponse::not_found("the user does not exist")
        }
        err @ (TokenError::Signing(_) | TokenError::Store(_)) => {
            tracing::error!(error = %err, what, "token operation failed");
            ApiResponse::internal_error()
        }
    }
}
