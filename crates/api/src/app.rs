//! Axum adapter and application wiring.
//!
//! The gateway itself is framework-free; this module is the only place
//! axum types appear. A single fallback handler funnels every request
//! through [`dispatch`], so the route table in `routes` stays the one
//! source of truth.

use std::sync::Arc;

use anyhow::anyhow;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderName, HeaderValue, Request, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Value};

use gatehouse_auth::{InMemoryAuthStore, TokenConfig, TokenService};
use gatehouse_core::{InternalError, UserId};
use gatehouse_routing::BoundParams;

use crate::context::ApiContext;
use crate::gateway::{dispatch, token_failure_response, RawRequest};
use crate::registry::{FnHandler, HandlerId, HandlerRegistry, RouteHandler};
use crate::request::{JsonMap, RequestContext};
use crate::response::ApiResponse;
use crate::routes::route_table;
use crate::session::{IssueTokenHandler, LoginHandler, LogoutHandler};

const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn build_app(ctx: Arc<ApiContext>) -> axum::Router {
    axum::Router::new().fallback(handle).with_state(ctx)
}

async fn handle(State(ctx): State<Arc<ApiContext>>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();

    let body = match read_json_body(body).await {
        Ok(body) => body,
        Err(response) => return into_axum(response),
    };

    let headers = parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    let raw = RawRequest {
        path: parts.uri.path().to_string(),
        method: parts.method.as_str().to_string(),
        query: parts.uri.query().unwrap_or("").to_string(),
        headers,
        body,
    };

    into_axum(dispatch(&ctx, raw))
}

async fn read_json_body(body: Body) -> Result<Option<JsonMap>, ApiResponse> {
    let invalid = || ApiResponse::bad_request("INVALID_BODY", "the body is not a JSON object");

    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| invalid())?;
    if bytes.is_empty() {
        return Ok(None);
    }
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        _ => Err(invalid()),
    }
}

fn into_axum(response: ApiResponse) -> Response {
    let (status, headers, body) = response.into_parts();
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut response = match body {
        Some(value) => (status, Json(value)).into_response(),
        None => status.into_response(),
    };
    for (name, value) in headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            response.headers_mut().append(name, value);
        }
    }
    response
}

/// Wire a fully-working context against the in-memory store.
///
/// The session endpoints are the real protocol implementation; the user
/// management handlers are placeholder bodies an embedding application
/// replaces with its own registrations.
pub fn build_demo_context(
    jwt_secret: &str,
) -> anyhow::Result<(Arc<ApiContext>, Arc<InMemoryAuthStore>)> {
    let store = Arc::new(InMemoryAuthStore::new());
    let tokens = Arc::new(TokenService::new(
        jwt_secret.as_bytes(),
        TokenConfig::default(),
        store.clone(),
        store.clone(),
    ));

    let change_password_tokens = tokens.clone();
    let handlers = HandlerRegistry::new()
        .register(
            HandlerId::Login,
            Arc::new(LoginHandler::new(tokens.clone(), store.clone())),
        )
        .register(
            HandlerId::IssueToken,
            Arc::new(IssueTokenHandler::new(tokens.clone())),
        )
        .register(
            HandlerId::Logout,
            Arc::new(LogoutHandler::new(tokens.clone())),
        )
        .register(
            HandlerId::Register,
            placeholder(|_req, _params| Ok(ApiResponse::created())),
        )
        .register(
            HandlerId::VerifyUser,
            placeholder(|_req, _params| Ok(ApiResponse::no_content())),
        )
        .register(
            HandlerId::GetUser,
            placeholder(|_req, params| {
                let id = bound(params, "userID")?;
                Ok(ApiResponse::data(json!({ "id": id })))
            }),
        )
        .register(
            HandlerId::UpdateUser,
            placeholder(|_req, _params| Ok(ApiResponse::no_content())),
        )
        .register(
            HandlerId::DeleteUser,
            placeholder(|_req, _params| Ok(ApiResponse::no_content())),
        )
        .register(
            HandlerId::ChangePassword,
            // A password change revokes every outstanding refresh token.
            placeholder(move |_req, params| {
                let user = UserId::new(bound(params, "userID")?);
                match change_password_tokens.revoke(user) {
                    Ok(()) => Ok(ApiResponse::no_content()),
                    Err(err) => Ok(token_failure_response(err, "password change")),
                }
            }),
        )
        .register(
            HandlerId::RequestEmailChange,
            placeholder(|_req, _params| Ok(ApiResponse::no_content())),
        )
        .register(
            HandlerId::VerifyEmailChange,
            placeholder(|_req, _params| Ok(ApiResponse::no_content())),
        )
        .register(
            HandlerId::ListUsers,
            placeholder(|_req, _params| Ok(ApiResponse::data(json!([])))),
        )
        .register(
            HandlerId::UserCount,
            placeholder(|_req, _params| Ok(ApiResponse::data(json!({ "length": 0 })))),
        )
        .register(
            HandlerId::ListRoles,
            placeholder(|_req, _params| Ok(ApiResponse::data(json!(["user", "admin"])))),
        );

    let router = gatehouse_routing::Router::new(route_table()?);
    let ctx = Arc::new(ApiContext::new(router, handlers, tokens)?);
    Ok((ctx, store))
}

fn placeholder<F>(f: F) -> Arc<dyn RouteHandler>
where
    F: Fn(&RequestContext, &BoundParams) -> Result<ApiResponse, InternalError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(FnHandler(f))
}

fn bound(params: &BoundParams, name: &str) -> Result<u64, InternalError> {
    params
        .get(name)
        .ok_or_else(|| InternalError::new(anyhow!("route is missing the {name} parameter")))
}
