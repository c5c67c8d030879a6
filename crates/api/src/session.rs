//! Built-in handlers for the session endpoints.
//!
//! Login, token exchange and logout are part of the token protocol itself,
//! so they ship with the gateway. Everything else behind the route table is
//! business logic registered by the embedding application.

use std::sync::Arc;

use anyhow::anyhow;
use serde_json::{json, Value};

use gatehouse_auth::{CredentialSource, RefreshTokenCookie, TokenService, REFRESH_COOKIE_NAME};
use gatehouse_core::{InternalError, UserId};
use gatehouse_routing::BoundParams;

use crate::gateway::token_failure_response;
use crate::registry::RouteHandler;
use crate::request::RequestContext;
use crate::response::ApiResponse;

/// `POST /login` — verify credentials and set the refresh-token cookie.
///
/// The refresh token travels only in the cookie, never in the body.
pub struct LoginHandler {
    tokens: Arc<TokenService>,
    credentials: Arc<dyn CredentialSource>,
}

impl LoginHandler {
    pub fn new(tokens: Arc<TokenService>, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            tokens,
            credentials,
        }
    }
}

impl RouteHandler for LoginHandler {
    fn handle(
        &self,
        request: &RequestContext,
        _params: &BoundParams,
    ) -> Result<ApiResponse, InternalError> {
        let body = request.body();
        let email = body.and_then(|b| b.get("email")).and_then(Value::as_str);
        let password = body.and_then(|b| b.get("password")).and_then(Value::as_str);

        let (Some(email), Some(password)) = (email, password) else {
            return Ok(missing_properties(&["email", "password"], email, password));
        };

        let user = self
            .credentials
            .verify_credentials(email, password)
            .map_err(InternalError::new)?;

        let Some(user) = user else {
            return Ok(ApiResponse::bad_request(
                "INVALID_CREDENTIALS",
                "the email or password is incorrect",
            ));
        };

        let token = self
            .tokens
            .issue_refresh_token(user)
            .map_err(InternalError::new)?;
        let cookie = RefreshTokenCookie::new(token, self.tokens.config().refresh_ttl);

        tracing::info!(user = %user, "login succeeded");
        Ok(ApiResponse::no_content().with_cookie(&cookie))
    }
}

fn missing_properties(
    expected: &[&str],
    email: Option<&str>,
    password: Option<&str>,
) -> ApiResponse {
    let missing: Vec<&str> = expected
        .iter()
        .zip([email, password])
        .filter(|(_, present)| present.is_none())
        .map(|(name, _)| *name)
        .collect();

    ApiResponse::new(
        400,
        Some(json!({
            "error": "MISSING_PROPERTY",
            "message": "required properties are missing",
            "missing": missing,
        })),
    )
}

/// `GET /token` — exchange the refresh-token cookie for an access token.
pub struct IssueTokenHandler {
    tokens: Arc<TokenService>,
}

impl IssueTokenHandler {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

impl RouteHandler for IssueTokenHandler {
    fn handle(
        &self,
        request: &RequestContext,
        _params: &BoundParams,
    ) -> Result<ApiResponse, InternalError> {
        let Some(refresh_jwt) = request.cookie(REFRESH_COOKIE_NAME) else {
            return Ok(ApiResponse::bad_request(
                "NO_REFRESH_TOKEN",
                "no refresh token provided; POST /login to get one",
            ));
        };

        match self.tokens.issue_access_token(refresh_jwt) {
            Ok(access) => Ok(ApiResponse::data(json!({ "accessToken": access }))),
            Err(err) => Ok(token_failure_response(err, "refresh token")),
        }
    }
}

/// `POST /users/{x}/logout` — advance the revocation counter, permanently
/// invalidating every outstanding refresh token for the user. The cookie is
/// not cleared; it ages out.
pub struct LogoutHandler {
    tokens: Arc<TokenService>,
}

impl LogoutHandler {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

impl RouteHandler for LogoutHandler {
    fn handle(
        &self,
        _request: &RequestContext,
        params: &BoundParams,
    ) -> Result<ApiResponse, InternalError> {
        let user = params
            .get("userID")
            .map(UserId::new)
            .ok_or_else(|| InternalError::new(anyhow!("logout route is missing the userID parameter")))?;

        match self.tokens.revoke(user) {
            Ok(()) => Ok(ApiResponse::no_content()),
            Err(err) => Ok(token_failure_response(err, "logout")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use gatehouse_auth::{InMemoryAuthStore, TokenConfig};

    fn wiring() -> (Arc<TokenService>, Arc<InMemoryAuthStore>, UserId) {
        let store = Arc::new(InMemoryAuthStore::new());
        let user = UserId::new(7);
        store.insert_user(user, "u@example.com", "pw", "user:read:{all}");
        let tokens = Arc::new(TokenService::new(
            b"test-secret",
            TokenConfig::default(),
            store.clone(),
            store.clone(),
        ));
        (tokens, store, user)
    }

    fn request_with_body(body: serde_json::Value) -> RequestContext {
        let serde_json::Value::Object(map) = body else {
            panic!("test body must be an object");
        };
        RequestContext::build("/login", "POST", "", &[], Some(map)).unwrap()
    }

    fn request_with_cookie(value: &str) -> RequestContext {
        let headers = vec![(
            "cookie".to_string(),
            format!("{REFRESH_COOKIE_NAME}={value}"),
        )];
        RequestContext::build("/token", "GET", "", &headers, None).unwrap()
    }

    #[test]
    fn login_sets_the_refresh_cookie_and_keeps_it_out_of_the_body() {
        let (tokens, store, _) = wiring();
        let handler = LoginHandler::new(tokens, store);

        let request = request_with_body(json!({"email": "U@example.com", "password": "pw"}));
        let response = handler.handle(&request, &BoundParams::default()).unwrap();

        assert_eq!(response.status(), 204);
        assert!(response.body().is_none());
        let (name, value) = &response.headers()[0];
        assert_eq!(name, "set-cookie");
        assert!(value.starts_with("gatehouse_refresh="));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Secure"));
        assert!(value.contains("Path=/token"));
    }

    #[test]
    fn login_reports_missing_properties() {
        let (tokens, store, _) = wiring();
        let handler = LoginHandler::new(tokens, store);

        let request = request_with_body(json!({"email": "u@example.com"}));
        let response = handler.handle(&request, &BoundParams::default()).unwrap();

        assert_eq!(response.status(), 400);
        assert_eq!(response.body().unwrap()["missing"], json!(["password"]));
    }

    #[test]
    fn login_rejects_wrong_credentials() {
        let (tokens, store, _) = wiring();
        let handler = LoginHandler::new(tokens, store);

        let request = request_with_body(json!({"email": "u@example.com", "password": "nope"}));
        let response = handler.handle(&request, &BoundParams::default()).unwrap();

        assert_eq!(response.status(), 400);
        assert_eq!(response.body().unwrap()["error"], "INVALID_CREDENTIALS");
    }

    #[test]
    fn token_exchange_round_trips() {
        let (tokens, _, user) = wiring();
        let refresh = tokens.issue_refresh_token(user).unwrap();
        let handler = IssueTokenHandler::new(tokens.clone());

        let response = handler
            .handle(&request_with_cookie(&refresh), &BoundParams::default())
            .unwrap();

        assert_eq!(response.status(), 200);
        let access = response.body().unwrap()["accessToken"].as_str().unwrap().to_string();
        assert_eq!(tokens.decode_access_token(&access).unwrap().sub, user);
    }

    #[test]
    fn token_exchange_without_cookie_is_a_client_error() {
        let (tokens, _, _) = wiring();
        let handler = IssueTokenHandler::new(tokens);

        let request = RequestContext::build("/token", "GET", "", &[], None).unwrap();
        let response = handler.handle(&request, &BoundParams::default()).unwrap();

        assert_eq!(response.status(), 400);
        assert_eq!(response.body().unwrap()["error"], "NO_REFRESH_TOKEN");
    }

    #[test]
    fn revoked_session_reports_old_token() {
        let (tokens, _, user) = wiring();
        let refresh = tokens.issue_refresh_token(user).unwrap();
        tokens.revoke(user).unwrap();

        let handler = IssueTokenHandler::new(tokens);
        let response = handler
            .handle(&request_with_cookie(&refresh), &BoundParams::default())
            .unwrap();

        assert_eq!(response.status(), 401);
        assert_eq!(response.body().unwrap()["error"], "OLD_TOKEN");
    }

    #[test]
    fn logout_revokes_outstanding_refresh_tokens() {
        let (tokens, _, user) = wiring();
        let refresh = tokens.issue_refresh_token(user).unwrap();

        let handler = LogoutHandler::new(tokens.clone());
        let params: BoundParams = [("userID", user.as_u64())].into_iter().collect();
        let request = RequestContext::build("/users/7/logout", "POST", "", &[], None).unwrap();

        let response = handler.handle(&request, &params).unwrap();
        assert_eq!(response.status(), 204);
        assert!(tokens.issue_access_token(&refresh).is_err());
    }
}
