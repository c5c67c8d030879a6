use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;

use gatehouse_auth::InMemoryAuthStore;
use gatehouse_core::UserId;

struct TestServer {
    base_url: String,
    store: Arc<InMemoryAuthStore>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same wiring as prod, bound to an ephemeral port.
        let (ctx, store) =
            gatehouse_api::app::build_demo_context("test-secret").expect("wiring failed");
        let app = gatehouse_api::app::build_app(ctx);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            store,
            handle,
        }
    }

    fn seed_user(&self, id: u64, email: &str, password: &str, permission: &str) -> UserId {
        let user = UserId::new(id);
        self.store.insert_user(user, email, password, permission);
        user
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Log in and pull the refresh token out of the `Set-Cookie` header.
///
/// The cookie is marked `Secure`, so a client-side cookie jar would refuse
/// to replay it over plain http; the tests carry it by hand instead.
async fn login(client: &reqwest::Client, srv: &TestServer, email: &str, password: &str) -> String {
    let res = client
        .post(format!("{}/login", srv.base_url))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let cookie = res
        .headers()
        .get("set-cookie")
        .expect("login must set the refresh cookie")
        .to_str()
        .unwrap();
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/token"));

    cookie
        .split(';')
        .next()
        .unwrap()
        .trim()
        .strip_prefix("gatehouse_refresh=")
        .expect("unexpected cookie name")
        .to_string()
}

async fn fetch_access_token(
    client: &reqwest::Client,
    srv: &TestServer,
    refresh: &str,
) -> reqwest::Response {
    client
        .get(format!("{}/token", srv.base_url))
        .header("cookie", format!("gatehouse_refresh={refresh}"))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn full_session_flow_login_token_and_protected_read() {
    let srv = TestServer::spawn().await;
    srv.seed_user(1, "alice@example.com", "pw1", "user:read:1");
    let client = reqwest::Client::new();

    let refresh = login(&client, &srv, "alice@example.com", "pw1").await;

    let res = fetch_access_token(&client, &srv, &refresh).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let access = body["accessToken"].as_str().unwrap().to_string();

    let res = client
        .get(format!("{}/users/1", srv.base_url))
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["id"], 1);
}

#[tokio::test]
async fn login_is_case_insensitive_on_email_and_strict_on_password() {
    let srv = TestServer::spawn().await;
    srv.seed_user(2, "Bob@Example.com", "hunter2", "user:read:2");
    let client = reqwest::Client::new();

    // Stored lowercased; any casing of the same address logs in.
    login(&client, &srv, "bob@EXAMPLE.com", "hunter2").await;

    let res = client
        .post(format!("{}/login", srv.base_url))
        .json(&json!({ "email": "bob@example.com", "password": "Hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn token_endpoint_without_cookie_is_a_client_error() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/token", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "NO_REFRESH_TOKEN");
}

#[tokio::test]
async fn protected_route_requires_a_bearer_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/users/1", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "NO_TOKEN");

    let res = client
        .get(format!("{}/users/1", srv.base_url))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "NOT_VERIFIABLE");
}

#[tokio::test]
async fn permission_scope_limits_access_to_own_resources() {
    let srv = TestServer::spawn().await;
    srv.seed_user(3, "carol@example.com", "pw3", "user:read:3");
    let client = reqwest::Client::new();

    let refresh = login(&client, &srv, "carol@example.com", "pw3").await;
    let res = fetch_access_token(&client, &srv, &refresh).await;
    let body: serde_json::Value = res.json().await.unwrap();
    let access = body["accessToken"].as_str().unwrap().to_string();

    let res = client
        .get(format!("{}/users/4", srv.base_url))
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "MISSING_PERMISSIONS");

    // The collection route needs the unbounded grant.
    let res = client
        .get(format!("{}/users", srv.base_url))
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn wildcard_grant_covers_the_collection_routes() {
    let srv = TestServer::spawn().await;
    srv.seed_user(5, "dave@example.com", "pw5", "user:read:{all}");
    let client = reqwest::Client::new();

    let refresh = login(&client, &srv, "dave@example.com", "pw5").await;
    let res = fetch_access_token(&client, &srv, &refresh).await;
    let body: serde_json::Value = res.json().await.unwrap();
    let access = body["accessToken"].as_str().unwrap().to_string();

    for path in ["/users", "/users/length", "/users/99"] {
        let res = client
            .get(format!("{}{}", srv.base_url, path))
            .bearer_auth(&access)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "GET {path}");
    }
}

#[tokio::test]
async fn logout_invalidates_every_outstanding_refresh_token() {
    let srv = TestServer::spawn().await;
    srv.seed_user(6, "erin@example.com", "pw6", "user:delete:6");
    let client = reqwest::Client::new();

    let refresh = login(&client, &srv, "erin@example.com", "pw6").await;
    let res = fetch_access_token(&client, &srv, &refresh).await;
    let body: serde_json::Value = res.json().await.unwrap();
    let access = body["accessToken"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/users/6/logout", srv.base_url))
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    // The pre-logout refresh token is now superseded.
    let res = fetch_access_token(&client, &srv, &refresh).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "OLD_TOKEN");

    // Logging in again starts a fresh session.
    let refresh = login(&client, &srv, "erin@example.com", "pw6").await;
    let res = fetch_access_token(&client, &srv, &refresh).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_paths_and_unsupported_methods_are_distinguished() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/unknown", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .delete(format!("{}/login", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers().get("allow").unwrap(), "POST");
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["availableMethods"], json!(["POST"]));
}

#[tokio::test]
async fn malformed_paths_and_bodies_are_client_errors() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/user-profile", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "INVALID_PATH");

    let res = client
        .post(format!("{}/login", srv.base_url))
        .header("content-type", "application/json")
        .body("[1, 2, 3]")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "INVALID_BODY");
}

#[tokio::test]
async fn path_matching_is_case_insensitive() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/ROLES", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!(["user", "admin"]));
}
