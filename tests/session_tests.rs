//! End-to-end session tests driven through `SessionClient`, which behaves
//! like a browser: it keeps cookies and refreshes once on a 401.

mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, body_json, refresh_cookie};
use hotelhub::client::{ClientError, SessionClient};
use serde_json::json;

async fn register(client: &mut SessionClient<axum::Router>, email: &str, role: &str) {
    let response = client
        .post(
            "/auth/register",
            &json!({ "email": email, "password": "hunter22", "full_name": "Alice", "role": role }),
        )
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::OK);
}

async fn login(client: &mut SessionClient<axum::Router>, email: &str) -> serde_json::Value {
    let response = client
        .post("/auth/login", &json!({ "email": email, "password": "hunter22" }))
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::OK);
    response.json().unwrap()
}

#[tokio::test]
async fn test_alice_user_scenario() {
    let t = TestApp::new().await;
    let mut client = SessionClient::new(t.app.clone());

    register(&mut client, "alice@test.com", "user").await;
    let profile = login(&mut client, "alice@test.com").await;
    assert_eq!(profile["role"], "user");

    // Gated for user and admin
    let response = client.get("/hotels").await.unwrap();
    assert_eq!(response.status, StatusCode::OK);

    // Admin only
    let response = client.get("/guests").await.unwrap();
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_expired_access_cookie_is_refreshed_transparently() {
    let t = TestApp::new().await;
    let mut client = SessionClient::new(t.app.clone());

    register(&mut client, "alice@test.com", "user").await;
    login(&mut client, "alice@test.com").await;
    let first_access = client.cookie("access_token").unwrap().to_string();

    // The browser drops the access cookie after its 5 minute Max-Age
    client.expire_cookie("access_token");

    let response = client.get("/hotels").await.unwrap();
    assert_eq!(response.status, StatusCode::OK);

    let renewed = client.cookie("access_token").unwrap();
    assert_ne!(renewed, first_access);
}

#[tokio::test]
async fn test_forbidden_is_not_retried() {
    let t = TestApp::new().await;
    let mut client = SessionClient::new(t.app.clone());

    register(&mut client, "alice@test.com", "user").await;
    login(&mut client, "alice@test.com").await;
    let access = client.cookie("access_token").unwrap().to_string();

    let response = client.get("/guests").await.unwrap();
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    // No refresh happened, so the access cookie is unchanged
    assert_eq!(client.cookie("access_token"), Some(access.as_str()));
}

#[tokio::test]
async fn test_logout_clears_client_session() {
    let t = TestApp::new().await;
    let mut client = SessionClient::new(t.app.clone());

    register(&mut client, "alice@test.com", "user").await;
    login(&mut client, "alice@test.com").await;

    let response = client.send(Method::POST, "/auth/logout", None).await.unwrap();
    assert_eq!(response.status, StatusCode::OK);
    assert!(client.cookie("access_token").is_none());
    assert!(client.cookie("refresh_token").is_none());

    let err = client.get("/hotels").await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
}

#[tokio::test]
async fn test_logout_revokes_refresh_token_held_by_client() {
    let t = TestApp::new().await;
    let mut client = SessionClient::new(t.app.clone());

    register(&mut client, "alice@test.com", "user").await;
    login(&mut client, "alice@test.com").await;
    let captured = client.cookie("refresh_token").unwrap().to_string();

    // The client only sends the access cookie to /auth/logout
    let response = client.send(Method::POST, "/auth/logout", None).await.unwrap();
    assert_eq!(response.status, StatusCode::OK);

    let response = t
        .request("POST", "/auth/refresh", Some(&refresh_cookie(&captured)), None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["error"],
        "No refresh token, please login again"
    );
}

#[tokio::test]
async fn test_revoked_session_yields_session_expired() {
    let t = TestApp::new().await;
    let mut client = SessionClient::new(t.app.clone());

    register(&mut client, "alice@test.com", "user").await;
    login(&mut client, "alice@test.com").await;

    // Another login elsewhere supersedes this client's refresh token
    let mut other = SessionClient::new(t.app.clone());
    login(&mut other, "alice@test.com").await;

    client.expire_cookie("access_token");
    let err = client.get("/hotels").await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));

    // The other session is unaffected
    other.expire_cookie("access_token");
    assert_eq!(other.get("/hotels").await.unwrap().status, StatusCode::OK);
}

#[tokio::test]
async fn test_no_session_yields_session_expired() {
    let t = TestApp::new().await;
    let mut client = SessionClient::new(t.app.clone());

    let err = client.get("/hotels").await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
}

#[tokio::test]
async fn test_admin_scenario() {
    let t = TestApp::new().await;
    let mut client = SessionClient::new(t.app.clone());

    register(&mut client, "root@test.com", "admin").await;
    let profile = login(&mut client, "root@test.com").await;
    assert_eq!(profile["role"], "admin");

    let response = client.get("/guests").await.unwrap();
    assert_eq!(response.status, StatusCode::OK);
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["guests"][0]["email"], "root@test.com");
}
