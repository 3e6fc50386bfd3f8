#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use hotelhub::{
    ServerConfig,
    auth::TokenTransport,
    create_app,
    db::{Database, NewUser, UserRole},
    jwt::JwtConfig,
    password::hash_password,
};
use tower::ServiceExt;

pub const ACCESS_SECRET: &[u8] = b"test-access-secret-0123456789abcdef";
pub const REFRESH_SECRET: &[u8] = b"test-refresh-secret-0123456789abcde";

pub struct TestApp {
    pub app: Router,
    pub db: Database,
    pub jwt: JwtConfig,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_transport(TokenTransport::Cookie).await
    }

    pub async fn with_transport(transport: TokenTransport) -> Self {
        let db = Database::open(":memory:")
            .await
            .expect("Failed to open test database");
        let config = ServerConfig {
            db: db.clone(),
            access_token_secret: ACCESS_SECRET.to_vec(),
            refresh_token_secret: REFRESH_SECRET.to_vec(),
            secure_cookies: false,
            transport,
        };
        Self {
            app: create_app(&config),
            db,
            jwt: JwtConfig::new(ACCESS_SECRET, REFRESH_SECRET),
        }
    }

    /// Send a request through the router.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Register through the API, then log in. Returns (access_token, refresh_token).
    pub async fn register_and_login(&self, email: &str, password: &str, role: &str) -> (String, String) {
        let response = self
            .request(
                "POST",
                "/auth/register",
                None,
                Some(serde_json::json!({
                    "email": email,
                    "password": password,
                    "full_name": "Test Principal",
                    "role": role,
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        self.login(email, password).await
    }

    pub async fn login(&self, email: &str, password: &str) -> (String, String) {
        let response = self
            .request(
                "POST",
                "/auth/login",
                None,
                Some(serde_json::json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let access = set_cookie_value(&response, "access_token").expect("access cookie");
        let refresh = set_cookie_value(&response, "refresh_token").expect("refresh cookie");
        (access, refresh)
    }

    /// Create a principal directly in the store and mint an access token for it.
    pub async fn principal_token(&self, email: &str, role: UserRole) -> (String, String) {
        let hash = hash_password("password123").unwrap();
        let user = self
            .db
            .users()
            .create(&NewUser {
                full_name: "Direct Principal",
                email,
                password_hash: &hash,
                phone: None,
                role,
            })
            .await
            .unwrap();
        let access = self.jwt.issue_access(&user.id, role).unwrap();
        (user.id, access.token)
    }
}

/// All `Set-Cookie` header values of a response.
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// Full `Set-Cookie` line for the named cookie.
pub fn set_cookie_line(response: &Response<Body>, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    set_cookies(response)
        .into_iter()
        .find(|c| c.starts_with(&prefix))
}

/// Value of the named cookie in a `Set-Cookie` header.
pub fn set_cookie_value(response: &Response<Body>, name: &str) -> Option<String> {
    let line = set_cookie_line(response, name)?;
    let value = line.split(';').next()?.split_once('=')?.1.to_string();
    Some(value)
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub fn access_cookie(token: &str) -> String {
    format!("access_token={}", token)
}

pub fn refresh_cookie(token: &str) -> String {
    format!("refresh_token={}", token)
}
