//! Client-side session wrapper.
//!
//! [`SessionClient`] drives any tower service the way a browser drives the
//! API: it keeps the session cookies the server sets, sends them back on
//! matching paths, and when a call is rejected with 401 it asks
//! `/auth/refresh` for a new access cookie and repeats the call once.

use std::time::{Duration, Instant};

use axum::body::{Body, Bytes};
use axum::http::{Method, Request, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use tower::{BoxError, Service, ServiceExt};

const REFRESH_PATH: &str = "/auth/refresh";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Refresh failed or the repeated call was still unauthorized. The
    /// caller has to log in again.
    #[error("session expired, please login again")]
    SessionExpired,
    #[error("failed to build request: {0}")]
    Request(#[from] axum::http::Error),
    #[error("transport error: {0}")]
    Transport(BoxError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A buffered response.
#[derive(Debug)]
pub struct ClientResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl ClientResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

#[derive(Debug, Clone)]
struct StoredCookie {
    name: String,
    value: String,
    path: String,
    expires_at: Option<Instant>,
}

impl StoredCookie {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// RFC 6265 path-match.
    fn matches_path(&self, request_path: &str) -> bool {
        if request_path == self.path {
            return true;
        }
        request_path.starts_with(&self.path)
            && (self.path.ends_with('/') || request_path[self.path.len()..].starts_with('/'))
    }
}

/// Cookies keyed by (name, path), as a browser stores them.
#[derive(Debug, Default)]
struct CookieJar {
    cookies: Vec<StoredCookie>,
}

impl CookieJar {
    /// Apply one `Set-Cookie` value. `Max-Age=0` or an empty value deletes.
    fn store(&mut self, set_cookie: &str) {
        let mut parts = set_cookie.split(';');
        let Some((name, value)) = parts.next().and_then(|kv| kv.split_once('=')) else {
            return;
        };
        let (name, value) = (name.trim(), value.trim());

        let mut path = "/".to_string();
        let mut max_age = None;
        for attr in parts {
            let (key, val) = attr.split_once('=').unwrap_or((attr, ""));
            match key.trim().to_ascii_lowercase().as_str() {
                "path" => path = val.trim().to_string(),
                "max-age" => max_age = val.trim().parse::<i64>().ok(),
                _ => {}
            }
        }

        self.cookies.retain(|c| !(c.name == name && c.path == path));

        if value.is_empty() || max_age.is_some_and(|age| age <= 0) {
            return;
        }

        self.cookies.push(StoredCookie {
            name: name.to_string(),
            value: value.to_string(),
            path,
            expires_at: max_age.map(|age| Instant::now() + Duration::from_secs(age as u64)),
        });
    }

    /// `Cookie` header value for a request to `path`, if any cookie applies.
    fn header_for(&mut self, path: &str) -> Option<String> {
        let now = Instant::now();
        self.cookies.retain(|c| !c.is_expired(now));

        let pairs: Vec<String> = self
            .cookies
            .iter()
            .filter(|c| c.matches_path(path))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();

        (!pairs.is_empty()).then(|| pairs.join("; "))
    }

    fn get(&self, name: &str) -> Option<&str> {
        let now = Instant::now();
        self.cookies
            .iter()
            .find(|c| c.name == name && !c.is_expired(now))
            .map(|c| c.value.as_str())
    }

    fn remove(&mut self, name: &str) {
        self.cookies.retain(|c| c.name != name);
    }
}

/// Session-aware client over a tower service (an axum `Router` in tests,
/// or an HTTP connector).
pub struct SessionClient<S> {
    service: S,
    jar: CookieJar,
}

impl<S> SessionClient<S>
where
    S: Service<Request<Body>, Response = Response<Body>>,
    S::Error: Into<BoxError>,
{
    pub fn new(service: S) -> Self {
        Self {
            service,
            jar: CookieJar::default(),
        }
    }

    /// Current value of a stored, unexpired cookie.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.jar.get(name)
    }

    /// Drop a cookie as if it had expired in the browser.
    pub fn expire_cookie(&mut self, name: &str) {
        self.jar.remove(name);
    }

    pub async fn get(&mut self, path: &str) -> Result<ClientResponse, ClientError> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(
        &mut self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<ClientResponse, ClientError> {
        self.send(Method::POST, path, Some(body)).await
    }

    /// Send a request. A 401 triggers one refresh and one repeat of the
    /// request; it never loops.
    pub async fn send(
        &mut self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<ClientResponse, ClientError> {
        let response = self.execute(method.clone(), path, body).await?;
        if response.status != StatusCode::UNAUTHORIZED || path == REFRESH_PATH {
            return Ok(response);
        }

        let refreshed = self.execute(Method::POST, REFRESH_PATH, None).await?;
        if !refreshed.status.is_success() {
            tracing::debug!(status = %refreshed.status, "Refresh rejected");
            return Err(ClientError::SessionExpired);
        }

        let retried = self.execute(method, path, body).await?;
        if retried.status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::SessionExpired);
        }
        Ok(retried)
    }

    async fn execute(
        &mut self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<ClientResponse, ClientError> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookies) = self.jar.header_for(path) {
            builder = builder.header(header::COOKIE, cookies);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self
            .service
            .ready()
            .await
            .map_err(|e| ClientError::Transport(e.into()))?
            .call(request)
            .await
            .map_err(|e| ClientError::Transport(e.into()))?;

        for value in response.headers().get_all(header::SET_COOKIE) {
            if let Ok(value) = value.to_str() {
                self.jar.store(value);
            }
        }

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| ClientError::Transport(e.into()))?;

        Ok(ClientResponse { status, body })
    }
}
