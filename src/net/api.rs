//! HTTP client for the BFF.
//!
//! DESIGN
//! ======
//! One `reqwest::Client` with a cookie store carries the session cookie the
//! BFF issues on login, so every later call is authenticated without the
//! caller handling credentials. `request` is the only place responses are
//! inspected; the typed endpoint helpers decode on top of it.
//!
//! Notification is not done here. The client returns a classified
//! `ApiError` and the caller decides whether to surface it (see `notify`).

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::error::ApiError;
use super::types::{Item, LoginResponse, NewItem, StatusMessage, User};
use crate::config::Config;

const JSON_MIME: &str = "application/json";

// =============================================================================
// REQUEST / RESPONSE SHAPES
// =============================================================================

/// Response body: parsed when the server declared JSON, raw text otherwise.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Json(Value),
    Raw(String),
}

/// Optional parts of a request.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    pub body: Option<Value>,
    /// Replaces same-named default headers.
    pub headers: HeaderMap,
}

impl RequestOptions {
    #[must_use]
    pub fn json(body: Value) -> Self {
        Self { body: Some(body), headers: HeaderMap::new() }
    }
}

// =============================================================================
// SEAMS
// =============================================================================

/// Calls the session store needs.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `GET /auth/me`.
    async fn current_user(&self) -> Result<User, ApiError>;
    /// `POST /auth/login`.
    async fn login(&self, username: &str, password: &str) -> Result<User, ApiError>;
    /// `GET /auth/logout`.
    async fn logout(&self) -> Result<(), ApiError>;
}

/// Calls the dashboard needs.
#[async_trait]
pub trait ItemsApi: Send + Sync {
    /// `GET /api/items`, in server order.
    async fn items(&self) -> Result<Vec<Item>, ApiError>;
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client with a fresh cookie jar.
    ///
    /// # Errors
    ///
    /// Returns a transport-class `ApiError` if the TLS backend fails to
    /// initialize.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().cookie_store(true);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ApiError::transport)?;
        Ok(Self { http, base_url: config.base_url.clone() })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Perform one call and classify its outcome.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` with status 0 when no response arrived, or with
    /// the response status for any non-2xx answer.
    pub async fn request(&self, method: Method, path: &str, options: RequestOptions) -> Result<Payload, ApiError> {
        self.send(method, path, options).await.map(|(_, payload)| payload)
    }

    /// Like [`Self::request`], decoding a JSON success body into `T`.
    ///
    /// # Errors
    ///
    /// As [`Self::request`], plus a `Server`-kind error when the body is not
    /// JSON or does not match `T`.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let (status, payload) = self.send(method, path, options).await?;
        match payload {
            Payload::Json(value) => {
                serde_json::from_value(value).map_err(|e| ApiError::unexpected_body(status.as_u16(), e))
            }
            Payload::Raw(_) => Err(ApiError::unexpected_body(status.as_u16(), "expected a JSON body")),
        }
    }

    async fn send(&self, method: Method, path: &str, options: RequestOptions) -> Result<(StatusCode, Payload), ApiError> {
        let url = self.url(path);
        tracing::debug!(%method, %url, "bff request");

        let mut headers = default_headers();
        for (name, value) in &options.headers {
            headers.insert(name.clone(), value.clone());
        }

        let mut request = self.http.request(method.clone(), &url).headers(headers);
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::debug!(%method, %url, error = %e, "bff transport failure");
            ApiError::transport(e)
        })?;

        let status = response.status();
        let is_json = is_json_response(response.headers());
        let text = response.text().await.map_err(ApiError::transport)?;
        let payload = parse_payload(is_json, text);

        if status.is_success() {
            return Ok((status, payload));
        }

        let err = ApiError::from_response(status.as_u16(), payload);
        tracing::debug!(%method, %url, status = err.status, code = ?err.error_code, "bff request failed");
        Err(err)
    }

    // -------------------------------------------------------------------------
    // Endpoints
    // -------------------------------------------------------------------------

    /// `GET /` — the BFF's liveness message.
    ///
    /// # Errors
    ///
    /// Any classified request failure.
    pub async fn ping(&self) -> Result<String, ApiError> {
        let status: StatusMessage = self.request_json(Method::GET, "/", RequestOptions::default()).await?;
        Ok(status.message)
    }

    /// `GET /api/items/{id}`.
    ///
    /// # Errors
    ///
    /// Any classified request failure; an unknown id is a 404.
    pub async fn item(&self, id: i64) -> Result<Item, ApiError> {
        self.request_json(Method::GET, &item_path(id), RequestOptions::default()).await
    }

    /// `POST /api/items`.
    ///
    /// # Errors
    ///
    /// Any classified request failure.
    pub async fn create_item(&self, item: &NewItem) -> Result<Item, ApiError> {
        let body = json!({ "id": item.id, "name": item.name, "description": item.description });
        self.request_json(Method::POST, "/api/items", RequestOptions::json(body)).await
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn current_user(&self) -> Result<User, ApiError> {
        self.request_json(Method::GET, "/auth/me", RequestOptions::default()).await
    }

    async fn login(&self, username: &str, password: &str) -> Result<User, ApiError> {
        let body = json!({ "username": username, "password": password });
        let response: LoginResponse =
            self.request_json(Method::POST, "/auth/login", RequestOptions::json(body)).await?;
        Ok(response.user)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.request(Method::GET, "/auth/logout", RequestOptions::default()).await?;
        Ok(())
    }
}

#[async_trait]
impl ItemsApi for ApiClient {
    async fn items(&self) -> Result<Vec<Item>, ApiError> {
        self.request_json(Method::GET, "/api/items", RequestOptions::default()).await
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MIME));
    headers.insert(ACCEPT, HeaderValue::from_static(JSON_MIME));
    headers
}

fn item_path(id: i64) -> String {
    format!("/api/items/{id}")
}

fn is_json_response(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|ct| {
            let mime = ct.split(';').next().unwrap_or_default().trim();
            mime.eq_ignore_ascii_case(JSON_MIME) || mime.ends_with("+json")
        })
}

fn parse_payload(is_json: bool, text: String) -> Payload {
    if !is_json {
        return Payload::Raw(text);
    }
    match serde_json::from_str(&text) {
        Ok(value) => Payload::Json(value),
        Err(_) => Payload::Raw(text),
    }
}
