//! HTTP facade over the remote inventory API.
//!
//! Every outbound call goes through [`ApiClient`]: it attaches the session's
//! credential header, decodes JSON, and normalizes failures into [`ApiError`].
//! A 401 on an authenticated call tears the session down and sends the
//! navigator to the login entry point.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use stockdesk_auth::{LoginRequest, Principal, RegisterRequest};

use crate::config::ClientConfig;
use crate::navigation::{LoginRedirect, Navigator};
use crate::session::{AuthGateway, SessionStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The server could not be reached (connect, timeout, reset).
    #[error("network error: {0}")]
    Network(String),

    /// The server rejected the credentials (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// Any other non-success status.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Success status, but the body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => "Unable to reach the server. Please try again.".to_string(),
            ApiError::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            ApiError::Rejected { message, .. } => message.clone(),
            ApiError::Decode(_) => "The server returned an unexpected response.".to_string(),
        }
    }
}

/// Whether a request carries the session credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    /// Login/registration: no credential header, a 401 is just a result.
    Public,
    Authenticated,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl core::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
            navigator,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get_with_query(path, &[]).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.execute::<(), T>(Method::GET, path, query, None, Access::Authenticated)
            .await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.execute(Method::POST, path, &[], Some(body), Access::Authenticated)
            .await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.execute(Method::PUT, path, &[], Some(body), Access::Authenticated)
            .await
    }

    /// `PATCH` with query parameters and no body.
    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.execute::<(), T>(Method::PATCH, path, query, None, Access::Authenticated)
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute::<(), serde_json::Value>(Method::DELETE, path, &[], None, Access::Authenticated)
            .await
            .map(|_| ())
    }

    async fn execute<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
        access: Access,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %path, "api request");

        let mut req = self.http.request(method.clone(), &url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        if access == Access::Authenticated {
            if let Some(token) = self.session.token() {
                req = req.header(header::AUTHORIZATION, token.authorization_header());
            }
        }

        let resp = req.send().await.map_err(|e| {
            tracing::warn!(%method, %path, error = %e, "api request failed");
            ApiError::Network(e.to_string())
        })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if status == StatusCode::UNAUTHORIZED {
            if access == Access::Authenticated {
                self.session.expire();
                self.navigator
                    .redirect_to_login(LoginRedirect::new(self.navigator.current()));
            }
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let message = rejection_message(status, &text);
            tracing::debug!(%method, %path, status = status.as_u16(), %message, "api rejected request");
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Best human-readable message for a rejected request: the body's `message`
/// or `error` field, else the raw body, else the status reason.
fn rejection_message(status: StatusCode, body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(serde_json::Value::String(s)) = map.get(key) {
                if !s.trim().is_empty() {
                    return s.clone();
                }
            }
        }
    }
    let raw = body.trim();
    if !raw.is_empty() {
        return raw.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}

#[async_trait]
impl AuthGateway for ApiClient {
    async fn login(&self, request: &LoginRequest) -> Result<Principal, ApiError> {
        self.execute(Method::POST, "/auth/login", &[], Some(request), Access::Public)
            .await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        self.execute::<_, serde_json::Value>(
            Method::POST,
            "/auth/register",
            &[],
            Some(request),
            Access::Public,
        )
        .await
        .map(|_| ())
    }
}
