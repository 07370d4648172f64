//! Typed client for the storefront backend REST API.
//!
//! # Architecture
//!
//! - The backend is the source of truth for auth, payments, and bandwidth;
//!   this client only shapes requests and decodes responses
//! - The bearer token is read from durable storage on every request, so a
//!   login in one store is immediately visible to every client clone
//! - Exactly one attempt per call: no retries, no backoff
//!
//! # Example
//!
//! ```rust,ignore
//! use wealthproxies_client::{ApiClient, ClientConfig};
//!
//! let api = ApiClient::new(&config, storage);
//! let products = api.products().await?;
//! let response = api.login(&credentials).await?;
//! ```

use std::sync::Arc;

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::config::ClientConfig;
use crate::models::{
    AuthResponse, CreateOrderRequest, CreateOrderResponse, LoginRequest, OauthProvider, Product,
    RegisterRequest,
};
use crate::storage::{Storage, keys};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure: backend unreachable, timeout, TLS.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-2xx status.
    #[error("Backend error ({status}): {message}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body, or the status text.
        message: String,
    },

    /// Response body could not be decoded.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response was well-formed but missing an expected field.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Extract a human-readable message from a backend error body.
///
/// The backend is not consistent about its error shape; the ones observed
/// are `{"error": "..."}`, `{"message": "..."}`, and
/// `{"error": {"message": "..."}}`.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
        return Some(message.to_owned());
    }
    if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
        return Some(message.to_owned());
    }
    value
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(ToOwned::to_owned)
}

/// Response shape of the OAuth redirect endpoints.
///
/// Google answers `{"redirectUrl": ...}`, Discord `{"url": ...}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OauthRedirect {
    #[serde(default)]
    redirect_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl OauthRedirect {
    fn into_url(self) -> Option<String> {
        self.redirect_url.or(self.url)
    }
}

/// Body of `POST /api/auth/verify-email`.
#[derive(Debug, Serialize)]
struct VerifyEmailRequest<'a> {
    token: &'a str,
}

/// Response of `POST /api/auth/verify-email`.
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Client for the storefront backend API.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base: String,
    storage: Arc<dyn Storage>,
}

impl ApiClient {
    /// Create a new API client.
    #[must_use]
    pub fn new(config: &ClientConfig, storage: Arc<dyn Storage>) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                http: reqwest::Client::new(),
                base: config.api_base(),
                storage,
            }),
        }
    }

    /// Build a request, attaching the bearer token if one is stored.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.inner.base);
        let builder = self.inner.http.request(method, url);

        match self.inner.storage.get(keys::AUTH_TOKEN) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and decode a JSON response.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let text = self.send_raw(builder).await?;
        serde_json::from_str(&text).map_err(ApiError::Parse)
    }

    /// Send a request and return the raw body, mapping non-2xx to errors.
    async fn send_raw(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = extract_error_message(&text).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_owned()
            });
            tracing::debug!(status = status.as_u16(), %message, "Backend request failed");
            return Err(ApiError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        Ok(text)
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// `POST /api/auth/login`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    #[instrument(skip(self, credentials))]
    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.send(
            self.request(Method::POST, "/api/auth/login")
                .json(credentials),
        )
        .await
    }

    /// `POST /api/auth/register`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    #[instrument(skip(self, data))]
    pub async fn register(&self, data: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.send(self.request(Method::POST, "/api/auth/register").json(data))
            .await
    }

    /// `POST /api/auth/logout`
    ///
    /// The response body is ignored; callers treat this as fire-and-forget.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.send_raw(
            self.request(Method::POST, "/api/auth/logout")
                .json(&serde_json::json!({})),
        )
        .await?;
        Ok(())
    }

    /// `GET /api/auth/{provider}` - fetch the OAuth redirect URL.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::UnexpectedResponse` if the backend omits the URL.
    #[instrument(skip(self))]
    pub async fn oauth_redirect_url(&self, provider: OauthProvider) -> Result<String, ApiError> {
        let path = format!("/api/auth/{provider}");
        let redirect: OauthRedirect = self.send(self.request(Method::GET, &path)).await?;
        redirect.into_url().ok_or_else(|| {
            ApiError::UnexpectedResponse(format!("no redirect URL for provider {provider}"))
        })
    }

    /// `GET /api/auth/callback/{provider}?code=&state=`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    #[instrument(skip(self, code, state))]
    pub async fn oauth_callback(
        &self,
        provider: OauthProvider,
        code: &str,
        state: Option<&str>,
    ) -> Result<AuthResponse, ApiError> {
        let path = format!("/api/auth/callback/{provider}");
        let mut query = vec![("code", code)];
        if let Some(state) = state {
            query.push(("state", state));
        }
        self.send(self.request(Method::GET, &path).query(&query))
            .await
    }

    /// `POST /api/auth/refresh`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<AuthResponse, ApiError> {
        self.send(
            self.request(Method::POST, "/api/auth/refresh")
                .json(&serde_json::json!({})),
        )
        .await
    }

    /// `GET /api/auth/get-session`
    ///
    /// An empty body means "no session".
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    #[instrument(skip(self))]
    pub async fn get_session(&self) -> Result<Option<AuthResponse>, ApiError> {
        let text = self
            .send_raw(self.request(Method::GET, "/api/auth/get-session"))
            .await?;
        if text.trim().is_empty() || text.trim() == "null" {
            return Ok(None);
        }
        serde_json::from_str(&text).map(Some).map_err(ApiError::Parse)
    }

    /// `POST /api/auth/verify-email`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    #[instrument(skip(self, token))]
    pub async fn verify_email(&self, token: &str) -> Result<MessageResponse, ApiError> {
        self.send(
            self.request(Method::POST, "/api/auth/verify-email")
                .json(&VerifyEmailRequest { token }),
        )
        .await
    }

    // =========================================================================
    // Catalog & Orders
    // =========================================================================

    /// `GET /api/products`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        self.send(self.request(Method::GET, "/api/products")).await
    }

    /// `POST /api/order` - submit the cart snapshot, get the payment URL.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    #[instrument(skip(self, request))]
    pub async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, ApiError> {
        self.send(self.request(Method::POST, "/api/order").json(request))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_message_top_level_error() {
        assert_eq!(
            extract_error_message(r#"{"error": "Invalid credentials"}"#).as_deref(),
            Some("Invalid credentials")
        );
    }

    #[test]
    fn test_extract_error_message_top_level_message() {
        assert_eq!(
            extract_error_message(r#"{"message": "Email already taken"}"#).as_deref(),
            Some("Email already taken")
        );
    }

    #[test]
    fn test_extract_error_message_nested() {
        assert_eq!(
            extract_error_message(r#"{"error": {"message": "Code expired"}}"#).as_deref(),
            Some("Code expired")
        );
    }

    #[test]
    fn test_extract_error_message_unrecognized_shape() {
        assert!(extract_error_message("Internal Server Error").is_none());
        assert!(extract_error_message(r#"{"detail": "nope"}"#).is_none());
    }

    #[test]
    fn test_oauth_redirect_prefers_redirect_url() {
        let redirect: OauthRedirect =
            serde_json::from_str(r#"{"redirectUrl": "https://accounts.google.com/x"}"#)
                .expect("deserialize");
        assert_eq!(
            redirect.into_url().as_deref(),
            Some("https://accounts.google.com/x")
        );

        let redirect: OauthRedirect =
            serde_json::from_str(r#"{"url": "https://discord.com/oauth2"}"#).expect("deserialize");
        assert_eq!(
            redirect.into_url().as_deref(),
            Some("https://discord.com/oauth2")
        );
    }

    #[test]
    fn test_backend_error_display() {
        let err = ApiError::Backend {
            status: 401,
            message: "Invalid credentials".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Backend error (401): Invalid credentials"
        );
    }
}
