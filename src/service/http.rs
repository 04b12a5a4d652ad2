//! REST adapter for the storefront cart endpoints.
//!
//! Wraps the `/api/v1/cart` HTTP API using [`reqwest`]. Status codes and envelopes are
//! folded into [`ServiceError`] here so the store never sees HTTP details.

use crate::config::{CartConfig, DEFAULT_BASE_URL};
use crate::model::{CartLineId, CartLinePatch, CartListing, NewCartLine};
use crate::service::envelope::Envelope;
use crate::service::error::{ServiceError, VALIDATION_CODE};
use crate::service::CartService;
use async_trait::async_trait;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const CART_PATH: &str = "/api/v1/cart";
const ITEMS_PATH: &str = "/api/v1/cart/items";
const CLEAR_PATH: &str = "/api/v1/cart/clear";

/// HTTP client for the remote cart service.
#[derive(Debug, Clone)]
pub struct HttpCartService {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

/// Error body shapes the backend produces for non-2xx responses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

impl HttpCartService {
    /// Create a client for `base_url` (e.g. `http://host:8000`) with a request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            token: None,
        }
    }

    pub fn from_config(config: &CartConfig) -> Result<Self, ServiceError> {
        let base_url = config.api_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let service = Self::new(base_url, config.http_timeout)?;
        Ok(match &config.api_token {
            Some(token) => service.with_token(token.clone()),
            None => service,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn item_url(&self, id: CartLineId) -> String {
        format!("{}{}/{}", self.base_url, ITEMS_PATH, id.0)
    }

    async fn send<T>(&self, request: reqwest::RequestBuilder) -> Result<Option<T>, ServiceError>
    where
        T: DeserializeOwned,
    {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Request did not reach the cart service");
            ServiceError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        debug!(status, len = body.len(), "Response received");
        decode_response(status, &body)
    }
}

/// Maps an HTTP status and body to the envelope result.
///
/// * 2xx - an empty body is success without data; otherwise the body must be an envelope
///   and only a present, non-zero code is a failure.
/// * 422 - validation failure, with FastAPI-style `detail` entries joined when present.
/// * other - [`ServiceError::Api`] with the status as code and the body's `message`.
pub fn decode_response<T>(status: u16, body: &[u8]) -> Result<Option<T>, ServiceError>
where
    T: DeserializeOwned,
{
    if (200..300).contains(&status) {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        let envelope: Envelope<T> = serde_json::from_slice(body).map_err(|e| ServiceError::Api {
            code: i64::from(status),
            message: Some(format!("Malformed response: {e}")),
        })?;
        return envelope.into_data();
    }

    let error: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    if i64::from(status) == VALIDATION_CODE {
        let message = error
            .detail
            .as_ref()
            .and_then(validation_detail)
            .or(error.message)
            .unwrap_or_else(|| "Invalid request parameters".to_string());
        return Err(ServiceError::Validation(message));
    }

    Err(ServiceError::Api {
        code: i64::from(status),
        message: error.message.or_else(|| default_status_message(status)),
    })
}

fn validation_detail(detail: &serde_json::Value) -> Option<String> {
    let entries = detail.as_array()?;
    let parts: Vec<String> = entries
        .iter()
        .map(|entry| {
            let field = entry
                .get("loc")
                .and_then(|loc| loc.as_array())
                .map(|loc| {
                    loc.iter()
                        .skip(1)
                        .map(|part| match part {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(".")
                })
                .filter(|field| !field.is_empty())
                .unwrap_or_else(|| "unknown".to_string());
            let msg = entry.get("msg").and_then(|m| m.as_str()).unwrap_or("invalid");
            format!("{field}: {msg}")
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

fn default_status_message(status: u16) -> Option<String> {
    let message = match status {
        401 => "Session expired, please sign in again",
        403 => "Access denied",
        404 => "Requested resource does not exist",
        500..=599 => "Server error",
        _ => return None,
    };
    Some(message.to_string())
}

#[async_trait]
impl CartService for HttpCartService {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Option<CartListing>, ServiceError> {
        self.send(self.client.get(self.url(CART_PATH))).await
    }

    #[instrument(skip(self))]
    async fn create(&self, line: NewCartLine) -> Result<(), ServiceError> {
        self.send::<IgnoredAny>(self.client.post(self.url(ITEMS_PATH)).json(&line))
            .await
            .map(|_| ())
    }

    #[instrument(skip(self))]
    async fn update(&self, id: CartLineId, patch: CartLinePatch) -> Result<(), ServiceError> {
        self.send::<IgnoredAny>(self.client.patch(self.item_url(id)).json(&patch))
            .await
            .map(|_| ())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: CartLineId) -> Result<(), ServiceError> {
        self.send::<IgnoredAny>(self.client.delete(self.item_url(id)))
            .await
            .map(|_| ())
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<(), ServiceError> {
        self.send::<IgnoredAny>(self.client.post(self.url(CLEAR_PATH)))
            .await
            .map(|_| ())
    }
}
