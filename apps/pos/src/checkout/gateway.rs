//! # Order Gateway
//!
//! The boundary to the order-creation endpoint.
//!
//! The only contract with the endpoint: send the payload, learn whether it
//! was accepted. The request/response schema beyond that belongs to the API.

use std::time::Duration;

use apotek_core::CheckoutPayload;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::state::ConfigState;

/// Acknowledgement of an accepted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAck {
    /// Server-side order id, when the API returns one.
    pub order_id: Option<String>,
}

/// Errors that can occur when submitting an order.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport, timeout or body decoding failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered but did not accept the order.
    #[error("order rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Something that can create orders.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn create_order(&self, payload: &CheckoutPayload) -> Result<OrderAck, GatewayError>;
}

/// Configuration for [`HttpOrderGateway`].
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// API base, e.g. `"https://api.apotek.test/api"`.
    pub base_url: String,

    /// Bearer token, if the API requires one.
    pub token: Option<String>,

    /// Whole-request timeout.
    pub timeout: Duration,
}

impl From<&ConfigState> for HttpGatewayConfig {
    fn from(config: &ConfigState) -> Self {
        HttpGatewayConfig {
            base_url: config.order_api_url.clone(),
            token: config.api_token.clone(),
            timeout: config.request_timeout(),
        }
    }
}

/// JSON-over-HTTP order gateway: `POST {base_url}/transactions`.
#[derive(Debug, Clone)]
pub struct HttpOrderGateway {
    config: HttpGatewayConfig,
    http: Client,
}

impl HttpOrderGateway {
    /// Creates a gateway with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: HttpGatewayConfig) -> Result<Self, GatewayError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(config, http))
    }

    /// Creates a gateway over an existing HTTP client.
    ///
    /// The client's own timeout applies; `config.timeout` is not re-applied.
    #[must_use]
    pub fn with_client(config: HttpGatewayConfig, http: Client) -> Self {
        Self { config, http }
    }

    fn endpoint(&self) -> String {
        format!("{}/transactions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl OrderGateway for HttpOrderGateway {
    async fn create_order(&self, payload: &CheckoutPayload) -> Result<OrderAck, GatewayError> {
        let mut request = self.http.post(self.endpoint()).json(payload);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        interpret_success_body(status.as_u16(), &text)
    }
}

/// Reads a 2xx body.
///
/// An empty or non-JSON body counts as accepted. A JSON body with
/// `"success": false` is a rejection. The order id is taken from `id` or
/// `data.id` when present.
fn interpret_success_body(status: u16, text: &str) -> Result<OrderAck, GatewayError> {
    let Ok(body) = serde_json::from_str::<Value>(text) else {
        return Ok(OrderAck { order_id: None });
    };

    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(GatewayError::Rejected {
            status,
            message: error_message(text),
        });
    }

    let id = body
        .get("id")
        .or_else(|| body.get("data").and_then(|d| d.get("id")));
    let order_id = id.and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });

    Ok(OrderAck { order_id })
}

/// Best-effort human message from an error body.
fn error_message(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|body| {
            body.get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| text.trim().to_string())
}
