//! PayPal Orders v2 API client.
//!
//! The storefront treats PayPal as an opaque function from an amount to a
//! capture reference: `create_order` opens a gateway order for the cart
//! total, the customer approves it in PayPal's hosted flow, and
//! `capture_order` captures the funds and yields the reference stored on
//! our order row. Anything other than a `COMPLETED` capture is a failure.

use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use cirrus_core::{CurrencyCode, gateway_amount};

use crate::config::PayPalConfig;

/// Errors that can occur when talking to PayPal.
#[derive(Debug, Error)]
pub enum PayPalError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The capture came back in a non-completed state.
    #[error("payment not completed (status {status})")]
    Declined { status: String },

    /// Failed to parse a response.
    #[error("parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CaptureResponse {
    id: String,
    status: String,
    #[serde(default)]
    purchase_units: Vec<PurchaseUnit>,
}

#[derive(Debug, Deserialize)]
struct PurchaseUnit {
    payments: Option<Payments>,
}

#[derive(Debug, Deserialize)]
struct Payments {
    #[serde(default)]
    captures: Vec<Capture>,
}

#[derive(Debug, Deserialize)]
struct Capture {
    id: String,
}

/// PayPal REST API client.
#[derive(Clone)]
pub struct PayPalClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: SecretString,
    currency: CurrencyCode,
}

impl PayPalClient {
    /// Create a new PayPal client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &PayPalConfig) -> Result<Self, PayPalError> {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        // A gateway call that hangs is a failure, never an assumed success.
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base().to_owned(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            currency: config.currency,
        })
    }

    /// Fetch an OAuth2 access token via client credentials.
    async fn access_token(&self) -> Result<String, PayPalError> {
        let url = format!("{}/v1/oauth2/token", self.base_url);
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.client_id, Some(self.client_secret.expose_secret()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PayPalError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| PayPalError::Parse(e.to_string()))?;
        Ok(token.access_token)
    }

    /// Create a gateway order for the given amount with intent CAPTURE.
    ///
    /// Returns the gateway order ID the client-side approval flow needs.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or PayPal rejects the order.
    pub async fn create_order(&self, amount: Decimal) -> Result<String, PayPalError> {
        let token = self.access_token().await?;
        let value = gateway_amount(amount);
        let currency = self.currency.code();

        let body = json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "amount": {
                    "currency_code": currency,
                    "value": value,
                    "breakdown": {
                        "item_total": {
                            "currency_code": currency,
                            "value": value,
                        }
                    }
                }
            }]
        });

        let url = format!("{}/v2/checkout/orders", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PayPalError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let order: OrderResponse = response
            .json()
            .await
            .map_err(|e| PayPalError::Parse(e.to_string()))?;

        tracing::debug!(gateway_order = %order.id, amount = %value, "created PayPal order");
        Ok(order.id)
    }

    /// Capture an approved gateway order.
    ///
    /// Returns the capture reference on success.
    ///
    /// # Errors
    ///
    /// Returns [`PayPalError::Declined`] if the capture is anything other
    /// than `COMPLETED`, or an API/HTTP error otherwise.
    pub async fn capture_order(&self, gateway_order_id: &str) -> Result<String, PayPalError> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/v2/checkout/orders/{gateway_order_id}/capture",
            self.base_url
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&json!({}))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PayPalError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let capture: CaptureResponse = response
            .json()
            .await
            .map_err(|e| PayPalError::Parse(e.to_string()))?;

        if capture.status != "COMPLETED" {
            return Err(PayPalError::Declined {
                status: capture.status,
            });
        }

        // Prefer the capture ID; the order ID is an acceptable fallback
        // reference when the capture list is absent.
        let reference = capture
            .purchase_units
            .into_iter()
            .filter_map(|u| u.payments)
            .flat_map(|p| p.captures)
            .map(|c| c.id)
            .next()
            .unwrap_or(capture.id);

        Ok(reference)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_response_extracts_capture_id() {
        let raw = r#"{
            "id": "5O190127TN364715T",
            "status": "COMPLETED",
            "purchase_units": [{
                "payments": { "captures": [{ "id": "3C679366HH908993F" }] }
            }]
        }"#;
        let capture: CaptureResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(capture.status, "COMPLETED");
        let first = capture
            .purchase_units
            .into_iter()
            .filter_map(|u| u.payments)
            .flat_map(|p| p.captures)
            .map(|c| c.id)
            .next();
        assert_eq!(first.as_deref(), Some("3C679366HH908993F"));
    }

    #[test]
    fn test_capture_response_without_captures_parses() {
        let raw = r#"{ "id": "5O190127TN364715T", "status": "DECLINED" }"#;
        let capture: CaptureResponse = serde_json::from_str(raw).unwrap();
        assert!(capture.purchase_units.is_empty());
        assert_eq!(capture.status, "DECLINED");
    }
}
