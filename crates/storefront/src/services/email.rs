//! Transactional email via the Resend API.
//!
//! Receipts and expiry reminders are plain HTML emails. Delivery is never
//! on the critical path of an order: a send failure is logged and the
//! order stands.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use thiserror::Error;

use cirrus_core::Email;

use crate::config::EmailConfig;

/// Resend API endpoint.
const API_URL: &str = "https://api.resend.com/emails";

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum MailerError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Resend email client.
#[derive(Clone)]
pub struct Mailer {
    http: reqwest::Client,
    api_key: SecretString,
    from: String,
}

impl Mailer {
    /// Create a new mailer from configuration.
    #[must_use]
    pub fn new(config: &EmailConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            http,
            api_key: config.api_key.clone(),
            from: config.from.clone(),
        }
    }

    /// Send one HTML email.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Resend rejects it.
    pub async fn send(&self, to: &Email, subject: &str, html: &str) -> Result<(), MailerError> {
        let body = json!({
            "from": self.from,
            "to": [to.as_str()],
            "subject": subject,
            "html": html,
        });

        let response = self
            .http
            .post(API_URL)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MailerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!(to = %to, subject, "email sent");
        Ok(())
    }

    /// Send an email in a detached task, logging failure instead of
    /// surfacing it. Used for receipts, which must never affect the order
    /// they describe.
    pub fn send_detached(&self, to: Email, subject: String, html: String) {
        let mailer = self.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.send(&to, &subject, &html).await {
                tracing::warn!(to = %to, subject, "failed to send email: {e}");
            }
        });
    }
}
