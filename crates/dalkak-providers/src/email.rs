use futures::future::BoxFuture;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use dalkak_core::config::{configured, EmailConfig};
use dalkak_core::error::{FlowError, Result};
use dalkak_core::traits::{EmailMessage, EmailReceipt, EmailSender};

use crate::providers::read_json;

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Sends through the Resend HTTP API.
pub struct ResendEmailSender {
    http: Client,
    api_key: String,
    from: String,
    url: String,
}

impl ResendEmailSender {
    /// `None` when no API key is configured, which puts `send_email` nodes in
    /// mock mode.
    pub fn from_config(config: &EmailConfig) -> Option<Self> {
        let api_key = config.api_key()?;
        Some(Self {
            http: Client::new(),
            api_key: api_key.to_string(),
            from: config.from.clone(),
            url: configured(&config.base_url).unwrap_or(RESEND_API_URL).to_string(),
        })
    }
}

#[derive(Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

impl EmailSender for ResendEmailSender {
    fn name(&self) -> &str {
        "resend"
    }

    fn send(&self, message: EmailMessage) -> BoxFuture<'_, Result<EmailReceipt>> {
        Box::pin(async move {
            let body = ResendRequest {
                from: &self.from,
                to: [&message.to],
                subject: &message.subject,
                html: &message.html,
            };
            debug!(to = %message.to, "Posting email to Resend");

            let response = self
                .http
                .post(&self.url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| FlowError::Http(e.to_string()))?;

            let data = read_json("Resend", response).await?;
            Ok(EmailReceipt {
                id: data.get("id").and_then(|v| v.as_str()).map(str::to_string),
            })
        })
    }
}
