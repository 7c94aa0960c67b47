//! Outbound email. Interview code only sees the `Mailer` trait.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("mail API rejected message (status {status}): {message}")]
    Rejected { status: u16, message: String },
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError>;
}

#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Posts messages as JSON to a transactional-mail HTTP API.
pub struct HttpMailer {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(api_url: String, api_key: Option<String>, from: String) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_url,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
        let mut request = self.client.post(&self.api_url).json(&OutboundMessage {
            from: &self.from,
            to,
            subject,
            html,
        });
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        info!("Sent '{subject}' to {to}");
        Ok(())
    }
}

/// Used when no mail API is configured: the message is logged, not sent.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
        info!(
            "Mail delivery disabled; would send '{subject}' to {to} ({} bytes)",
            html.len()
        );
        Ok(())
    }
}

/// Picks the HTTP mailer when an endpoint is configured, otherwise the log mailer.
pub fn mailer_from_config(config: &MailConfig) -> Arc<dyn Mailer> {
    match &config.api_url {
        Some(url) => Arc::new(HttpMailer::new(
            url.clone(),
            config.api_key.clone(),
            config.from.clone(),
        )),
        None => Arc::new(LogMailer),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        assert!(LogMailer.send("a@b.c", "Hi", "<p>hi</p>").await.is_ok());
    }

    #[test]
    fn test_outbound_message_shape() {
        let json = serde_json::to_value(OutboundMessage {
            from: "no-reply@x.io",
            to: "cand@x.io",
            subject: "Results",
            html: "<p>ok</p>",
        })
        .unwrap();
        assert_eq!(json["to"], "cand@x.io");
        assert_eq!(json["html"], "<p>ok</p>");
    }
}
