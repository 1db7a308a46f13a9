use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::NotifyError;

/// Outbound email delivery. No SMTP or template-rendering logic lives here;
/// the fabric composes the final subject/body before handing it off.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Outbound webhook delivery: one POST-shaped call with a JSON payload.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn send(&self, url: &str, payload: Value) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Default)]
pub struct NoopEmailTransport {
    sent: Mutex<Vec<SentEmail>>,
}

impl NoopEmailTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl EmailTransport for NoopEmailTransport {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        self.sent.lock().await.push(SentEmail { to: to.to_string(), subject: subject.to_string(), body: body.to_string() });
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SentWebhook {
    pub url: String,
    pub payload: Value,
}

#[derive(Default)]
pub struct NoopWebhookTransport {
    sent: Mutex<Vec<SentWebhook>>,
}

impl NoopWebhookTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<SentWebhook> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl WebhookTransport for NoopWebhookTransport {
    async fn send(&self, url: &str, payload: Value) -> Result<(), NotifyError> {
        self.sent.lock().await.push(SentWebhook { url: url.to_string(), payload });
        Ok(())
    }
}
