use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("connection not found")]
    ConnectionNotFound,

    #[error("email delivery failed: {0}")]
    EmailFailed(String),

    #[error("webhook delivery failed: {0}")]
    WebhookFailed(String),
}
