use async_trait::async_trait;
use serde_json::Value;

use crate::error::OracleError;
use crate::provider::OracleProvider;

/// Outbound call to an `api`/`webhook` provider. The core never performs the
/// HTTP call itself; it hands the condition off to whatever transport the
/// embedder wires in and awaits a typed outcome or a timeout.
#[async_trait]
pub trait OracleTransport: Send + Sync {
    async fn submit(&self, provider: &OracleProvider, condition_key: &str) -> Result<Value, OracleError>;
}

/// Test double that always returns a fixed outcome without making a call.
pub struct NoopTransport {
    pub outcome: Value,
}

impl NoopTransport {
    pub fn new(outcome: Value) -> Self {
        Self { outcome }
    }
}

#[async_trait]
impl OracleTransport for NoopTransport {
    async fn submit(&self, _provider: &OracleProvider, _condition_key: &str) -> Result<Value, OracleError> {
        Ok(self.outcome.clone())
    }
}
