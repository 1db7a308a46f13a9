use smartcheques_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("provider not found: {0}")]
    ProviderNotFound(String),

    #[error("provider name must not be empty")]
    EmptyName,

    #[error("endpoint is required for api/webhook providers")]
    EndpointRequired,

    #[error("provider {0} is not active")]
    ProviderInactive(String),

    #[error("request not found: {0}")]
    RequestNotFound(String),

    #[error("oracle transport call timed out")]
    Timeout,

    #[error("oracle transport call failed: {0}")]
    TransportFailed(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("persistence error: {0}")]
    Store(String),
}
