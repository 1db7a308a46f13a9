use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("threshold not found: {0}")]
    ThresholdNotFound(String),

    #[error("alert not found: {0}")]
    AlertNotFound(String),

    #[error("threshold value must be finite")]
    InvalidThreshold,
}
