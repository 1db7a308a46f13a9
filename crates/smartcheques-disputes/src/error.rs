use smartcheques_core::CoreError;
use smartcheques_ledger::LedgerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DisputeError {
    #[error("dispute not found: {0}")]
    NotFound(String),

    #[error("refund request not found: {0}")]
    RefundNotFound(String),

    #[error("partial payment request not found: {0}")]
    PartialPaymentNotFound(String),

    #[error("dispute {0} is not in a refundable state")]
    NotRefundable(String),

    #[error("refund amount must be within (0, {max}]")]
    InvalidRefundAmount { max: String },

    #[error("partial payment amount must be within (0, {original})")]
    InvalidPartialAmount { original: String },

    #[error("cannot transition {record} from {from:?} to {to:?}")]
    InvalidTransition { record: String, from: String, to: String },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("persistence error: {0}")]
    Store(String),
}
