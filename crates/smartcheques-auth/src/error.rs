use smartcheques_core::CoreError;
use smartcheques_ledger::LedgerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("withdrawal request not found: {0}")]
    NotFound(String),

    #[error("request amount exceeds available balance")]
    AmountExceedsAvailable,

    #[error("approver {0} has already recorded a decision for this request")]
    DuplicateApprover(String),

    #[error("request {0} is already in a terminal state")]
    AlreadyTerminal(String),

    #[error("time lock active until {until}")]
    TimeLockActive { until: String },

    #[error("principal lacks required capability: {0}")]
    MissingCapability(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("persistence error: {0}")]
    Store(String),
}
