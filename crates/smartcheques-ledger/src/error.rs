use smartcheques_core::{CoreError, Money};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    // ── Asset registry ───────────────────────────────────────────────────────
    #[error("currency not supported: {0}")]
    UnsupportedCurrency(String),

    #[error("currency already registered: {0}")]
    DuplicateCurrency(String),

    #[error("currency {0} is deactivated")]
    CurrencyInactive(String),

    #[error("asset minimum must be <= maximum")]
    MinExceedsMax,

    #[error("decimal places must be between 0 and 18")]
    InvalidDecimals,

    #[error("transfer fee must be within [0, 1]")]
    InvalidTransferFee,

    #[error("cannot deactivate {0}: balances still reference this currency")]
    AssetInUse(String),

    // ── Balance ──────────────────────────────────────────────────────────────
    #[error("amount {amount} below minimum {minimum} for {currency}")]
    BelowMinimum { currency: String, amount: Money, minimum: Money },

    #[error("amount {amount} above maximum {maximum} for {currency}")]
    AboveMaximum { currency: String, amount: Money, maximum: Money },

    #[error("balance not found for enterprise {enterprise} currency {currency}")]
    BalanceNotFound { enterprise: String, currency: String },

    #[error("balance is frozen: {reason}")]
    BalanceFrozen { reason: String },

    #[error("insufficient available balance: need {need}, have {available}")]
    InsufficientAvailable { need: Money, available: Money },

    #[error("insufficient reserved balance: need {need}, have {reserved}")]
    InsufficientReserved { need: Money, reserved: Money },

    // ── Shared ───────────────────────────────────────────────────────────────
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("persistence error: {0}")]
    Store(String),
}
