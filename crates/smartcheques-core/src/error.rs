use thiserror::Error;

/// Errors shared across the core data model: identifier and amount parsing,
/// and the handful of validation rules that apply to every subsystem's
/// entities rather than to one component alone.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Identifiers ──────────────────────────────────────────────────────────
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    // ── Amounts ──────────────────────────────────────────────────────────────
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("amount overflow")]
    AmountOverflow,

    // ── Currency ─────────────────────────────────────────────────────────────
    #[error("invalid currency code: {0}")]
    InvalidCurrencyCode(String),

    // ── Percentage / bounded values ──────────────────────────────────────────
    #[error("value {value} out of range [{min}, {max}]")]
    OutOfRange { value: String, min: String, max: String },

    #[error("missing required field: {0}")]
    MissingField(&'static str),
}
