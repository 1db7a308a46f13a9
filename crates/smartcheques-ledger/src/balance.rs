use serde::{Deserialize, Serialize};
use smartcheques_core::{CurrencyCode, EnterpriseId, Money, Timestamp, TransactionId};

use crate::error::LedgerError;

/// Per-enterprise, per-currency balance.
///
/// Invariant: `available + reserved == total` at all times as seen by the
/// ledger itself; `total` may diverge from `external` only transiently, and
/// that divergence surfaces through [`ConsistencyReport`] rather than being
/// silently corrected.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnterpriseBalance {
    pub enterprise_id: EnterpriseId,
    pub currency_code: CurrencyCode,
    pub available: Money,
    pub reserved: Money,
    pub total: Money,
    pub external: Money,
    pub is_frozen: bool,
    pub freeze_reason: Option<String>,
    pub last_external_sync: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl EnterpriseBalance {
    pub fn new(enterprise_id: EnterpriseId, currency_code: CurrencyCode, now: Timestamp) -> Self {
        Self {
            enterprise_id,
            currency_code,
            available: Money::ZERO,
            reserved: Money::ZERO,
            total: Money::ZERO,
            external: Money::ZERO,
            is_frozen: false,
            freeze_reason: None,
            last_external_sync: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The kind of mutation recorded against a balance. Determines sign and
/// which of `available`/`reserved`/`total` a transaction touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Deposit,
    Withdrawal,
    EscrowLock,
    EscrowRelease,
    TransferIn,
    TransferOut,
    Fee,
    Refund,
}

impl OperationType {
    /// True if this operation type reduces the enterprise's net position.
    pub fn is_debit(&self) -> bool {
        matches!(self, OperationType::Withdrawal | OperationType::TransferOut | OperationType::Fee)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

/// An append-only record of a ledger mutation. Never mutated once terminal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssetTransaction {
    pub id: TransactionId,
    pub enterprise_id: EnterpriseId,
    pub currency_code: CurrencyCode,
    pub op_type: OperationType,
    pub amount: Money,
    pub reference: Option<String>,
    pub status: TransactionStatus,
    pub metadata: std::collections::HashMap<String, serde_json::Value>,
    pub created_at: Timestamp,
}

/// Signed difference between the ledger's view and the external collaborator's.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub enterprise_id: EnterpriseId,
    pub currency_code: CurrencyCode,
    pub total: Money,
    pub external: Money,
    pub is_consistent: bool,
    /// `total - external`, signed. Positive means the ledger believes it
    /// holds more than the external collaborator has recorded.
    pub discrepancy: rust_decimal::Decimal,
    pub checked_at: Timestamp,
}

/// A single (deposit/withdrawal/...) request against a balance. The request
/// is validated, then applied, inside the same ledger-engine call.
#[derive(Clone, Debug)]
pub struct LedgerOpRequest {
    pub enterprise_id: EnterpriseId,
    pub currency_code: CurrencyCode,
    pub op_type: OperationType,
    pub amount: Money,
    pub reference: Option<String>,
}

/// Computes the `(available, reserved, total)` delta for an operation type.
/// `EscrowLock`/`EscrowRelease` move money between `available` and `reserved`
/// without changing `total`; every other op changes `total` by the same
/// signed amount as `available`.
pub fn apply_delta(
    balance: &mut EnterpriseBalance,
    op_type: OperationType,
    amount: Money,
) -> Result<(), LedgerError> {
    match op_type {
        OperationType::Deposit | OperationType::TransferIn | OperationType::Refund => {
            balance.available = balance.available.checked_add(&amount)?;
            balance.total = balance.total.checked_add(&amount)?;
        }
        OperationType::Withdrawal | OperationType::TransferOut | OperationType::Fee => {
            if balance.available < amount {
                return Err(LedgerError::InsufficientAvailable { need: amount, available: balance.available });
            }
            balance.available = balance.available.checked_sub(&amount)?;
            balance.total = balance.total.checked_sub(&amount)?;
        }
        OperationType::EscrowLock => {
            if balance.available < amount {
                return Err(LedgerError::InsufficientAvailable { need: amount, available: balance.available });
            }
            balance.available = balance.available.checked_sub(&amount)?;
            balance.reserved = balance.reserved.checked_add(&amount)?;
        }
        OperationType::EscrowRelease => {
            if balance.reserved < amount {
                return Err(LedgerError::InsufficientReserved { need: amount, reserved: balance.reserved });
            }
            balance.reserved = balance.reserved.checked_sub(&amount)?;
            balance.available = balance.available.checked_add(&amount)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn balance(available: &str, reserved: &str, total: &str) -> EnterpriseBalance {
        let mut b = EnterpriseBalance::new(
            EnterpriseId::new(),
            CurrencyCode::new("USDT").unwrap(),
            Utc::now(),
        );
        b.available = Money::parse(available).unwrap();
        b.reserved = Money::parse(reserved).unwrap();
        b.total = Money::parse(total).unwrap();
        b
    }

    #[test]
    fn escrow_lock_then_release_is_a_no_op() {
        let mut b = balance("200000", "0", "200000");
        let amount = Money::parse("50000").unwrap();
        apply_delta(&mut b, OperationType::EscrowLock, amount).unwrap();
        assert_eq!(b.available.to_string(), "150000");
        assert_eq!(b.reserved.to_string(), "50000");
        apply_delta(&mut b, OperationType::EscrowRelease, amount).unwrap();
        assert_eq!(b.available.to_string(), "200000");
        assert_eq!(b.reserved.to_string(), "0");
    }

    #[test]
    fn withdrawal_below_available_fails() {
        let mut b = balance("100", "0", "100");
        let amount = Money::parse("101").unwrap();
        assert!(apply_delta(&mut b, OperationType::Withdrawal, amount).is_err());
    }

    #[test]
    fn available_plus_reserved_equals_total_invariant_holds() {
        let mut b = balance("200000", "0", "200000");
        apply_delta(&mut b, OperationType::EscrowLock, Money::parse("50000").unwrap()).unwrap();
        assert_eq!(
            b.available.checked_add(&b.reserved).unwrap(),
            b.total,
        );
    }
}
