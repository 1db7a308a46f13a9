use serde::{Deserialize, Serialize};
use smartcheques_core::{CurrencyCode, Money, Timestamp};

use crate::error::LedgerError;

/// Classification of a supported currency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Native,
    Stablecoin,
    Cbdc,
    Wrapped,
}

/// A currency the ledger knows how to hold balances in.
///
/// Registration is close to immutable: once enterprises hold balances in a
/// code, it can be updated (fee, limits) but not deactivated until every
/// referencing balance is gone.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SupportedAsset {
    pub code: CurrencyCode,
    pub class: AssetClass,
    pub decimals: u8,
    pub minimum: Money,
    pub maximum: Option<Money>,
    pub issuer: Option<String>,
    pub trust_line_limit: Option<Money>,
    pub transfer_fee: f64,
    pub is_frozen: bool,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SupportedAsset {
    pub fn validate(&self) -> Result<(), LedgerError> {
        if let Some(max) = self.maximum {
            if self.minimum > max {
                return Err(LedgerError::MinExceedsMax);
            }
        }
        if self.decimals > smartcheques_core::constants::MAX_ASSET_DECIMALS {
            return Err(LedgerError::InvalidDecimals);
        }
        if !(0.0..=1.0).contains(&self.transfer_fee) {
            return Err(LedgerError::InvalidTransferFee);
        }
        Ok(())
    }

    pub fn check_amount(&self, amount: &Money) -> Result<(), LedgerError> {
        if *amount < self.minimum {
            return Err(LedgerError::BelowMinimum {
                currency: self.code.to_string(),
                amount: *amount,
                minimum: self.minimum,
            });
        }
        if let Some(max) = self.maximum {
            if *amount > max {
                return Err(LedgerError::AboveMaximum {
                    currency: self.code.to_string(),
                    amount: *amount,
                    maximum: max,
                });
            }
        }
        Ok(())
    }
}
