use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Wall-clock timestamp. All entities timestamp in UTC.
pub type Timestamp = DateTime<Utc>;

macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|_| CoreError::InvalidIdentifier(s.to_string()))
            }
        }
    };
}

uuid_id!(EnterpriseId);
uuid_id!(TransactionId);
uuid_id!(ContractId);
uuid_id!(ObligationId);
uuid_id!(MilestoneId);
uuid_id!(SmartChequeId);
uuid_id!(WithdrawalRequestId);
uuid_id!(ApproverId);
uuid_id!(OracleProviderId);
uuid_id!(OracleRequestId);
uuid_id!(DisputeId);
uuid_id!(RefundId);
uuid_id!(PartialPaymentId);
uuid_id!(AlertId);
uuid_id!(ThresholdId);
uuid_id!(UserId);

/// A currency/asset code, e.g. `USDT`, `XRP`, or the literal `e₹`.
///
/// Codes canonicalize to uppercase, with one conventional exception.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidCurrencyCode(raw.to_string()));
        }
        let canonical = if trimmed == "e₹" {
            trimmed.to_string()
        } else {
            trimmed.to_uppercase()
        };
        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CurrencyCode({})", self.0)
    }
}

/// A monetary amount. Wire form is always a decimal string; arithmetic runs
/// on an arbitrary-precision decimal, never a float.
///
/// Parsing is the only place a malformed amount can be rejected — once a
/// `Money` exists it is known non-negative.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let value =
            Decimal::from_str(raw.trim()).map_err(|_| CoreError::InvalidAmount(raw.to_string()))?;
        if value.is_sign_negative() {
            return Err(CoreError::InvalidAmount(raw.to_string()));
        }
        Ok(Money(value))
    }

    pub fn from_decimal(value: Decimal) -> Result<Self, CoreError> {
        if value.is_sign_negative() {
            return Err(CoreError::InvalidAmount(value.to_string()));
        }
        Ok(Money(value))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn checked_add(&self, other: &Money) -> Result<Money, CoreError> {
        self.0.checked_add(other.0).map(Money).ok_or(CoreError::AmountOverflow)
    }

    pub fn checked_sub(&self, other: &Money) -> Result<Money, CoreError> {
        let result = self.0.checked_sub(other.0).ok_or(CoreError::AmountOverflow)?;
        if result.is_sign_negative() {
            return Err(CoreError::AmountOverflow);
        }
        Ok(Money(result))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl FromStr for Money {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl TryFrom<String> for Money {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Money::parse(&value)
    }
}

impl From<Money> for String {
    fn from(value: Money) -> Self {
        value.0.to_string()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Money({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_rejects_negative_amounts() {
        assert!(Money::parse("-1").is_err());
    }

    #[test]
    fn money_rejects_garbage() {
        assert!(Money::parse("not-a-number").is_err());
    }

    #[test]
    fn money_add_sub_roundtrip() {
        let a = Money::parse("100.50").unwrap();
        let b = Money::parse("40.25").unwrap();
        let sum = a.checked_add(&b).unwrap();
        assert_eq!(sum.to_string(), "140.75");
        let back = sum.checked_sub(&b).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn money_sub_below_zero_is_overflow() {
        let a = Money::parse("5").unwrap();
        let b = Money::parse("10").unwrap();
        assert!(a.checked_sub(&b).is_err());
    }

    #[test]
    fn currency_code_canonicalizes_except_e_rupee() {
        assert_eq!(CurrencyCode::new("usdt").unwrap().as_str(), "USDT");
        assert_eq!(CurrencyCode::new("e₹").unwrap().as_str(), "e₹");
    }
}
