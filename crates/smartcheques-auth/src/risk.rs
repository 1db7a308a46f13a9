use serde::{Deserialize, Serialize};
use smartcheques_core::constants::{
    RISK_LEVEL_HIGH_MAX, RISK_LEVEL_LOW_MAX, RISK_LEVEL_MODERATE_MAX, RISK_WEIGHT_AMOUNT,
    RISK_WEIGHT_DESTINATION_NOVELTY, RISK_WEIGHT_TIME_OF_DAY, RISK_WEIGHT_VELOCITY,
};
use smartcheques_core::Money;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score < RISK_LEVEL_LOW_MAX {
            RiskLevel::Low
        } else if score < RISK_LEVEL_MODERATE_MAX {
            RiskLevel::Moderate
        } else if score < RISK_LEVEL_HIGH_MAX {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }
}

/// The raw signals a risk assessment is computed from. Recomputed fresh on
/// every request, never cached.
#[derive(Clone, Debug)]
pub struct RiskInput {
    pub amount: Money,
    /// A reference amount the enterprise normally moves; the amount factor
    /// grows toward 1.0 as `amount` approaches or exceeds this.
    pub typical_amount: Money,
    pub hour_of_day: u32,
    pub is_new_destination: bool,
    pub recent_transaction_count: u32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RiskScore {
    pub score: f64,
    pub level: RiskLevel,
}

const OFF_HOURS_START: u32 = 22;
const OFF_HOURS_END: u32 = 6;
const VELOCITY_SATURATION: f64 = 10.0;

/// Weighted sum of four factors: amount size, time of day, destination
/// novelty, and velocity. Each factor is normalized to `[0, 1]` before the
/// weights (which sum to 1.0) are applied.
pub fn assess(input: &RiskInput) -> RiskScore {
    let amount_factor = if input.typical_amount.is_zero() {
        1.0
    } else {
        (input.amount.as_decimal() / input.typical_amount.as_decimal())
            .to_string()
            .parse::<f64>()
            .unwrap_or(1.0)
            .min(1.0)
    };

    let is_off_hours = input.hour_of_day >= OFF_HOURS_START || input.hour_of_day < OFF_HOURS_END;
    let time_factor = if is_off_hours { 1.0 } else { 0.3 };

    let destination_factor = if input.is_new_destination { 1.0 } else { 0.1 };

    let velocity_factor = (input.recent_transaction_count as f64 / VELOCITY_SATURATION).min(1.0);

    let score = RISK_WEIGHT_AMOUNT * amount_factor
        + RISK_WEIGHT_TIME_OF_DAY * time_factor
        + RISK_WEIGHT_DESTINATION_NOVELTY * destination_factor
        + RISK_WEIGHT_VELOCITY * velocity_factor;

    RiskScore { score, level: RiskLevel::from_score(score) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(amount: &str, typical: &str, hour: u32, new_dest: bool, velocity: u32) -> RiskInput {
        RiskInput {
            amount: Money::parse(amount).unwrap(),
            typical_amount: Money::parse(typical).unwrap(),
            hour_of_day: hour,
            is_new_destination: new_dest,
            recent_transaction_count: velocity,
        }
    }

    #[test]
    fn low_everything_yields_low_band() {
        let score = assess(&input("100", "100000", 12, false, 0));
        assert_eq!(score.level, RiskLevel::Low);
    }

    #[test]
    fn large_off_hours_new_destination_is_high_or_critical() {
        let score = assess(&input("80000", "1000", 2, true, 8));
        assert!(score.score >= RISK_LEVEL_MODERATE_MAX);
    }

    #[test]
    fn band_boundaries_match_thresholds() {
        assert_eq!(RiskLevel::from_score(0.29), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.3), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(0.6), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.8), RiskLevel::Critical);
    }
}
