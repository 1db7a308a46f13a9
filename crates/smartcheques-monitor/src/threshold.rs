use serde::{Deserialize, Serialize};
use smartcheques_core::{Timestamp, ThresholdId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Gt,
    Lt,
    Gte,
    Lte,
    Eq,
}

impl Operator {
    fn breached(&self, value: f64, threshold: f64) -> bool {
        match self {
            Operator::Gt => value > threshold,
            Operator::Lt => value < threshold,
            Operator::Gte => value >= threshold,
            Operator::Lte => value <= threshold,
            Operator::Eq => (value - threshold).abs() < f64::EPSILON,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Threshold {
    pub id: ThresholdId,
    pub metric: String,
    pub service: String,
    pub threshold: f64,
    pub operator: Operator,
    pub severity: Severity,
    pub active: bool,
    pub created_at: Timestamp,
}

impl Threshold {
    /// True if `value`, sampled for this threshold's metric/service, breaches it.
    pub fn is_breached(&self, value: f64) -> bool {
        self.active && self.operator.breached(value, self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn threshold(op: Operator, value: f64) -> Threshold {
        Threshold {
            id: ThresholdId::new(),
            metric: "latency_ms".into(),
            service: "oracle".into(),
            threshold: value,
            operator: op,
            severity: Severity::Warning,
            active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn gt_breaches_above_threshold_only() {
        let t = threshold(Operator::Gt, 100.0);
        assert!(t.is_breached(101.0));
        assert!(!t.is_breached(100.0));
    }

    #[test]
    fn inactive_threshold_never_breaches() {
        let mut t = threshold(Operator::Gt, 100.0);
        t.active = false;
        assert!(!t.is_breached(1000.0));
    }
}
