use serde::{Deserialize, Serialize};
use smartcheques_core::{AlertId, ThresholdId, Timestamp};

use crate::threshold::Severity;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub threshold_id: Option<ThresholdId>,
    pub metric: String,
    pub service: String,
    pub value: f64,
    pub severity: Severity,
    pub message: String,
    pub resolved: bool,
    pub created_at: Timestamp,
    pub resolved_at: Option<Timestamp>,
}
