use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use smartcheques_core::{DisputeId, EnterpriseId, SmartChequeId, Timestamp};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    Initiated,
    UnderReview,
    Resolved,
    Closed,
    Escalated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub description: String,
    pub submitted_by: String,
    pub submitted_at: Timestamp,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Dispute {
    pub id: DisputeId,
    pub enterprise_id: EnterpriseId,
    pub smart_cheque_id: SmartChequeId,
    pub title: String,
    pub category: String,
    pub priority: Priority,
    pub status: DisputeStatus,
    pub disputed_amount: Option<smartcheques_core::Money>,
    pub evidence: Vec<EvidenceItem>,
    pub metadata: HashMap<String, Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Dispute {
    pub fn is_refundable(&self) -> bool {
        matches!(self.status, DisputeStatus::Resolved | DisputeStatus::Closed)
    }
}
