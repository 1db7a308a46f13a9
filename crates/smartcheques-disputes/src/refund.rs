use serde::{Deserialize, Serialize};
use smartcheques_core::{DisputeId, Money, PartialPaymentId, RefundId, SmartChequeId, Timestamp};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Pending,
    Approved,
    Executing,
    Completed,
    Rejected,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundType {
    Full,
    Partial,
    Penalty,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Refund {
    pub id: RefundId,
    pub dispute_id: DisputeId,
    pub smart_cheque_id: SmartChequeId,
    pub amount: Money,
    pub reason: String,
    pub refund_type: RefundType,
    pub requested_by: String,
    pub status: RecordStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PartialPayment {
    pub id: PartialPaymentId,
    pub dispute_id: DisputeId,
    pub smart_cheque_id: SmartChequeId,
    pub amount: Money,
    pub original_amount: Money,
    pub milestone_completed: Option<bool>,
    pub status: RecordStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// `pending -> approved -> executing -> completed`, with `rejected`/`failed`
/// as alternative terminals reachable from any non-completed state.
pub fn can_transition(from: RecordStatus, to: RecordStatus) -> bool {
    use RecordStatus::*;
    matches!(
        (from, to),
        (Pending, Approved)
            | (Pending, Rejected)
            | (Approved, Executing)
            | (Approved, Rejected)
            | (Executing, Completed)
            | (Executing, Failed)
    )
}
