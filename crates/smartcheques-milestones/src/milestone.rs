use serde::{Deserialize, Serialize};
use smartcheques_core::{ContractId, MilestoneId, Timestamp};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    Pending,
    InProgress,
    Verified,
    Completed,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

/// A single deliverable within a contract's obligation schedule.
///
/// `dependencies` reference other milestones in the same contract; the
/// engine enforces that this forms a DAG and that `pending -> in_progress`
/// is only reachable once every dependency is `completed`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Milestone {
    pub id: MilestoneId,
    pub contract_id: ContractId,
    pub sequence_order: u32,
    pub title: String,
    pub trigger_conditions: String,
    pub verification_criteria: String,
    pub dependencies: Vec<MilestoneId>,
    pub percentage_complete: f64,
    pub status: MilestoneStatus,
    pub estimated_start: Option<Timestamp>,
    pub estimated_end: Option<Timestamp>,
    pub actual_start: Option<Timestamp>,
    pub actual_end: Option<Timestamp>,
    pub estimated_duration_secs: Option<i64>,
    pub actual_duration_secs: Option<i64>,
    pub priority: Priority,
    pub category: String,
    pub risk_level: RiskLevel,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Milestone {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        contract_id: ContractId,
        sequence_order: u32,
        title: String,
        trigger_conditions: String,
        verification_criteria: String,
        dependencies: Vec<MilestoneId>,
        priority: Priority,
        category: String,
        risk_level: RiskLevel,
        now: Timestamp,
    ) -> Self {
        Self {
            id: MilestoneId::new(),
            contract_id,
            sequence_order,
            title,
            trigger_conditions,
            verification_criteria,
            dependencies,
            percentage_complete: 0.0,
            status: MilestoneStatus::Pending,
            estimated_start: None,
            estimated_end: None,
            actual_start: None,
            actual_end: None,
            estimated_duration_secs: None,
            actual_duration_secs: None,
            priority,
            category,
            risk_level,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_overdue(&self, now: Timestamp) -> bool {
        matches!(self.status, MilestoneStatus::Pending | MilestoneStatus::InProgress)
            && self.estimated_end.is_some_and(|end| end < now)
    }
}
