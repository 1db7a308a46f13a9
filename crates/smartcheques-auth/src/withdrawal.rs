use chrono::Duration;
use serde::{Deserialize, Serialize};
use smartcheques_core::{cap, ApproverId, CurrencyCode, EnterpriseId, Money, Principal, Timestamp, UserId, WithdrawalRequestId};

use crate::error::AuthError;
use crate::risk::RiskScore;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalType {
    Approve,
    Reject,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStatus {
    Pending,
    TimeLocked,
    Approved,
    Rejected,
    Processing,
    Completed,
    Cancelled,
    Expired,
}

/// One approver's recorded decision. A given approver appears at most once
/// per request — mirrors the teacher's per-validator dedup on a confirmed
/// vertex.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApprovalRecord {
    pub approver_id: ApproverId,
    pub approval_type: ApprovalType,
    pub comments: Option<String>,
    pub recorded_at: Timestamp,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WithdrawalAuthorization {
    pub id: WithdrawalRequestId,
    pub enterprise_id: EnterpriseId,
    pub initiated_by: UserId,
    pub currency_code: CurrencyCode,
    pub amount: Money,
    pub destination: String,
    pub purpose: Option<String>,
    pub required_approvals: u32,
    pub approvals: Vec<ApprovalRecord>,
    pub risk_score: f64,
    pub time_locked: bool,
    pub time_lock_expires_at: Option<Timestamp>,
    pub status: WithdrawalStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl WithdrawalAuthorization {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        enterprise_id: EnterpriseId,
        initiated_by: UserId,
        currency_code: CurrencyCode,
        amount: Money,
        destination: String,
        purpose: Option<String>,
        required_approvals: u32,
        risk: RiskScore,
        time_locked: bool,
        time_lock_expires_at: Option<Timestamp>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: WithdrawalRequestId::new(),
            enterprise_id,
            initiated_by,
            currency_code,
            amount,
            destination,
            purpose,
            required_approvals,
            approvals: Vec::new(),
            risk_score: risk.score,
            time_locked,
            time_lock_expires_at,
            status: if time_locked { WithdrawalStatus::TimeLocked } else { WithdrawalStatus::Pending },
            created_at: now,
            updated_at: now,
        }
    }

    pub fn current_approvals(&self) -> u32 {
        self.approvals.iter().filter(|a| a.approval_type == ApprovalType::Approve).count() as u32
    }

    fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            WithdrawalStatus::Rejected
                | WithdrawalStatus::Completed
                | WithdrawalStatus::Cancelled
                | WithdrawalStatus::Expired
        )
    }

    /// Records one approver's decision, deduping by approver and comparing
    /// the live approval count against `required_approvals` exactly the way
    /// the teacher's finality tracker compares a confirmation count against
    /// its threshold. A rejection is immediately terminal; reaching the
    /// required count flips status to `approved` only if no active time
    /// lock remains.
    pub fn record_decision(
        &mut self,
        approver_id: ApproverId,
        approval_type: ApprovalType,
        comments: Option<String>,
        now: Timestamp,
    ) -> Result<(), AuthError> {
        if self.is_terminal() {
            return Err(AuthError::AlreadyTerminal(self.id.to_string()));
        }
        if self.approvals.iter().any(|a| a.approver_id == approver_id) {
            return Err(AuthError::DuplicateApprover(approver_id.to_string()));
        }

        self.approvals.push(ApprovalRecord { approver_id, approval_type, comments, recorded_at: now });
        self.updated_at = now;

        if approval_type == ApprovalType::Reject {
            self.status = WithdrawalStatus::Rejected;
            return Ok(());
        }

        if self.current_approvals() >= self.required_approvals {
            let lock_expired = match self.time_lock_expires_at {
                Some(expiry) => now >= expiry,
                None => true,
            };
            if !self.time_locked || lock_expired {
                self.status = WithdrawalStatus::Approved;
            }
        }
        Ok(())
    }

    /// Re-evaluates whether an active time lock has since expired, flipping
    /// `time_locked` requests whose count was already met to `approved`.
    pub fn recheck_time_lock(&mut self, now: Timestamp) {
        if self.status == WithdrawalStatus::TimeLocked
            && self.current_approvals() >= self.required_approvals
            && self.time_lock_expires_at.is_some_and(|expiry| now >= expiry)
        {
            self.status = WithdrawalStatus::Approved;
        }
    }

    /// Manually imposes a time lock of the given duration, independent of
    /// the amount/risk thresholds that would otherwise trigger one.
    pub fn apply_time_lock(&mut self, duration: Duration, now: Timestamp) -> Result<(), AuthError> {
        if self.is_terminal() {
            return Err(AuthError::AlreadyTerminal(self.id.to_string()));
        }
        self.time_locked = true;
        self.time_lock_expires_at = Some(now + duration);
        self.status = WithdrawalStatus::TimeLocked;
        self.updated_at = now;
        Ok(())
    }

    /// Releases an active time lock. Before expiry this requires the
    /// releaser to hold `withdrawal.release_privileged`; after expiry any
    /// caller may release it. A request with no active lock is left
    /// unchanged. Status falls back to `approved` if the approval count was
    /// already met, otherwise `pending`.
    pub fn release_time_lock(&mut self, releaser: &Principal, now: Timestamp) -> Result<(), AuthError> {
        if self.is_terminal() {
            return Err(AuthError::AlreadyTerminal(self.id.to_string()));
        }
        if !self.time_locked || self.status != WithdrawalStatus::TimeLocked {
            return Ok(());
        }

        let lock_expired = self.time_lock_expires_at.is_some_and(|expiry| now >= expiry);
        if !lock_expired && !releaser.has(cap::WITHDRAWAL_RELEASE_PRIVILEGED) {
            return Err(AuthError::TimeLockActive {
                until: self.time_lock_expires_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            });
        }

        self.time_locked = false;
        self.updated_at = now;
        self.status = if self.current_approvals() >= self.required_approvals {
            WithdrawalStatus::Approved
        } else {
            WithdrawalStatus::Pending
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskLevel;
    use chrono::{Duration, Utc};

    fn request(required: u32, time_locked: bool, lock_expiry: Option<Timestamp>) -> WithdrawalAuthorization {
        WithdrawalAuthorization::new(
            EnterpriseId::new(),
            UserId::new(),
            CurrencyCode::new("USDT").unwrap(),
            Money::parse("1000").unwrap(),
            "dest".into(),
            None,
            required,
            RiskScore { score: 0.1, level: RiskLevel::Low },
            time_locked,
            lock_expiry,
            Utc::now(),
        )
    }

    #[test]
    fn duplicate_approver_is_rejected() {
        let mut req = request(2, false, None);
        let approver = ApproverId::new();
        req.record_decision(approver, ApprovalType::Approve, None, Utc::now()).unwrap();
        let result = req.record_decision(approver, ApprovalType::Approve, None, Utc::now());
        assert!(matches!(result, Err(AuthError::DuplicateApprover(_))));
    }

    #[test]
    fn threshold_reached_without_lock_approves() {
        let mut req = request(2, false, None);
        req.record_decision(ApproverId::new(), ApprovalType::Approve, None, Utc::now()).unwrap();
        req.record_decision(ApproverId::new(), ApprovalType::Approve, None, Utc::now()).unwrap();
        assert_eq!(req.status, WithdrawalStatus::Approved);
    }

    #[test]
    fn rejection_is_terminal_even_with_later_approves() {
        let mut req = request(2, false, None);
        req.record_decision(ApproverId::new(), ApprovalType::Approve, None, Utc::now()).unwrap();
        req.record_decision(ApproverId::new(), ApprovalType::Reject, None, Utc::now()).unwrap();
        assert_eq!(req.status, WithdrawalStatus::Rejected);

        let result = req.record_decision(ApproverId::new(), ApprovalType::Approve, None, Utc::now());
        assert!(matches!(result, Err(AuthError::AlreadyTerminal(_))));
    }

    #[test]
    fn threshold_reached_while_locked_stays_locked_until_expiry() {
        let expiry = Utc::now() + Duration::hours(24);
        let mut req = request(1, true, Some(expiry));
        req.record_decision(ApproverId::new(), ApprovalType::Approve, None, Utc::now()).unwrap();
        assert_eq!(req.status, WithdrawalStatus::TimeLocked);

        req.recheck_time_lock(expiry + Duration::seconds(1));
        assert_eq!(req.status, WithdrawalStatus::Approved);
    }

    #[test]
    fn release_before_expiry_requires_privileged_capability() {
        let expiry = Utc::now() + Duration::hours(24);
        let mut req = request(1, true, Some(expiry));
        let unprivileged = Principal::new(UserId::new(), Vec::<String>::new());

        let result = req.release_time_lock(&unprivileged, Utc::now());
        assert!(matches!(result, Err(AuthError::TimeLockActive { .. })));
        assert_eq!(req.status, WithdrawalStatus::TimeLocked);

        let privileged = Principal::new(UserId::new(), [smartcheques_core::cap::WITHDRAWAL_RELEASE_PRIVILEGED]);
        req.release_time_lock(&privileged, Utc::now()).unwrap();
        assert!(!req.time_locked);
        assert_eq!(req.status, WithdrawalStatus::Pending);
    }

    #[test]
    fn release_after_expiry_needs_no_capability() {
        let expiry = Utc::now() + Duration::hours(24);
        let mut req = request(1, true, Some(expiry));
        let unprivileged = Principal::new(UserId::new(), Vec::<String>::new());

        req.release_time_lock(&unprivileged, expiry + Duration::seconds(1)).unwrap();
        assert!(!req.time_locked);
    }

    #[test]
    fn apply_time_lock_on_unlocked_request() {
        let mut req = request(1, false, None);
        req.apply_time_lock(Duration::hours(24), Utc::now()).unwrap();
        assert_eq!(req.status, WithdrawalStatus::TimeLocked);
        assert!(req.time_lock_expires_at.is_some());
    }
}
