use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use smartcheques_core::constants::{
    DEFAULT_HIGH_APPROVALS, DEFAULT_HIGH_AMOUNT_THRESHOLD, DEFAULT_LOW_APPROVALS, DEFAULT_LOW_AMOUNT_THRESHOLD,
    DEFAULT_MEDIUM_APPROVALS, DEFAULT_MEDIUM_AMOUNT_THRESHOLD, DEFAULT_RISK_THRESHOLD,
    DEFAULT_TIME_LOCK_AMOUNT_THRESHOLD, DEFAULT_TIME_LOCK_DURATION_SECS,
};
use smartcheques_core::event::event_type;
use smartcheques_core::{
    cap, ApproverId, CurrencyCode, EnterpriseId, Event, EventPublisher, Money, Principal, UserId, WithdrawalRequestId,
};
use smartcheques_ledger::LedgerEngine;
use tracing::warn;

use crate::error::AuthError;
use crate::risk::{assess, RiskInput, RiskLevel, RiskScore};
use crate::store::AuthStore;
use crate::withdrawal::{ApprovalType, WithdrawalAuthorization, WithdrawalStatus};

/// Aggregate risk posture of an enterprise's withdrawal history, per
/// `getRiskProfile`. Computed fresh from stored requests rather than kept as
/// separate running state, so it can never drift from `history`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RiskProfile {
    pub enterprise_id: EnterpriseId,
    pub sample_size: usize,
    pub average_score: f64,
    pub highest_score: f64,
    pub level: RiskLevel,
}

/// Threshold configuration for approval tiering. Defaults mirror §4.3; an
/// embedder overrides via the layered configuration surface.
#[derive(Clone, Debug)]
pub struct ApprovalConfig {
    pub low_amount: Money,
    pub medium_amount: Money,
    pub high_amount: Money,
    pub low_approvals: u32,
    pub medium_approvals: u32,
    pub high_approvals: u32,
    pub risk_threshold: f64,
    pub time_lock_amount_threshold: Money,
    pub time_lock_duration: Duration,
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            low_amount: Money::parse(DEFAULT_LOW_AMOUNT_THRESHOLD).unwrap(),
            medium_amount: Money::parse(DEFAULT_MEDIUM_AMOUNT_THRESHOLD).unwrap(),
            high_amount: Money::parse(DEFAULT_HIGH_AMOUNT_THRESHOLD).unwrap(),
            low_approvals: DEFAULT_LOW_APPROVALS,
            medium_approvals: DEFAULT_MEDIUM_APPROVALS,
            high_approvals: DEFAULT_HIGH_APPROVALS,
            risk_threshold: DEFAULT_RISK_THRESHOLD,
            time_lock_amount_threshold: Money::parse(DEFAULT_TIME_LOCK_AMOUNT_THRESHOLD).unwrap(),
            time_lock_duration: Duration::seconds(DEFAULT_TIME_LOCK_DURATION_SECS),
        }
    }
}

impl ApprovalConfig {
    fn base_approvals(&self, amount: &Money) -> u32 {
        if *amount >= self.high_amount {
            self.high_approvals
        } else if *amount >= self.medium_amount {
            self.medium_approvals
        } else {
            self.low_approvals
        }
    }
}

/// Result of one item in a bulk-approval batch. Per-item failures never
/// abort the rest of the batch.
#[derive(Debug)]
pub struct BulkApprovalOutcome {
    pub request_id: WithdrawalRequestId,
    pub result: Result<WithdrawalAuthorization, AuthError>,
}

pub struct AuthEngine {
    store: Arc<dyn AuthStore>,
    ledger: Arc<LedgerEngine>,
    events: Arc<dyn EventPublisher>,
    config: ApprovalConfig,
}

impl AuthEngine {
    pub fn new(store: Arc<dyn AuthStore>, ledger: Arc<LedgerEngine>, events: Arc<dyn EventPublisher>) -> Self {
        Self { store, ledger, events, config: ApprovalConfig::default() }
    }

    pub fn with_config(mut self, config: ApprovalConfig) -> Self {
        self.config = config;
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_request(
        &self,
        initiator: &Principal,
        enterprise_id: EnterpriseId,
        initiated_by: UserId,
        currency_code: CurrencyCode,
        amount: Money,
        destination: String,
        purpose: Option<String>,
        risk_input: RiskInput,
    ) -> Result<WithdrawalAuthorization, AuthError> {
        if !initiator.has(cap::WITHDRAWAL_INITIATE) {
            return Err(AuthError::MissingCapability(cap::WITHDRAWAL_INITIATE.to_string()));
        }
        if !self.ledger.check_sufficiency(&enterprise_id, &currency_code, &amount).await? {
            return Err(AuthError::AmountExceedsAvailable);
        }

        let risk: RiskScore = assess(&risk_input);
        let mut required = self.config.base_approvals(&amount);
        if risk.score >= self.config.risk_threshold {
            required += 1;
        }

        let now = Utc::now();
        let time_locked = amount >= self.config.time_lock_amount_threshold || risk.score >= self.config.risk_threshold;
        let time_lock_expires_at = time_locked.then(|| now + self.config.time_lock_duration);

        let request = WithdrawalAuthorization::new(
            enterprise_id,
            initiated_by,
            currency_code,
            amount,
            destination,
            purpose,
            required,
            risk,
            time_locked,
            time_lock_expires_at,
            now,
        );
        self.store.put(request.clone()).await?;

        if !self
            .events
            .publish(Event::new(event_type::WITHDRAWAL_REQUESTED, "auth").with("request_id", request.id.to_string()))
            .await
        {
            warn!(request = %request.id, "failed to publish withdrawal.authorization.requested");
        }
        Ok(request)
    }

    pub async fn get(&self, id: &WithdrawalRequestId) -> Result<WithdrawalAuthorization, AuthError> {
        self.store.get(id).await?.ok_or_else(|| AuthError::NotFound(id.to_string()))
    }

    pub async fn decide(
        &self,
        id: &WithdrawalRequestId,
        approver: &Principal,
        approver_id: ApproverId,
        approval_type: ApprovalType,
        comments: Option<String>,
    ) -> Result<WithdrawalAuthorization, AuthError> {
        if !approver.has(cap::WITHDRAWAL_APPROVE) {
            return Err(AuthError::MissingCapability(cap::WITHDRAWAL_APPROVE.to_string()));
        }
        let mut request = self.get(id).await?;
        request.recheck_time_lock(Utc::now());
        request.record_decision(approver_id, approval_type, comments, Utc::now())?;
        self.store.put(request.clone()).await?;

        let event_type = match (approval_type, request.status) {
            (ApprovalType::Reject, _) => event_type::WITHDRAWAL_REJECTED,
            (_, WithdrawalStatus::Approved) => event_type::WITHDRAWAL_APPROVED,
            _ => event_type::WITHDRAWAL_REQUESTED,
        };
        if !self.events.publish(Event::new(event_type, "auth").with("request_id", request.id.to_string())).await {
            warn!(request = %request.id, "failed to publish withdrawal decision event");
        }
        Ok(request)
    }

    /// Approves/rejects a batch of requests independently; a failure on one
    /// item is recorded in its own outcome and does not prevent the rest of
    /// the batch from being processed.
    pub async fn bulk_decide(
        &self,
        ids: &[WithdrawalRequestId],
        approver: &Principal,
        approver_id: ApproverId,
        approval_type: ApprovalType,
    ) -> Vec<BulkApprovalOutcome> {
        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            let result = self.decide(id, approver, approver_id, approval_type, None).await;
            outcomes.push(BulkApprovalOutcome { request_id: *id, result });
        }
        outcomes
    }

    /// Manually imposes a time lock on a request, independent of the
    /// amount/risk thresholds `create_request` checks automatically.
    pub async fn create_time_lock(
        &self,
        id: &WithdrawalRequestId,
        approver: &Principal,
        duration: Option<Duration>,
    ) -> Result<WithdrawalAuthorization, AuthError> {
        if !approver.has(cap::WITHDRAWAL_APPROVE) {
            return Err(AuthError::MissingCapability(cap::WITHDRAWAL_APPROVE.to_string()));
        }
        let mut request = self.get(id).await?;
        request.apply_time_lock(duration.unwrap_or(self.config.time_lock_duration), Utc::now())?;
        self.store.put(request.clone()).await?;

        if !self
            .events
            .publish(Event::new(event_type::WITHDRAWAL_TIME_LOCKED, "auth").with("request_id", request.id.to_string()))
            .await
        {
            warn!(request = %request.id, "failed to publish time lock created event");
        }
        Ok(request)
    }

    /// Releases an active time lock. Before expiry this requires
    /// `withdrawal.release_privileged`; after expiry any caller may release
    /// it — see [`WithdrawalAuthorization::release_time_lock`].
    pub async fn release_time_lock(
        &self,
        id: &WithdrawalRequestId,
        releaser: &Principal,
    ) -> Result<WithdrawalAuthorization, AuthError> {
        let mut request = self.get(id).await?;
        request.release_time_lock(releaser, Utc::now())?;
        self.store.put(request.clone()).await?;

        if !self
            .events
            .publish(Event::new(event_type::WITHDRAWAL_TIME_LOCK_RELEASED, "auth").with("request_id", request.id.to_string()))
            .await
        {
            warn!(request = %request.id, "failed to publish time lock release event");
        }
        Ok(request)
    }

    pub async fn history(
        &self,
        enterprise_id: &EnterpriseId,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<WithdrawalAuthorization>, AuthError> {
        let all = self.store.list_by_enterprise(enterprise_id).await?;
        Ok(all.into_iter().skip(page * page_size).take(page_size).collect())
    }

    /// Aggregates risk across every withdrawal request on file for an
    /// enterprise: highest score (drives the reported band), average, and
    /// sample size.
    pub async fn get_risk_profile(&self, enterprise_id: &EnterpriseId) -> Result<RiskProfile, AuthError> {
        let history = self.store.list_by_enterprise(enterprise_id).await?;
        if history.is_empty() {
            return Ok(RiskProfile {
                enterprise_id: *enterprise_id,
                sample_size: 0,
                average_score: 0.0,
                highest_score: 0.0,
                level: RiskLevel::Low,
            });
        }

        let highest_score = history.iter().map(|r| r.risk_score).fold(0.0_f64, f64::max);
        let average_score = history.iter().map(|r| r.risk_score).sum::<f64>() / history.len() as f64;
        Ok(RiskProfile {
            enterprise_id: *enterprise_id,
            sample_size: history.len(),
            average_score,
            highest_score,
            level: RiskLevel::from_score(highest_score),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryAuthStore;
    use smartcheques_core::RecordingPublisher;
    use smartcheques_ledger::{AssetClass, InMemoryLedgerStore};

    async fn engine_with_balance(available: &str) -> (AuthEngine, EnterpriseId, CurrencyCode) {
        let ledger = Arc::new(LedgerEngine::new(Arc::new(InMemoryLedgerStore::new()), Arc::new(RecordingPublisher::new())));
        ledger.register_asset("usdt", AssetClass::Stablecoin, 6, Money::parse("1").unwrap(), None, 0.0).await.unwrap();
        let enterprise = EnterpriseId::new();
        let usdt = CurrencyCode::new("USDT").unwrap();
        ledger.initialize(enterprise, &usdt).await.unwrap();
        ledger
            .process_op(smartcheques_ledger::LedgerOpRequest {
                enterprise_id: enterprise,
                currency_code: usdt.clone(),
                op_type: smartcheques_ledger::OperationType::Deposit,
                amount: Money::parse(available).unwrap(),
                reference: None,
            })
            .await
            .unwrap();
        let engine = AuthEngine::new(Arc::new(InMemoryAuthStore::new()), ledger, Arc::new(RecordingPublisher::new()));
        (engine, enterprise, usdt)
    }

    fn low_risk_input() -> RiskInput {
        RiskInput {
            amount: Money::parse("500").unwrap(),
            typical_amount: Money::parse("100000").unwrap(),
            hour_of_day: 12,
            is_new_destination: false,
            recent_transaction_count: 0,
        }
    }

    fn initiator() -> Principal {
        Principal::new(UserId::new(), [cap::WITHDRAWAL_INITIATE])
    }

    fn approver() -> Principal {
        Principal::new(UserId::new(), [cap::WITHDRAWAL_APPROVE])
    }

    #[tokio::test]
    async fn request_exceeding_available_is_rejected() {
        let (engine, enterprise, usdt) = engine_with_balance("100").await;
        let result = engine
            .create_request(
                &initiator(),
                enterprise,
                UserId::new(),
                usdt,
                Money::parse("1000").unwrap(),
                "dest".into(),
                None,
                low_risk_input(),
            )
            .await;
        assert!(matches!(result, Err(AuthError::AmountExceedsAvailable)));
    }

    #[tokio::test]
    async fn initiator_without_capability_is_rejected() {
        let (engine, enterprise, usdt) = engine_with_balance("10000").await;
        let bystander = Principal::new(UserId::new(), Vec::<String>::new());
        let result = engine
            .create_request(&bystander, enterprise, UserId::new(), usdt, Money::parse("500").unwrap(), "dest".into(), None, low_risk_input())
            .await;
        assert!(matches!(result, Err(AuthError::MissingCapability(_))));
    }

    #[tokio::test]
    async fn approver_without_capability_is_rejected() {
        let (engine, enterprise, usdt) = engine_with_balance("10000").await;
        let request = engine
            .create_request(&initiator(), enterprise, UserId::new(), usdt, Money::parse("500").unwrap(), "dest".into(), None, low_risk_input())
            .await
            .unwrap();
        let bystander = Principal::new(UserId::new(), Vec::<String>::new());
        let result = engine.decide(&request.id, &bystander, ApproverId::new(), ApprovalType::Approve, None).await;
        assert!(matches!(result, Err(AuthError::MissingCapability(_))));
    }

    #[tokio::test]
    async fn low_tier_request_needs_one_approval() {
        let (engine, enterprise, usdt) = engine_with_balance("10000").await;
        let request = engine
            .create_request(&initiator(), enterprise, UserId::new(), usdt, Money::parse("500").unwrap(), "dest".into(), None, low_risk_input())
            .await
            .unwrap();
        assert_eq!(request.required_approvals, 1);
        assert_eq!(request.status, WithdrawalStatus::Pending);

        let decided = engine.decide(&request.id, &approver(), ApproverId::new(), ApprovalType::Approve, None).await.unwrap();
        assert_eq!(decided.status, WithdrawalStatus::Approved);
    }

    #[tokio::test]
    async fn high_risk_adds_approval_and_time_lock() {
        let (engine, enterprise, usdt) = engine_with_balance("200000").await;
        let risky = RiskInput {
            amount: Money::parse("80000").unwrap(),
            typical_amount: Money::parse("1000").unwrap(),
            hour_of_day: 2,
            is_new_destination: true,
            recent_transaction_count: 9,
        };
        let request = engine
            .create_request(&initiator(), enterprise, UserId::new(), usdt, Money::parse("80000").unwrap(), "new-dest".into(), None, risky)
            .await
            .unwrap();
        assert!(request.risk_score >= 0.7);
        assert!(request.time_locked);
        assert_eq!(request.status, WithdrawalStatus::TimeLocked);
    }

    #[tokio::test]
    async fn bulk_decide_does_not_abort_on_item_failure() {
        let (engine, enterprise, usdt) = engine_with_balance("10000").await;
        let good = engine
            .create_request(&initiator(), enterprise, UserId::new(), usdt.clone(), Money::parse("500").unwrap(), "d".into(), None, low_risk_input())
            .await
            .unwrap();
        let missing = WithdrawalRequestId::new();

        let outcomes = engine.bulk_decide(&[good.id, missing], &approver(), ApproverId::new(), ApprovalType::Approve).await;
        assert!(outcomes[0].result.is_ok());
        assert!(outcomes[1].result.is_err());
    }

    #[tokio::test]
    async fn manual_time_lock_then_privileged_release() {
        let (engine, enterprise, usdt) = engine_with_balance("10000").await;
        let request = engine
            .create_request(&initiator(), enterprise, UserId::new(), usdt, Money::parse("500").unwrap(), "d".into(), None, low_risk_input())
            .await
            .unwrap();
        assert!(!request.time_locked);

        let locked = engine.create_time_lock(&request.id, &approver(), None).await.unwrap();
        assert!(locked.time_locked);
        assert_eq!(locked.status, WithdrawalStatus::TimeLocked);

        let unprivileged = Principal::new(UserId::new(), Vec::<String>::new());
        let blocked = engine.release_time_lock(&request.id, &unprivileged).await;
        assert!(matches!(blocked, Err(AuthError::TimeLockActive { .. })));

        let privileged = Principal::new(UserId::new(), [cap::WITHDRAWAL_RELEASE_PRIVILEGED]);
        let released = engine.release_time_lock(&request.id, &privileged).await.unwrap();
        assert!(!released.time_locked);
    }

    #[tokio::test]
    async fn risk_profile_aggregates_requests_on_file() {
        let (engine, enterprise, usdt) = engine_with_balance("200000").await;
        engine
            .create_request(&initiator(), enterprise, UserId::new(), usdt.clone(), Money::parse("500").unwrap(), "d".into(), None, low_risk_input())
            .await
            .unwrap();
        let risky = RiskInput {
            amount: Money::parse("80000").unwrap(),
            typical_amount: Money::parse("1000").unwrap(),
            hour_of_day: 2,
            is_new_destination: true,
            recent_transaction_count: 9,
        };
        engine
            .create_request(&initiator(), enterprise, UserId::new(), usdt, Money::parse("80000").unwrap(), "new-dest".into(), None, risky)
            .await
            .unwrap();

        let profile = engine.get_risk_profile(&enterprise).await.unwrap();
        assert_eq!(profile.sample_size, 2);
        assert!(profile.highest_score >= 0.7);
        assert_eq!(profile.level, RiskLevel::from_score(profile.highest_score));
    }

    #[tokio::test]
    async fn risk_profile_with_no_history_is_low() {
        let (engine, enterprise, _usdt) = engine_with_balance("1000").await;
        let profile = engine.get_risk_profile(&enterprise).await.unwrap();
        assert_eq!(profile.sample_size, 0);
        assert_eq!(profile.level, RiskLevel::Low);
    }
}
